//! Conversation memory types.
//!
//! Every exchange is stored as a [`MemoryEntry`] scoped to a session.
//! Important entries are copied into long-term memory, and each user
//! accumulates a [`UserProfile`] used to personalise replies.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User id recorded when a turn has no explicit user.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Where a memory entry lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    Session,
    LongTerm,
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryType::Session => write!(f, "session"),
            MemoryType::LongTerm => write!(f, "long_term"),
        }
    }
}

impl FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "session" => Ok(MemoryType::Session),
            "long_term" => Ok(MemoryType::LongTerm),
            other => Err(format!("invalid memory type: '{other}'")),
        }
    }
}

/// Coarse sentiment of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// +1 for positive, -1 for negative, 0 for neutral.
    pub fn score(&self) -> f64 {
        match self {
            Sentiment::Positive => 1.0,
            Sentiment::Negative => -1.0,
            Sentiment::Neutral => 0.0,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("invalid sentiment: '{other}'")),
        }
    }
}

/// One conversation turn plus the analysis computed when it was stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: Uuid,
    pub session_id: String,
    pub user_id: String,
    pub user_message: String,
    pub assistant_response: String,
    pub timestamp: DateTime<Utc>,
    /// Free-form context recorded with the turn (response style, sources).
    #[serde(default)]
    pub context: serde_json::Value,
    pub memory_type: MemoryType,
    pub relevance_score: f64,
    pub keywords: Vec<String>,
    pub sentiment: Sentiment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoted_at: Option<DateTime<Utc>>,
}

/// A long-term memory matched against a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMemory {
    #[serde(flatten)]
    pub entry: MemoryEntry,
    pub similarity_score: f64,
}

/// One step in a session's conversation flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowItem {
    pub timestamp: DateTime<Utc>,
    /// First 50 chars of the user message followed by `...`.
    pub user_message: String,
    pub sentiment: Sentiment,
}

/// Rolling context tracked per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub session_id: String,
    pub current_topic: String,
    pub flow: Vec<FlowItem>,
}

impl ConversationContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            current_topic: String::new(),
            flow: Vec::new(),
        }
    }
}

/// Count of messages per sentiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl SentimentDistribution {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.positive + self.negative + self.neutral
    }
}

/// Reply preferences stored on a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub response_length: String,
    pub technical_level: String,
    pub emotion_support: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            response_length: "medium".to_string(),
            technical_level: "general".to_string(),
            emotion_support: true,
        }
    }
}

/// Accumulated statistics for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub total_conversations: u32,
    pub total_messages: u32,
    pub health_interests: BTreeMap<String, u32>,
    pub sentiment_distribution: SentimentDistribution,
    pub last_interaction: DateTime<Utc>,
    pub preferences: UserPreferences,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_conversations: 0,
            total_messages: 0,
            health_interests: BTreeMap::new(),
            sentiment_distribution: SentimentDistribution::default(),
            last_interaction: Utc::now(),
            preferences: UserPreferences::default(),
        }
    }
}

/// Three-level scale used by personality traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

/// Optimism is balanced rather than medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimism {
    Low,
    Balanced,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTraits {
    pub optimism_level: Optimism,
    pub engagement_level: Level,
    pub health_consciousness: Level,
}

/// How the user tends to talk, inferred from message volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStyle {
    Formal,
    Mixed,
    Casual,
}

impl fmt::Display for ConversationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStyle::Formal => write!(f, "formal"),
            ConversationStyle::Mixed => write!(f, "mixed"),
            ConversationStyle::Casual => write!(f, "casual"),
        }
    }
}

/// Traits derived from a profile on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInsights {
    /// `None` until the user has sent at least one message.
    pub personality: Option<PersonalityTraits>,
    pub conversation_style: ConversationStyle,
    pub top_interests: Vec<(String, u32)>,
}

/// A profile together with its derived insights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfileView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub insights: ProfileInsights,
    /// False when the user has no stored profile and defaults were returned.
    pub stored: bool,
}

/// Summary of a session's turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub session_id: String,
    pub total_turns: usize,
    pub main_topics: Vec<(String, u32)>,
    pub average_sentiment: f64,
    pub unique_keywords: usize,
    pub duration_minutes: i64,
    pub last_updated: DateTime<Utc>,
}

/// Aggregate memory counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryStats {
    pub session_memories: usize,
    pub long_term_memories: usize,
    pub total_memories: usize,
    pub active_sessions: usize,
    pub user_profiles: usize,
    pub memory_retention_days: i64,
    pub relevance_threshold: f64,
    pub last_cleanup: DateTime<Utc>,
}

/// Raw counts returned by the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCounts {
    pub session_memories: usize,
    pub long_term_memories: usize,
    pub active_sessions: usize,
    pub user_profiles: usize,
}

/// Portable dump of all memory data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryExport {
    pub session_memories: BTreeMap<String, Vec<MemoryEntry>>,
    pub long_term_memories: Vec<MemoryEntry>,
    pub user_profiles: BTreeMap<String, UserProfile>,
    pub export_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_type_roundtrip() {
        for mt in [MemoryType::Session, MemoryType::LongTerm] {
            let parsed: MemoryType = mt.to_string().parse().unwrap();
            assert_eq!(mt, parsed);
        }
    }

    #[test]
    fn test_sentiment_score() {
        assert_eq!(Sentiment::Positive.score(), 1.0);
        assert_eq!(Sentiment::Negative.score(), -1.0);
        assert_eq!(Sentiment::Neutral.score(), 0.0);
    }

    #[test]
    fn test_sentiment_distribution_record() {
        let mut dist = SentimentDistribution::default();
        dist.record(Sentiment::Positive);
        dist.record(Sentiment::Positive);
        dist.record(Sentiment::Negative);
        assert_eq!(dist.positive, 2);
        assert_eq!(dist.negative, 1);
        assert_eq!(dist.total(), 3);
    }

    #[test]
    fn test_default_preferences() {
        let profile = UserProfile::new("alice");
        assert_eq!(profile.preferences.response_length, "medium");
        assert_eq!(profile.preferences.technical_level, "general");
        assert!(profile.preferences.emotion_support);
        assert_eq!(profile.total_messages, 0);
    }

    #[test]
    fn test_memory_entry_serde_omits_promoted_at() {
        let entry = MemoryEntry {
            id: Uuid::now_v7(),
            session_id: "s1".to_string(),
            user_id: ANONYMOUS_USER.to_string(),
            user_message: "hello".to_string(),
            assistant_response: "hi".to_string(),
            timestamp: Utc::now(),
            context: serde_json::json!({}),
            memory_type: MemoryType::Session,
            relevance_score: 0.1,
            keywords: vec!["hello".to_string()],
            sentiment: Sentiment::Neutral,
            promoted_at: None,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("promoted_at"));
        assert!(json.contains("\"memory_type\":\"session\""));
        let back: MemoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
