//! Chat reply and response-metric types.
//!
//! A [`ChatReply`] is what the assistant returns for one user message:
//! the reply text, the sources it drew on, and the metrics recorded for
//! the exchange.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::knowledge::{KnowledgeExport, KnowledgeStats};
use crate::memory::{MemoryExport, MemoryStats};

/// Tone of a generated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    Urgent,
    Friendly,
    Detailed,
    Professional,
}

impl fmt::Display for ResponseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStyle::Urgent => write!(f, "urgent"),
            ResponseStyle::Friendly => write!(f, "friendly"),
            ResponseStyle::Detailed => write!(f, "detailed"),
            ResponseStyle::Professional => write!(f, "professional"),
        }
    }
}

impl FromStr for ResponseStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "urgent" => Ok(ResponseStyle::Urgent),
            "friendly" => Ok(ResponseStyle::Friendly),
            "detailed" => Ok(ResponseStyle::Detailed),
            "professional" => Ok(ResponseStyle::Professional),
            other => Err(format!("invalid response style: '{other}'")),
        }
    }
}

/// Which path produced the reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedBy {
    Llm,
    Template,
    SmallTalk,
    /// The pipeline failed and an apology was returned.
    Error,
}

impl fmt::Display for GeneratedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratedBy::Llm => write!(f, "llm"),
            GeneratedBy::Template => write!(f, "template"),
            GeneratedBy::SmallTalk => write!(f, "small_talk"),
            GeneratedBy::Error => write!(f, "error"),
        }
    }
}

/// Metrics recorded for each reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetrics {
    /// Seconds from request to reply.
    pub response_time: f64,
    pub knowledge_relevance: f64,
    /// Number of memories used as context.
    pub memory_utilization: usize,
    pub response_length: usize,
    pub user_message_length: usize,
    pub knowledge_sources_count: usize,
    pub average_knowledge_score: f64,
}

/// Request body for one chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// The assistant's answer to one user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub session_id: String,
    pub knowledge_sources: Vec<String>,
    pub memory_used: bool,
    pub user_profile_used: bool,
    pub response_style: ResponseStyle,
    pub generated_by: GeneratedBy,
    pub response_time_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ResponseMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Rolling averages over recorded response metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetricsSummary {
    pub average_response_time: f64,
    pub average_knowledge_relevance: f64,
    pub total_responses: usize,
}

/// Static settings reported alongside stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfiguration {
    pub max_context_length: usize,
    pub response_timeout_secs: u64,
    pub embedding_model_available: bool,
    /// `None` when replies come from templates only.
    pub llm_provider: Option<String>,
}

/// Combined view of memory, knowledge, and response statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    pub memory_stats: MemoryStats,
    pub knowledge_stats: KnowledgeStats,
    pub evaluation_metrics: ResponseMetricsSummary,
    pub system_configuration: SystemConfiguration,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyStats {
    pub average_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub response_time_std: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalAccuracyStats {
    pub average_knowledge_relevance: f64,
    pub knowledge_relevance_std: f64,
    /// Replies whose knowledge relevance exceeded 0.7.
    pub high_relevance_responses: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilizationStats {
    pub total_responses: usize,
    pub memory_utilization_rate: f64,
    pub knowledge_coverage: f64,
}

/// Performance computed from recorded response metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemPerformance {
    pub latency: LatencyStats,
    pub retrieval_accuracy: RetrievalAccuracyStats,
    pub system_utilization: UtilizationStats,
}

/// Everything the assistant has stored, for backup or inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemExport {
    pub system_stats: SystemStats,
    pub response_metrics: Vec<ResponseMetrics>,
    pub memory_export: MemoryExport,
    pub knowledge_export: KnowledgeExport,
    pub export_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_style_roundtrip() {
        for style in [
            ResponseStyle::Urgent,
            ResponseStyle::Friendly,
            ResponseStyle::Detailed,
            ResponseStyle::Professional,
        ] {
            let parsed: ResponseStyle = style.to_string().parse().unwrap();
            assert_eq!(style, parsed);
        }
    }

    #[test]
    fn test_generated_by_serde() {
        let json = serde_json::to_string(&GeneratedBy::SmallTalk).unwrap();
        assert_eq!(json, "\"small_talk\"");
    }

    #[test]
    fn test_chat_request_optional_fields() {
        let req: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.message, "hi");
        assert!(req.session_id.is_none());
        assert!(req.user_id.is_none());
    }
}
