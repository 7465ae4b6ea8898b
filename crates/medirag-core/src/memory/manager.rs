//! Conversation memory manager.
//!
//! Every turn is stored as a session entry with its keywords, sentiment and
//! health relevance. Turns that look important are copied into long-term
//! memory, and users accumulate a profile that drives reply style.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use medirag_types::config::MemoryConfig;
use medirag_types::error::MemoryError;
use medirag_types::memory::{
    ANONYMOUS_USER, ConversationContext, ConversationSummary, FlowItem, MemoryEntry,
    MemoryExport, MemoryStats, MemoryType, ScoredMemory, UserProfile, UserProfileView,
};

use crate::repository::memory::MemoryRepository;
use crate::text::{analyze_sentiment, extract_keywords, health_relevance, truncate_chars};

use super::insights;

/// Flow items kept per session context.
pub const FLOW_LIMIT: usize = 20;

/// Relevance above which a turn is promoted to long-term memory.
pub const PROMOTION_RELEVANCE: f64 = 0.8;

/// Keywords that promote a turn to long-term memory regardless of relevance.
pub const PROMOTION_KEYWORDS: [&str; 5] =
    ["emergency", "symptom", "treatment", "medication", "diagnosis"];

/// User id that addresses every user in [`MemoryManager::clear_user_data`].
pub const ALL_USERS: &str = "all";

const FLOW_PREVIEW_CHARS: usize = 50;

/// Counts of records written by [`MemoryManager::import`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub session_memories: usize,
    pub long_term_memories: usize,
    pub user_profiles: usize,
}

/// Long-term similarity: keyword overlap plus closeness of health relevance.
pub fn long_term_similarity(
    query_keywords: &HashSet<&str>,
    query_relevance: f64,
    entry: &MemoryEntry,
) -> f64 {
    let overlap = entry
        .keywords
        .iter()
        .map(String::as_str)
        .collect::<HashSet<&str>>()
        .intersection(query_keywords)
        .count() as f64;
    let relevance_similarity = 1.0 - (query_relevance - entry.relevance_score).abs();
    overlap * 0.6 + relevance_similarity * 0.4
}

pub fn should_promote(entry: &MemoryEntry) -> bool {
    entry.relevance_score > PROMOTION_RELEVANCE
        || entry
            .keywords
            .iter()
            .any(|k| PROMOTION_KEYWORDS.contains(&k.as_str()))
}

/// Service managing session memory, long-term memory and user profiles.
///
/// Generic over the repository so the core crate stays storage-agnostic.
pub struct MemoryManager<R: MemoryRepository> {
    repo: R,
    config: MemoryConfig,
}

impl<R: MemoryRepository> MemoryManager<R> {
    pub fn new(repo: R, config: &MemoryConfig) -> Self {
        Self {
            repo,
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Store one conversation turn.
    ///
    /// Updates the session context and (when `user_id` is given) the user
    /// profile, promotes important turns, then applies retention cleanup.
    pub async fn add_session_memory(
        &self,
        session_id: &str,
        user_message: &str,
        assistant_response: &str,
        context: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<MemoryEntry, MemoryError> {
        let timestamp = Utc::now();
        let entry = MemoryEntry {
            id: Uuid::now_v7(),
            session_id: session_id.to_string(),
            user_id: user_id.unwrap_or(ANONYMOUS_USER).to_string(),
            user_message: user_message.to_string(),
            assistant_response: assistant_response.to_string(),
            timestamp,
            context,
            memory_type: MemoryType::Session,
            relevance_score: health_relevance(user_message),
            keywords: extract_keywords(user_message),
            sentiment: analyze_sentiment(user_message),
            promoted_at: None,
        };
        self.repo.save_entry(&entry).await?;

        self.update_context(&entry).await?;
        if let Some(user_id) = user_id {
            self.update_profile(user_id, &entry).await?;
        }

        if should_promote(&entry) {
            let long_term = MemoryEntry {
                id: Uuid::now_v7(),
                memory_type: MemoryType::LongTerm,
                promoted_at: Some(Utc::now()),
                ..entry.clone()
            };
            self.repo.save_entry(&long_term).await?;
            tracing::info!(session_id, memory_id = %long_term.id, "Promoted memory to long-term storage");
        }

        self.cleanup_old_memories().await?;

        tracing::debug!(
            session_id,
            relevance = entry.relevance_score,
            sentiment = %entry.sentiment,
            "Added session memory"
        );
        Ok(entry)
    }

    async fn update_context(&self, entry: &MemoryEntry) -> Result<(), MemoryError> {
        let mut context = self
            .repo
            .get_context(&entry.session_id)
            .await?
            .unwrap_or_else(|| ConversationContext::new(entry.session_id.clone()));

        if let Some(topic) = entry.keywords.first() {
            context.current_topic = topic.clone();
        }
        context.flow.push(FlowItem {
            timestamp: entry.timestamp,
            user_message: format!(
                "{}...",
                truncate_chars(&entry.user_message, FLOW_PREVIEW_CHARS)
            ),
            sentiment: entry.sentiment,
        });
        if context.flow.len() > FLOW_LIMIT {
            let excess = context.flow.len() - FLOW_LIMIT;
            context.flow.drain(..excess);
        }

        self.repo.save_context(&context).await?;
        Ok(())
    }

    async fn update_profile(&self, user_id: &str, entry: &MemoryEntry) -> Result<(), MemoryError> {
        let mut profile = self
            .repo
            .get_profile(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id));

        profile.total_conversations += 1;
        profile.total_messages += 1;
        for keyword in &entry.keywords {
            *profile.health_interests.entry(keyword.clone()).or_default() += 1;
        }
        profile.sentiment_distribution.record(entry.sentiment);
        profile.last_interaction = entry.timestamp;

        self.repo.save_profile(&profile).await?;
        Ok(())
    }

    /// Session entries ranked by relevance then recency.
    ///
    /// `limit` defaults to the configured context window.
    pub async fn get_session_context(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let mut entries = self.repo.list_session(session_id).await?;
        entries.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then(b.timestamp.cmp(&a.timestamp))
        });
        entries.truncate(limit.unwrap_or(self.config.max_context_window));
        Ok(entries)
    }

    /// Session entries in the order they were added.
    pub async fn get_session_history(&self, session_id: &str) -> Result<Vec<MemoryEntry>, MemoryError> {
        Ok(self.repo.list_session(session_id).await?)
    }

    pub async fn get_conversation_context(
        &self,
        session_id: &str,
    ) -> Result<Option<ConversationContext>, MemoryError> {
        Ok(self.repo.get_context(session_id).await?)
    }

    /// Long-term memories similar to `query`, most similar first.
    ///
    /// Only memories of `user_id` are considered when it is given.
    pub async fn get_relevant_long_term_memories(
        &self,
        query: &str,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ScoredMemory>, MemoryError> {
        let keywords = extract_keywords(query);
        let query_keywords: HashSet<&str> = keywords.iter().map(String::as_str).collect();
        let query_relevance = health_relevance(query);

        let mut scored: Vec<ScoredMemory> = self
            .repo
            .list_long_term(user_id)
            .await?
            .into_iter()
            .filter_map(|entry| {
                let similarity_score = long_term_similarity(&query_keywords, query_relevance, &entry);
                (similarity_score >= self.config.relevance_threshold).then_some(ScoredMemory {
                    entry,
                    similarity_score,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        scored.truncate(limit);
        Ok(scored)
    }

    /// The user's profile with derived insights, or defaults when the user
    /// has no stored profile.
    pub async fn get_user_profile(&self, user_id: &str) -> Result<UserProfileView, MemoryError> {
        let (profile, stored) = match self.repo.get_profile(user_id).await? {
            Some(profile) => (profile, true),
            None => (UserProfile::new(user_id), false),
        };
        Ok(UserProfileView {
            insights: insights::profile_insights(&profile),
            profile,
            stored,
        })
    }

    /// Summary of a session, or `None` if it has no entries.
    pub async fn get_conversation_summary(
        &self,
        session_id: &str,
    ) -> Result<Option<ConversationSummary>, MemoryError> {
        let entries = self.repo.list_session(session_id).await?;
        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(insights::summarize(session_id, &entries)))
    }

    /// Delete entries older than the retention window.
    pub async fn cleanup_old_memories(&self) -> Result<u64, MemoryError> {
        let cutoff = Utc::now() - Duration::days(self.config.retention_days);
        let removed = self.repo.delete_before(cutoff).await?;
        if removed > 0 {
            tracing::info!(removed, retention_days = self.config.retention_days, "Cleaned up old memories");
        }
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<MemoryStats, MemoryError> {
        let counts = self.repo.counts().await?;
        Ok(MemoryStats {
            session_memories: counts.session_memories,
            long_term_memories: counts.long_term_memories,
            total_memories: counts.session_memories + counts.long_term_memories,
            active_sessions: counts.active_sessions,
            user_profiles: counts.user_profiles,
            memory_retention_days: self.config.retention_days,
            relevance_threshold: self.config.relevance_threshold,
            last_cleanup: Utc::now(),
        })
    }

    pub async fn export(&self) -> Result<MemoryExport, MemoryError> {
        let mut session_memories = BTreeMap::new();
        for session_id in self.repo.list_sessions().await? {
            let entries = self.repo.list_session(&session_id).await?;
            session_memories.insert(session_id, entries);
        }
        let user_profiles = self
            .repo
            .list_profiles()
            .await?
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect();

        Ok(MemoryExport {
            session_memories,
            long_term_memories: self.repo.list_long_term(None).await?,
            user_profiles,
            export_timestamp: Utc::now(),
        })
    }

    /// Merge an export into the store.
    ///
    /// Entries are upserted by id and profiles replaced by user id. Entries
    /// whose type does not match the section they appear in are rejected.
    pub async fn import(&self, data: MemoryExport) -> Result<ImportCounts, MemoryError> {
        let mut counts = ImportCounts::default();

        for (session_id, entries) in &data.session_memories {
            for entry in entries {
                if entry.memory_type != MemoryType::Session || &entry.session_id != session_id {
                    return Err(MemoryError::InvalidImport(format!(
                        "entry {} does not belong to session memory of {session_id}",
                        entry.id
                    )));
                }
                self.repo.save_entry(entry).await?;
                counts.session_memories += 1;
            }
        }

        for entry in &data.long_term_memories {
            if entry.memory_type != MemoryType::LongTerm {
                return Err(MemoryError::InvalidImport(format!(
                    "entry {} is not a long-term memory",
                    entry.id
                )));
            }
            self.repo.save_entry(entry).await?;
            counts.long_term_memories += 1;
        }

        for profile in data.user_profiles.values() {
            self.repo.save_profile(profile).await?;
            counts.user_profiles += 1;
        }

        tracing::info!(
            session_memories = counts.session_memories,
            long_term_memories = counts.long_term_memories,
            user_profiles = counts.user_profiles,
            "Imported memories"
        );
        Ok(counts)
    }

    /// Delete a user's memories and profile. [`ALL_USERS`] clears everything.
    ///
    /// Returns the number of entries removed (0 for a full clear).
    pub async fn clear_user_data(&self, user_id: &str) -> Result<u64, MemoryError> {
        if user_id == ALL_USERS {
            self.repo.clear().await?;
            tracing::info!("Cleared all memory data");
            return Ok(0);
        }
        let removed = self.repo.delete_user(user_id).await?;
        tracing::info!(user_id, removed, "Cleared user memory data");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use medirag_types::memory::{ConversationStyle, Sentiment};

    use super::*;
    use crate::testing::MockMemoryRepository;

    fn manager() -> MemoryManager<MockMemoryRepository> {
        MemoryManager::new(MockMemoryRepository::default(), &MemoryConfig::default())
    }

    async fn add(
        mgr: &MemoryManager<MockMemoryRepository>,
        session: &str,
        message: &str,
        user: Option<&str>,
    ) -> MemoryEntry {
        mgr.add_session_memory(session, message, "reply", serde_json::json!({}), user)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_stored_turn_reads_back() {
        let mgr = manager();
        let entry = add(&mgr, "s1", "I have a mild cough", None).await;
        assert_eq!(entry.user_id, ANONYMOUS_USER);

        let history = mgr.get_session_history("s1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_message, "I have a mild cough");
        assert_eq!(history[0].assistant_response, "reply");
        assert!(mgr.get_session_history("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_promotion_by_keyword() {
        let mgr = manager();
        add(&mgr, "s1", "what treatment works best", Some("u1")).await;
        add(&mgr, "s1", "thanks a lot", Some("u1")).await;

        let stats = mgr.stats().await.unwrap();
        assert_eq!(stats.session_memories, 2);
        assert_eq!(stats.long_term_memories, 1);
        assert_eq!(stats.total_memories, 3);
        assert_eq!(stats.active_sessions, 1);
        assert_eq!(stats.user_profiles, 1);
    }

    #[tokio::test]
    async fn test_promotion_by_relevance() {
        // 2 health words out of 3 -> relevance 4/3 + 3/50, capped at 1.
        let entry = MemoryEntry {
            relevance_score: health_relevance("fever cough today"),
            keywords: extract_keywords("fever cough today"),
            ..add(&manager(), "s", "x", None).await
        };
        assert!(should_promote(&entry));

        let plain = MemoryEntry {
            relevance_score: 0.5,
            keywords: vec!["hello".to_string()],
            ..entry
        };
        assert!(!should_promote(&plain));
    }

    #[tokio::test]
    async fn test_session_context_ranks_by_relevance() {
        let mgr = manager();
        add(&mgr, "s1", "hello there friend", None).await;
        add(&mgr, "s1", "my headache and fever", None).await;
        add(&mgr, "s1", "ok", None).await;

        let context = mgr.get_session_context("s1", Some(2)).await.unwrap();
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].user_message, "my headache and fever");
        assert!(context[0].relevance_score >= context[1].relevance_score);
    }

    #[tokio::test]
    async fn test_profile_counters_and_insights() {
        let mgr = manager();
        add(&mgr, "s1", "I feel great about my sleep", Some("alice")).await;
        add(&mgr, "s2", "sleep is better now", Some("alice")).await;

        let view = mgr.get_user_profile("alice").await.unwrap();
        assert!(view.stored);
        assert_eq!(view.profile.total_messages, 2);
        assert_eq!(view.profile.total_conversations, 2);
        assert_eq!(view.profile.health_interests.get("sleep"), Some(&2));
        assert_eq!(view.profile.sentiment_distribution.positive, 2);
        assert_eq!(view.insights.conversation_style, ConversationStyle::Formal);
        assert_eq!(view.insights.top_interests[0], ("sleep".to_string(), 2));

        let missing = mgr.get_user_profile("bob").await.unwrap();
        assert!(!missing.stored);
        assert!(missing.insights.personality.is_none());
    }

    #[tokio::test]
    async fn test_flow_capped() {
        let mgr = manager();
        for i in 0..25 {
            add(&mgr, "s1", &format!("message number {i}"), None).await;
        }
        let context = mgr.get_conversation_context("s1").await.unwrap().unwrap();
        assert_eq!(context.flow.len(), FLOW_LIMIT);
        assert!(context.flow[0].user_message.starts_with("message number 5"));
        assert!(context.flow[0].user_message.ends_with("..."));
        assert_eq!(context.current_topic, "message");
    }

    #[tokio::test]
    async fn test_long_term_similarity_threshold() {
        let mgr = manager();
        add(&mgr, "s1", "which medication helps migraine", Some("u1")).await;
        add(&mgr, "s2", "which medication helps migraine", Some("u2")).await;

        let hits = mgr
            .get_relevant_long_term_memories("medication for migraine", Some("u1"), 5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.user_id, "u1");
        assert!(hits[0].similarity_score >= 0.7);

        let all_users = mgr
            .get_relevant_long_term_memories("medication for migraine", None, 5)
            .await
            .unwrap();
        assert_eq!(all_users.len(), 2);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_old_entries() {
        let mgr = manager();
        add(&mgr, "s1", "recent message", None).await;
        let old = MemoryEntry {
            id: Uuid::now_v7(),
            timestamp: DateTime::parse_from_rfc3339("2020-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            ..add(&mgr, "s2", "another", None).await
        };
        mgr.repo.save_entry(&old).await.unwrap();

        assert_eq!(mgr.cleanup_old_memories().await.unwrap(), 1);
        let stats = mgr.stats().await.unwrap();
        assert_eq!(stats.session_memories, 2);
    }

    #[tokio::test]
    async fn test_clear_user_data() {
        let mgr = manager();
        add(&mgr, "s1", "treatment question", Some("alice")).await;
        add(&mgr, "s2", "hello", Some("bob")).await;

        assert_eq!(mgr.clear_user_data("alice").await.unwrap(), 2);
        let stats = mgr.stats().await.unwrap();
        assert_eq!(stats.session_memories, 1);
        assert_eq!(stats.long_term_memories, 0);
        assert_eq!(stats.user_profiles, 1);

        mgr.clear_user_data(ALL_USERS).await.unwrap();
        assert_eq!(mgr.stats().await.unwrap().total_memories, 0);
    }

    #[tokio::test]
    async fn test_export_import_preserves_counts() {
        let source = manager();
        add(&source, "s1", "symptom check", Some("alice")).await;
        add(&source, "s1", "all good", Some("alice")).await;
        add(&source, "s2", "hi", None).await;
        let export = source.export().await.unwrap();
        assert_eq!(export.session_memories.len(), 2);

        let json = serde_json::to_string(&export).unwrap();
        let parsed: MemoryExport = serde_json::from_str(&json).unwrap();

        let target = manager();
        let counts = target.import(parsed).await.unwrap();
        assert_eq!(counts.session_memories, 3);
        assert_eq!(counts.long_term_memories, 1);
        assert_eq!(counts.user_profiles, 1);

        let before = source.stats().await.unwrap();
        let after = target.stats().await.unwrap();
        assert_eq!(before.total_memories, after.total_memories);
        assert_eq!(before.user_profiles, after.user_profiles);

        // Importing twice upserts rather than duplicating.
        target.import(export).await.unwrap();
        assert_eq!(target.stats().await.unwrap().total_memories, before.total_memories);
    }

    #[tokio::test]
    async fn test_import_rejects_misplaced_entries() {
        let mgr = manager();
        let entry = add(&mgr, "s1", "hello", None).await;
        let bad = MemoryExport {
            session_memories: BTreeMap::new(),
            long_term_memories: vec![entry],
            user_profiles: BTreeMap::new(),
            export_timestamp: Utc::now(),
        };
        let err = manager().import(bad).await.unwrap_err();
        assert!(matches!(err, MemoryError::InvalidImport(_)));
    }

    #[tokio::test]
    async fn test_summary() {
        let mgr = manager();
        assert!(mgr.get_conversation_summary("none").await.unwrap().is_none());
        add(&mgr, "s1", "I am worried about fever", None).await;
        let summary = mgr.get_conversation_summary("s1").await.unwrap().unwrap();
        assert_eq!(summary.total_turns, 1);
        assert_eq!(summary.average_sentiment, Sentiment::Negative.score());
    }
}
