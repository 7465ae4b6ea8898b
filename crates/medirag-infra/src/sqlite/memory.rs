//! SQLite memory repository implementation.
//!
//! Implements `MemoryRepository` from `medirag-core` using sqlx with split
//! read/write pools. Turns of both memory types share the `memories` table;
//! profiles and session contexts keep their collections as JSON columns.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use medirag_core::repository::memory::MemoryRepository;
use medirag_types::error::RepositoryError;
use medirag_types::memory::{
    ConversationContext, MemoryCounts, MemoryEntry, MemoryType, Sentiment, UserProfile,
};

use super::codec::{format_datetime, from_json, parse_datetime, query_error, to_json};
use super::pool::DatabasePool;

/// Drops contexts of sessions that no longer have any stored turn.
const DELETE_ORPHAN_CONTEXTS: &str = "DELETE FROM conversation_contexts \
     WHERE NOT EXISTS (SELECT 1 FROM memories m WHERE m.session_id = conversation_contexts.session_id)";

/// SQLite-backed implementation of `MemoryRepository`.
pub struct SqliteMemoryRepository {
    pool: DatabasePool,
}

impl SqliteMemoryRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct MemoryEntryRow {
    id: String,
    session_id: String,
    user_id: String,
    user_message: String,
    assistant_response: String,
    timestamp: String,
    context: String,
    memory_type: String,
    relevance_score: f64,
    keywords: String,
    sentiment: String,
    promoted_at: Option<String>,
}

impl MemoryEntryRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            session_id: row.try_get("session_id")?,
            user_id: row.try_get("user_id")?,
            user_message: row.try_get("user_message")?,
            assistant_response: row.try_get("assistant_response")?,
            timestamp: row.try_get("timestamp")?,
            context: row.try_get("context")?,
            memory_type: row.try_get("memory_type")?,
            relevance_score: row.try_get("relevance_score")?,
            keywords: row.try_get("keywords")?,
            sentiment: row.try_get("sentiment")?,
            promoted_at: row.try_get("promoted_at")?,
        })
    }

    fn into_entry(self) -> Result<MemoryEntry, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid memory id: {e}")))?;
        let memory_type: MemoryType = self
            .memory_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let sentiment: Sentiment = self
            .sentiment
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let promoted_at = self.promoted_at.as_deref().map(parse_datetime).transpose()?;

        Ok(MemoryEntry {
            id,
            session_id: self.session_id,
            user_id: self.user_id,
            user_message: self.user_message,
            assistant_response: self.assistant_response,
            timestamp: parse_datetime(&self.timestamp)?,
            context: from_json("context", &self.context)?,
            memory_type,
            relevance_score: self.relevance_score,
            keywords: from_json("keywords", &self.keywords)?,
            sentiment,
            promoted_at,
        })
    }
}

struct UserProfileRow {
    user_id: String,
    total_conversations: i64,
    total_messages: i64,
    health_interests: String,
    sentiment_distribution: String,
    last_interaction: String,
    preferences: String,
}

impl UserProfileRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            total_conversations: row.try_get("total_conversations")?,
            total_messages: row.try_get("total_messages")?,
            health_interests: row.try_get("health_interests")?,
            sentiment_distribution: row.try_get("sentiment_distribution")?,
            last_interaction: row.try_get("last_interaction")?,
            preferences: row.try_get("preferences")?,
        })
    }

    fn into_profile(self) -> Result<UserProfile, RepositoryError> {
        Ok(UserProfile {
            user_id: self.user_id,
            total_conversations: self.total_conversations as u32,
            total_messages: self.total_messages as u32,
            health_interests: from_json("health_interests", &self.health_interests)?,
            sentiment_distribution: from_json(
                "sentiment_distribution",
                &self.sentiment_distribution,
            )?,
            last_interaction: parse_datetime(&self.last_interaction)?,
            preferences: from_json("preferences", &self.preferences)?,
        })
    }
}

fn entries_from_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<MemoryEntry>, RepositoryError> {
    rows.iter()
        .map(|r| MemoryEntryRow::from_row(r).map_err(query_error)?.into_entry())
        .collect()
}

// ---------------------------------------------------------------------------
// MemoryRepository implementation
// ---------------------------------------------------------------------------

impl MemoryRepository for SqliteMemoryRepository {
    async fn save_entry(&self, entry: &MemoryEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO memories (id, session_id, user_id, user_message, assistant_response, timestamp, context, memory_type, relevance_score, keywords, sentiment, promoted_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.session_id)
        .bind(&entry.user_id)
        .bind(&entry.user_message)
        .bind(&entry.assistant_response)
        .bind(format_datetime(&entry.timestamp))
        .bind(to_json(&entry.context)?)
        .bind(entry.memory_type.to_string())
        .bind(entry.relevance_score)
        .bind(to_json(&entry.keywords)?)
        .bind(entry.sentiment.to_string())
        .bind(entry.promoted_at.as_ref().map(format_datetime))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list_session(&self, session_id: &str) -> Result<Vec<MemoryEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM memories WHERE memory_type = 'session' AND session_id = ? ORDER BY timestamp ASC, id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        entries_from_rows(&rows)
    }

    async fn list_long_term(&self, user_id: Option<&str>) -> Result<Vec<MemoryEntry>, RepositoryError> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query(
                    "SELECT * FROM memories WHERE memory_type = 'long_term' AND user_id = ? ORDER BY timestamp ASC, id ASC",
                )
                .bind(user_id)
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT * FROM memories WHERE memory_type = 'long_term' ORDER BY timestamp ASC, id ASC",
                )
                .fetch_all(&self.pool.reader)
                .await
            }
        }
        .map_err(query_error)?;

        entries_from_rows(&rows)
    }

    async fn list_sessions(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT session_id FROM memories WHERE memory_type = 'session' ORDER BY session_id",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let result = sqlx::query("DELETE FROM memories WHERE timestamp <= ?")
            .bind(format_datetime(&cutoff))
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        sqlx::query(DELETE_ORPHAN_CONTEXTS)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_user(&self, user_id: &str) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let result = sqlx::query("DELETE FROM memories WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        sqlx::query("DELETE FROM user_profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        sqlx::query(DELETE_ORPHAN_CONTEXTS)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(result.rows_affected())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;
        for table in ["memories", "user_profiles", "conversation_contexts"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
        }
        tx.commit().await.map_err(query_error)?;
        Ok(())
    }

    async fn counts(&self) -> Result<MemoryCounts, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT
                 (SELECT COUNT(*) FROM memories WHERE memory_type = 'session') AS session_memories,
                 (SELECT COUNT(*) FROM memories WHERE memory_type = 'long_term') AS long_term_memories,
                 (SELECT COUNT(DISTINCT session_id) FROM memories WHERE memory_type = 'session') AS active_sessions,
                 (SELECT COUNT(*) FROM user_profiles) AS user_profiles"#,
        )
        .fetch_one(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let count = |column: &str| -> Result<usize, RepositoryError> {
            row.try_get::<i64, _>(column)
                .map(|n| n as usize)
                .map_err(query_error)
        };

        Ok(MemoryCounts {
            session_memories: count("session_memories")?,
            long_term_memories: count("long_term_memories")?,
            active_sessions: count("active_sessions")?,
            user_profiles: count("user_profiles")?,
        })
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|r| UserProfileRow::from_row(&r).map_err(query_error)?.into_profile())
            .transpose()
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT OR REPLACE INTO user_profiles (user_id, total_conversations, total_messages, health_interests, sentiment_distribution, last_interaction, preferences)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&profile.user_id)
        .bind(profile.total_conversations as i64)
        .bind(profile.total_messages as i64)
        .bind(to_json(&profile.health_interests)?)
        .bind(to_json(&profile.sentiment_distribution)?)
        .bind(format_datetime(&profile.last_interaction))
        .bind(to_json(&profile.preferences)?)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM user_profiles ORDER BY user_id")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;

        rows.iter()
            .map(|r| UserProfileRow::from_row(r).map_err(query_error)?.into_profile())
            .collect()
    }

    async fn get_context(&self, session_id: &str) -> Result<Option<ConversationContext>, RepositoryError> {
        let row = sqlx::query(
            "SELECT session_id, current_topic, flow FROM conversation_contexts WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let flow: String = row.try_get("flow").map_err(query_error)?;
        Ok(Some(ConversationContext {
            session_id: row.try_get("session_id").map_err(query_error)?,
            current_topic: row.try_get("current_topic").map_err(query_error)?,
            flow: from_json("flow", &flow)?,
        }))
    }

    async fn save_context(&self, context: &ConversationContext) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO conversation_contexts (session_id, current_topic, flow) VALUES (?, ?, ?)",
        )
        .bind(&context.session_id)
        .bind(&context.current_topic)
        .bind(to_json(&context.flow)?)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }
}
