//! Memory repository trait definition.

use chrono::{DateTime, Utc};

use medirag_types::error::RepositoryError;
use medirag_types::memory::{ConversationContext, MemoryCounts, MemoryEntry, UserProfile};

/// Persistence for conversation turns, long-term memories, user profiles,
/// and per-session conversation context.
///
/// Implementations live in medirag-infra (e.g., SqliteMemoryRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MemoryRepository: Send + Sync {
    /// Insert or replace a memory entry by id.
    fn save_entry(
        &self,
        entry: &MemoryEntry,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Session-type entries of one session, oldest first.
    fn list_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryEntry>, RepositoryError>> + Send;

    /// Long-term entries, oldest first, optionally restricted to one user.
    fn list_long_term(
        &self,
        user_id: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryEntry>, RepositoryError>> + Send;

    /// Ids of sessions that still have session-type entries.
    fn list_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;

    /// Delete entries of both types with a timestamp at or before `cutoff`,
    /// plus the contexts of sessions left without entries.
    /// Returns the number of entries removed.
    fn delete_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Delete a user's entries and profile, plus the contexts of sessions left
    /// without entries. Returns the number of entries removed.
    fn delete_user(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Delete all entries, profiles, and contexts.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn counts(&self) -> impl std::future::Future<Output = Result<MemoryCounts, RepositoryError>> + Send;

    fn get_profile(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;

    /// Insert or replace a profile by user id.
    fn save_profile(
        &self,
        profile: &UserProfile,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn list_profiles(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<UserProfile>, RepositoryError>> + Send;

    fn get_context(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ConversationContext>, RepositoryError>> + Send;

    /// Insert or replace the context of `context.session_id`.
    fn save_context(
        &self,
        context: &ConversationContext,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
