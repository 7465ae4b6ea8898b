//! Conversation memory: session turns, long-term memories and user profiles.
//!
//! `MemoryManager` holds the rules (promotion, retention, profile updates);
//! storage goes through the `MemoryRepository` port.

pub mod insights;
pub mod manager;
