//! Shared domain types for MediRAG.
//!
//! This crate contains the core domain types used across the assistant:
//! knowledge documents and chunks, conversation memory, chat replies,
//! evaluation reports, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod knowledge;
pub mod llm;
pub mod memory;
