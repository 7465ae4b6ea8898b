//! Infrastructure layer for MediRAG.
//!
//! Contains implementations of the ports defined in `medirag-core`:
//! SQLite repositories, the LanceDB chunk store, the fastembed embedder,
//! the OpenAI-compatible LLM provider, and the config loader.

pub mod config;
pub mod llm;
pub mod sqlite;
pub mod vector;
