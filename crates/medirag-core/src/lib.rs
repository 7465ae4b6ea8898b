//! Business logic and repository trait definitions for MediRAG.
//!
//! This crate defines the "ports" (repository, chunk store, embedder and
//! LLM traits) that the infrastructure layer implements, plus the services
//! built on them. It depends only on `medirag-types` -- never on
//! `medirag-infra` or any database/IO crate.

pub mod evaluation;
pub mod knowledge;
pub mod llm;
pub mod memory;
pub mod rag;
pub mod repository;
pub mod text;

#[cfg(test)]
mod testing;
