//! Retrieval-augmented reply generation.
//!
//! [`service::RagService`] ties the knowledge base, conversation memory and
//! an optional language model together. Without a model, or when the model
//! fails, replies come from style templates.

pub mod context;
pub mod prompt;
pub mod service;
pub mod style;
pub mod templates;
pub mod topics;
