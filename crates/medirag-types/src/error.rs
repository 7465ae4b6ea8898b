use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in medirag-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from embedding model operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding model initialization failed: {0}")]
    Init(String),

    #[error("embedding inference failed: {0}")]
    Inference(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors from knowledge base operations.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store error: {0}")]
    VectorStore(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from the memory manager.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("invalid import data: {0}")]
    InvalidImport(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors from the retrieval-augmented response pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("knowledge retrieval failed: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("memory retrieval failed: {0}")]
    Memory(#[from] MemoryError),

    #[error("generation failed: {0}")]
    Llm(#[from] LlmError),

    #[error("generation timed out after {0}s")]
    Timeout(u64),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}
