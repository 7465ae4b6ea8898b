//! Embedder trait for text-to-vector conversion.
//!
//! Defines the interface for embedding text into vectors for semantic search.
//! The local ONNX model lives in medirag-infra; the hashing fallback lives here.

use medirag_types::error::EmbeddingError;

/// Dimension shared by every embedder (all-MiniLM-L6-v2 output size).
pub const EMBEDDING_DIMENSION: usize = 384;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors.
    ///
    /// Returns one vector per input text, in input order.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send;

    /// The model name used for embeddings (e.g., "all-MiniLM-L6-v2").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    fn dimension(&self) -> usize;

    /// Whether vectors currently come from a learned model rather than hashing.
    fn is_model_backed(&self) -> bool;
}
