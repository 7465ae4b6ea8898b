//! Chunk vector store trait.
//!
//! Stores chunk embeddings and answers nearest-neighbour queries. The
//! LanceDB implementation lives in medirag-infra; [`InMemoryChunkStore`]
//! is a brute-force implementation for small datasets and tests.
//!
//! [`InMemoryChunkStore`]: super::memory_store::InMemoryChunkStore

use medirag_types::error::RepositoryError;
use medirag_types::knowledge::{Chunk, ScoredChunk};

/// Trait for vector-indexed chunk storage.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ChunkStore: Send + Sync {
    /// Insert chunks with their vectors, replacing chunks with the same id.
    ///
    /// `vectors[i]` belongs to `chunks[i]`.
    fn upsert(
        &self,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// The `limit` chunks nearest to `vector`, most similar first.
    ///
    /// Similarity is cosine similarity (`1 - cosine distance`).
    fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ScoredChunk>, RepositoryError>> + Send;

    /// Every stored chunk, ordered by document then chunk index.
    fn all_chunks(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Chunk>, RepositoryError>> + Send;

    /// Delete all chunks of a document. Returns the number removed.
    fn delete_document(
        &self,
        document_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    fn clear(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<usize, RepositoryError>> + Send;
}

/// Cosine similarity of two equal-length vectors; 0 when either is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
