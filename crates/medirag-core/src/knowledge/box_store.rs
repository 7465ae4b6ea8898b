//! BoxChunkStore -- object-safe dynamic dispatch wrapper for ChunkStore.
//!
//! Same pattern as [`BoxEmbedder`](super::box_embedder::BoxEmbedder): a
//! boxed-future `ChunkStoreDyn` trait, a blanket impl, and a wrapper.

use std::future::Future;
use std::pin::Pin;

use medirag_types::error::RepositoryError;
use medirag_types::knowledge::{Chunk, ScoredChunk};

use super::store::ChunkStore;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Object-safe version of [`ChunkStore`] with boxed futures.
pub trait ChunkStoreDyn: Send + Sync {
    fn upsert_boxed<'a>(&'a self, chunks: &'a [Chunk], vectors: &'a [Vec<f32>])
    -> BoxFuture<'a, ()>;

    fn search_boxed<'a>(&'a self, vector: &'a [f32], limit: usize)
    -> BoxFuture<'a, Vec<ScoredChunk>>;

    fn all_chunks_boxed(&self) -> BoxFuture<'_, Vec<Chunk>>;

    fn delete_document_boxed<'a>(&'a self, document_id: &'a str) -> BoxFuture<'a, u64>;

    fn clear_boxed(&self) -> BoxFuture<'_, ()>;

    fn count_boxed(&self) -> BoxFuture<'_, usize>;
}

impl<T: ChunkStore> ChunkStoreDyn for T {
    fn upsert_boxed<'a>(
        &'a self,
        chunks: &'a [Chunk],
        vectors: &'a [Vec<f32>],
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.upsert(chunks, vectors))
    }

    fn search_boxed<'a>(
        &'a self,
        vector: &'a [f32],
        limit: usize,
    ) -> BoxFuture<'a, Vec<ScoredChunk>> {
        Box::pin(self.search(vector, limit))
    }

    fn all_chunks_boxed(&self) -> BoxFuture<'_, Vec<Chunk>> {
        Box::pin(self.all_chunks())
    }

    fn delete_document_boxed<'a>(&'a self, document_id: &'a str) -> BoxFuture<'a, u64> {
        Box::pin(self.delete_document(document_id))
    }

    fn clear_boxed(&self) -> BoxFuture<'_, ()> {
        Box::pin(self.clear())
    }

    fn count_boxed(&self) -> BoxFuture<'_, usize> {
        Box::pin(self.count())
    }
}

/// Type-erased chunk store for runtime backend selection (LanceDB or in-memory).
pub struct BoxChunkStore {
    inner: Box<dyn ChunkStoreDyn + Send + Sync>,
}

impl BoxChunkStore {
    pub fn new<T: ChunkStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub async fn upsert(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<(), RepositoryError> {
        self.inner.upsert_boxed(chunks, vectors).await
    }

    pub async fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredChunk>, RepositoryError> {
        self.inner.search_boxed(vector, limit).await
    }

    pub async fn all_chunks(&self) -> Result<Vec<Chunk>, RepositoryError> {
        self.inner.all_chunks_boxed().await
    }

    pub async fn delete_document(&self, document_id: &str) -> Result<u64, RepositoryError> {
        self.inner.delete_document_boxed(document_id).await
    }

    pub async fn clear(&self) -> Result<(), RepositoryError> {
        self.inner.clear_boxed().await
    }

    pub async fn count(&self) -> Result<usize, RepositoryError> {
        self.inner.count_boxed().await
    }
}
