//! Document repository trait definition.

use medirag_types::error::RepositoryError;
use medirag_types::knowledge::Document;

/// Persistence for knowledge base source documents.
///
/// Chunk vectors live in a [`ChunkStore`](crate::knowledge::store::ChunkStore);
/// this repository keeps the documents they were cut from.
pub trait DocumentRepository: Send + Sync {
    /// Insert or replace a document by id.
    fn save(
        &self,
        document: &Document,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Document>, RepositoryError>> + Send;

    /// All documents, oldest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Document>, RepositoryError>> + Send;

    /// Returns false if no document had this id.
    fn delete(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Delete every document. Returns the number removed.
    fn clear(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<usize, RepositoryError>> + Send;
}
