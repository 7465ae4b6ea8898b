//! Brute-force in-process chunk store.
//!
//! Selected with `knowledge.backend = "memory"`. Chunks are not persisted;
//! on the next start they are rebuilt from the stored documents.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use medirag_types::error::RepositoryError;
use medirag_types::knowledge::{Chunk, ScoredChunk};

use super::store::{ChunkStore, cosine_similarity};

#[derive(Default)]
pub struct InMemoryChunkStore {
    /// Keyed by `(document_id, chunk_index)` so iteration is in document order.
    entries: RwLock<BTreeMap<(String, usize), (Chunk, Vec<f32>)>>,
}

impl InMemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkStore for InMemoryChunkStore {
    async fn upsert(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<(), RepositoryError> {
        if chunks.len() != vectors.len() {
            return Err(RepositoryError::Query(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }
        let mut entries = self.entries.write().await;
        for (chunk, vector) in chunks.iter().zip(vectors) {
            entries.insert(
                (chunk.document_id.clone(), chunk.chunk_index),
                (chunk.clone(), vector.clone()),
            );
        }
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>, RepositoryError> {
        let entries = self.entries.read().await;
        let mut scored: Vec<ScoredChunk> = entries
            .values()
            .map(|(chunk, stored)| ScoredChunk {
                chunk: chunk.clone(),
                similarity: cosine_similarity(vector, stored),
            })
            .collect();
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn all_chunks(&self) -> Result<Vec<Chunk>, RepositoryError> {
        let entries = self.entries.read().await;
        Ok(entries.values().map(|(chunk, _)| chunk.clone()).collect())
    }

    async fn delete_document(&self, document_id: &str) -> Result<u64, RepositoryError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(doc, _), _| doc != document_id);
        Ok((before - entries.len()) as u64)
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use medirag_types::knowledge::{Category, ChunkType};

    use super::*;

    fn chunk(document_id: &str, index: usize, content: &str) -> Chunk {
        Chunk {
            id: format!("{document_id}_chunk_{index}"),
            document_id: document_id.to_string(),
            chunk_index: index,
            title: "Title".to_string(),
            category: Category::General,
            chunk_type: ChunkType::GeneralParagraph,
            content: content.to_string(),
            sentence_count: None,
            start_pos: None,
            end_pos: None,
        }
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = InMemoryChunkStore::new();
        store
            .upsert(
                &[chunk("d1", 0, "x"), chunk("d1", 1, "y"), chunk("d2", 0, "z")],
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
            )
            .await
            .unwrap();

        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.content, "x");
        assert_eq!(hits[1].chunk.content, "z");
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_delete_document() {
        let store = InMemoryChunkStore::new();
        store.upsert(&[chunk("d1", 0, "old")], &[vec![1.0]]).await.unwrap();
        store.upsert(&[chunk("d1", 0, "new")], &[vec![1.0]]).await.unwrap();
        store.upsert(&[chunk("d2", 0, "other")], &[vec![1.0]]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        let all = store.all_chunks().await.unwrap();
        assert_eq!(all[0].content, "new");

        assert_eq!(store.delete_document("d1").await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 1);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_length_mismatch_rejected() {
        let store = InMemoryChunkStore::new();
        let err = store.upsert(&[chunk("d1", 0, "a")], &[]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }
}
