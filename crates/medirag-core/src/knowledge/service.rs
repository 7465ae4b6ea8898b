//! Knowledge base service.
//!
//! Owns the add/search lifecycle: documents are chunked by category,
//! embedded, and written to the chunk store; queries are embedded, matched
//! against a candidate pool of nearest chunks, and re-ranked.

use std::collections::BTreeMap;

use chrono::Utc;
use sha2::{Digest, Sha256};

use medirag_types::config::KnowledgeConfig;
use medirag_types::error::KnowledgeError;
use medirag_types::knowledge::{
    Category, Chunk, Document, KnowledgeExport, KnowledgeStats, NewDocument, SearchResult,
};

use crate::repository::document::DocumentRepository;
use crate::text::truncate_chars;

use super::box_store::BoxChunkStore;
use super::chunker::Chunker;
use super::embedder::Embedder;
use super::fallback::FallbackEmbedder;
use super::scoring;
use super::seed;

/// Chunks embedded per call during reindexing.
const REINDEX_BATCH: usize = 32;

/// Id of a document: 12 hex chars of SHA-256 over the title and the first
/// 100 chars of the content.
pub fn document_id(title: &str, content: &str) -> String {
    let digest = Sha256::digest(format!("{title}:{}", truncate_chars(content, 100)).as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(12);
    hex
}

/// Build a document from a text or markdown file body.
///
/// The title is the first markdown heading, or `fallback_title` when the
/// body has none.
pub fn document_from_text(
    body: &str,
    fallback_title: &str,
    category: Category,
    source: &str,
    tags: Vec<String>,
) -> NewDocument {
    let title = body
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix('#'))
        .map(|heading| heading.trim_start_matches('#').trim().to_string())
        .filter(|heading| !heading.is_empty())
        .unwrap_or_else(|| fallback_title.to_string());

    NewDocument {
        title,
        content: body.trim().to_string(),
        category,
        source: source.to_string(),
        tags,
    }
}

/// Service for adding, searching and maintaining knowledge documents.
///
/// Generic over the document repository; the chunk store and embedder are
/// chosen at runtime.
pub struct KnowledgeService<D: DocumentRepository> {
    documents: D,
    chunks: BoxChunkStore,
    embedder: FallbackEmbedder,
    chunker: Chunker,
    relevance_threshold: f64,
    candidate_pool: usize,
}

impl<D: DocumentRepository> KnowledgeService<D> {
    pub fn new(
        documents: D,
        chunks: BoxChunkStore,
        embedder: FallbackEmbedder,
        config: &KnowledgeConfig,
    ) -> Self {
        Self {
            documents,
            chunks,
            embedder,
            chunker: Chunker::from_config(config),
            relevance_threshold: config.relevance_threshold,
            candidate_pool: config.candidate_pool.max(1),
        }
    }

    /// Whether vectors currently come from the learned model.
    pub fn is_model_backed(&self) -> bool {
        self.embedder.is_model_backed()
    }

    pub fn embedding_model(&self) -> &str {
        self.embedder.model_name()
    }

    pub fn relevance_threshold(&self) -> f64 {
        self.relevance_threshold
    }

    /// Chunk, embed and store a document.
    ///
    /// Adding a document whose id already exists replaces its chunks.
    pub async fn add_document(&self, new: NewDocument) -> Result<Document, KnowledgeError> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(KnowledgeError::InvalidDocument("title cannot be empty".to_string()));
        }
        if new.content.trim().is_empty() {
            return Err(KnowledgeError::InvalidDocument("content cannot be empty".to_string()));
        }

        let document = Document {
            id: document_id(&title, &new.content),
            title,
            word_count: new.content.split_whitespace().count(),
            char_count: new.content.chars().count(),
            content: new.content,
            category: new.category,
            source: new.source,
            tags: new.tags,
            added_at: Utc::now(),
        };

        let chunks = self.index_document(&document).await?;
        self.documents.save(&document).await?;

        tracing::info!(
            document_id = %document.id,
            title = %document.title,
            category = %document.category,
            chunks,
            "Added knowledge document"
        );
        Ok(document)
    }

    /// Chunk and embed `document`, replacing any chunks it already has.
    ///
    /// Returns the number of chunks stored.
    async fn index_document(&self, document: &Document) -> Result<usize, KnowledgeError> {
        let chunks: Vec<Chunk> = self
            .chunker
            .chunk(&document.content, document.category)
            .into_iter()
            .enumerate()
            .map(|(index, draft)| Chunk {
                id: format!("{}_chunk_{index}", document.id),
                document_id: document.id.clone(),
                chunk_index: index,
                title: document.title.clone(),
                category: document.category,
                chunk_type: draft.chunk_type,
                content: draft.content,
                sentence_count: draft.sentence_count,
                start_pos: draft.start_pos,
                end_pos: draft.end_pos,
            })
            .collect();

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed(&texts).await?;

        let replaced = self.chunks.delete_document(&document.id).await?;
        self.chunks.upsert(&chunks, &vectors).await?;
        if replaced > 0 {
            tracing::debug!(document_id = %document.id, replaced, "Replaced document chunks");
        }
        Ok(chunks.len())
    }

    /// Search for chunks relevant to `query`.
    ///
    /// With a `category_filter`, chunks from other categories keep competing
    /// at half their score.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        category_filter: Option<Category>,
    ) -> Result<Vec<SearchResult>, KnowledgeError> {
        if query.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut vectors = self.embedder.embed(&[query.to_string()]).await?;
        let Some(vector) = vectors.pop() else {
            return Ok(Vec::new());
        };

        let candidates = self
            .chunks
            .search(&vector, self.candidate_pool.max(limit))
            .await?;
        let results = scoring::rank(
            query,
            candidates,
            category_filter,
            self.relevance_threshold,
            limit,
        );

        tracing::debug!(
            query_len = query.len(),
            results = results.len(),
            filter = ?category_filter,
            "Knowledge search"
        );
        Ok(results)
    }

    pub async fn stats(&self) -> Result<KnowledgeStats, KnowledgeError> {
        let total_documents = self.documents.count().await?;
        let chunks = self.chunks.all_chunks().await?;

        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        let mut chunk_types: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_chars = 0usize;
        for chunk in &chunks {
            *categories.entry(chunk.category.to_string()).or_default() += 1;
            *chunk_types.entry(chunk.chunk_type.to_string()).or_default() += 1;
            total_chars += chunk.content.chars().count();
        }

        let average_chunk_size = if chunks.is_empty() {
            0.0
        } else {
            ((total_chars as f64 / chunks.len() as f64) * 100.0).round() / 100.0
        };

        Ok(KnowledgeStats {
            total_documents,
            total_chunks: chunks.len(),
            categories,
            chunk_types,
            average_chunk_size,
            embedding_dimension: self.embedder.dimension(),
            embedding_model: self.embedder.model_name().to_string(),
            embedding_model_available: self.embedder.is_model_backed(),
            relevance_threshold: self.relevance_threshold,
            last_updated: Utc::now(),
        })
    }

    pub async fn export(&self) -> Result<KnowledgeExport, KnowledgeError> {
        Ok(KnowledgeExport {
            documents: self.documents.list().await?,
            chunks: self.chunks.all_chunks().await?,
            stats: self.stats().await?,
            export_timestamp: Utc::now(),
        })
    }

    /// Remove every document and chunk.
    pub async fn clear(&self) -> Result<(), KnowledgeError> {
        self.chunks.clear().await?;
        let removed = self.documents.clear().await?;
        tracing::info!(documents = removed, "Cleared knowledge base");
        Ok(())
    }

    /// True when search has nothing to match against.
    pub async fn is_empty(&self) -> Result<bool, KnowledgeError> {
        Ok(self.chunks.count().await? == 0)
    }

    /// Make the knowledge base searchable on startup.
    ///
    /// With no documents, loads the built-in healthcare documents. With
    /// stored documents but no chunks (the in-process chunk store after a
    /// restart), rebuilds the chunks from the stored documents instead.
    /// Returns the number of documents added.
    pub async fn seed_healthcare_data(&self) -> Result<usize, KnowledgeError> {
        if self.documents.count().await? > 0 {
            if self.is_empty().await? {
                self.rebuild_chunks().await?;
            }
            return Ok(0);
        }
        let documents = seed::healthcare_documents();
        let count = documents.len();
        for document in documents {
            self.add_document(document).await?;
        }
        tracing::info!(documents = count, "Seeded healthcare knowledge base");
        Ok(count)
    }

    /// Re-chunk and re-embed every stored document.
    ///
    /// Returns the number of chunks stored.
    pub async fn rebuild_chunks(&self) -> Result<usize, KnowledgeError> {
        let documents = self.documents.list().await?;
        let mut total = 0;
        for document in &documents {
            total += self.index_document(document).await?;
        }
        tracing::info!(
            documents = documents.len(),
            chunks = total,
            "Rebuilt knowledge chunks from stored documents"
        );
        Ok(total)
    }

    /// Re-embed every stored chunk with the current embedder.
    ///
    /// Returns the number of chunks rewritten.
    pub async fn reindex(&self) -> Result<usize, KnowledgeError> {
        let chunks = self.chunks.all_chunks().await?;
        for batch in chunks.chunks(REINDEX_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self.embedder.embed(&texts).await?;
            self.chunks.upsert(batch, &vectors).await?;
        }
        tracing::info!(
            chunks = chunks.len(),
            model = self.embedder.model_name(),
            "Reindexed knowledge chunks"
        );
        Ok(chunks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDocumentRepository, knowledge_service, knowledge_service_over};

    fn doc(title: &str, content: &str, category: Category) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            content: content.to_string(),
            category,
            source: "test".to_string(),
            tags: vec![],
        }
    }

    #[test]
    fn test_document_id_is_stable_hex() {
        let a = document_id("Sleep", "Sleep well every night.");
        let b = document_id("Sleep", "Sleep well every night.");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, document_id("Rest", "Sleep well every night."));
        // Only the first 100 chars of content matter.
        let long = "x".repeat(100);
        assert_eq!(
            document_id("T", &format!("{long}tail one")),
            document_id("T", &format!("{long}tail two"))
        );
    }

    #[test]
    fn test_document_from_text_heading() {
        let doc = document_from_text(
            "\n## Sleep Hygiene\n\nKeep a schedule.",
            "notes",
            Category::Wellness,
            "file",
            vec![],
        );
        assert_eq!(doc.title, "Sleep Hygiene");
        assert!(doc.content.starts_with("## Sleep Hygiene"));

        let plain = document_from_text("Just text.", "notes", Category::Other, "file", vec![]);
        assert_eq!(plain.title, "notes");
    }

    #[tokio::test]
    async fn test_add_document_chunks_and_counts() {
        let kb = knowledge_service(0.0);
        let added = kb
            .add_document(doc(
                "Cold care",
                "Rest well. Drink fluids.\n\nUse lozenges for sore throats.",
                Category::Treatment,
            ))
            .await
            .unwrap();
        assert_eq!(added.word_count, 9);

        let stats = kb.stats().await.unwrap();
        assert_eq!(stats.total_documents, 1);
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.categories.get("treatment"), Some(&2));
        assert_eq!(stats.chunk_types.get("medical_paragraph"), Some(&2));
        assert_eq!(stats.embedding_dimension, 384);
        assert!(!stats.embedding_model_available);
    }

    #[tokio::test]
    async fn test_readding_replaces_chunks() {
        let kb = knowledge_service(0.0);
        let content = "One.\n\nTwo.\n\nThree.";
        kb.add_document(doc("Same", content, Category::General)).await.unwrap();
        kb.add_document(doc("Same", content, Category::General)).await.unwrap();
        let stats = kb.stats().await.unwrap();
        assert_eq!(stats.total_documents, 1);
        assert_eq!(stats.total_chunks, 3);
    }

    #[tokio::test]
    async fn test_add_document_rejects_empty() {
        let kb = knowledge_service(0.0);
        let err = kb.add_document(doc(" ", "content", Category::General)).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::InvalidDocument(_)));
        let err = kb.add_document(doc("Title", "  ", Category::General)).await.unwrap_err();
        assert!(matches!(err, KnowledgeError::InvalidDocument(_)));
    }

    #[tokio::test]
    async fn test_search_ranks_matching_document_first() {
        let kb = knowledge_service(0.0);
        kb.add_document(doc("Throat", "zinc lozenges soothe throats", Category::Treatment))
            .await
            .unwrap();
        kb.add_document(doc("Back", "stretching eases stiff backs", Category::Wellness))
            .await
            .unwrap();

        let results = kb.search("zinc lozenges", 5, None).await.unwrap();
        assert_eq!(results[0].title, "Throat");
        assert!(results[0].semantic_score > results[1].semantic_score);
        assert!(results[0].keyword_score > 0.0);
    }

    #[tokio::test]
    async fn test_search_threshold_and_empty_query() {
        let kb = knowledge_service(0.99);
        kb.add_document(doc("Throat", "zinc lozenges soothe throats", Category::Treatment))
            .await
            .unwrap();
        assert!(kb.search("stretching", 5, None).await.unwrap().is_empty());
        assert!(kb.search("   ", 5, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_filter_penalises_other_categories() {
        let kb = knowledge_service(0.0);
        kb.add_document(doc("Throat", "zinc lozenges soothe throats", Category::Treatment))
            .await
            .unwrap();
        let unfiltered = kb.search("zinc lozenges", 1, None).await.unwrap();
        let filtered = kb
            .search("zinc lozenges", 1, Some(Category::Wellness))
            .await
            .unwrap();
        assert!((filtered[0].relevance_score * 2.0 - unfiltered[0].relevance_score).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_seed_is_idempotent_and_searchable() {
        let kb = knowledge_service(0.0);
        assert_eq!(kb.seed_healthcare_data().await.unwrap(), 12);
        assert_eq!(kb.seed_healthcare_data().await.unwrap(), 0);

        let stats = kb.stats().await.unwrap();
        assert_eq!(stats.total_documents, 12);
        assert!(stats.total_chunks >= 12);

        let results = kb
            .search("hypertension management blood pressure", 5, None)
            .await
            .unwrap();
        assert!(results.iter().any(|r| r.title == "Hypertension Management"));
    }

    #[tokio::test]
    async fn test_reindex_and_clear() {
        let kb = knowledge_service(0.0);
        kb.add_document(doc("A", "alpha.\n\nbeta.", Category::General)).await.unwrap();
        assert_eq!(kb.reindex().await.unwrap(), 2);

        let export = kb.export().await.unwrap();
        assert_eq!(export.documents.len(), 1);
        assert_eq!(export.chunks.len(), 2);

        kb.clear().await.unwrap();
        assert!(kb.is_empty().await.unwrap());
        assert_eq!(kb.stats().await.unwrap().total_chunks, 0);
    }

    #[tokio::test]
    async fn test_restart_with_empty_chunk_store_rebuilds_chunks() {
        let documents = MockDocumentRepository::default();

        let first = knowledge_service_over(documents.clone(), 0.0);
        assert_eq!(first.seed_healthcare_data().await.unwrap(), 12);
        let indexed = first.stats().await.unwrap().total_chunks;
        drop(first);

        let restarted = knowledge_service_over(documents, 0.0);
        assert!(restarted.is_empty().await.unwrap());
        assert_eq!(restarted.seed_healthcare_data().await.unwrap(), 0);

        let stats = restarted.stats().await.unwrap();
        assert_eq!(stats.total_documents, 12);
        assert_eq!(stats.total_chunks, indexed);
        let results = restarted
            .search("hypertension management blood pressure", 5, None)
            .await
            .unwrap();
        assert!(!results.is_empty());
    }
}
