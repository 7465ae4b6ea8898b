//! LanceDB-backed chunk store for the knowledge base.
//!
//! Implements `ChunkStore` from `medirag-core` over the single
//! `knowledge_chunks` table. Search uses cosine distance; the reported
//! similarity is `1 - distance`.

use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, Int64Array, RecordBatch,
    RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field};
use futures_util::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use medirag_core::knowledge::store::ChunkStore;
use medirag_types::error::RepositoryError;
use medirag_types::knowledge::{Category, Chunk, ChunkType, ScoredChunk};

use super::lance::LanceVectorStore;
use super::schema::{EMBEDDING_DIMENSION, KNOWLEDGE_CHUNKS_TABLE, knowledge_chunks_schema};

/// LanceDB implementation of [`ChunkStore`].
pub struct LanceChunkStore {
    table: lancedb::Table,
}

impl LanceChunkStore {
    /// Open (creating if needed) the `knowledge_chunks` table.
    pub async fn open(store: &LanceVectorStore) -> Result<Self, RepositoryError> {
        let table = store
            .ensure_table(KNOWLEDGE_CHUNKS_TABLE, Arc::new(knowledge_chunks_schema()))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to open chunk table: {e}")))?;
        Ok(Self { table })
    }

    fn build_record_batch(chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<RecordBatch, RepositoryError> {
        if chunks.len() != vectors.len() {
            return Err(RepositoryError::Query(format!(
                "{} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != EMBEDDING_DIMENSION as usize) {
            return Err(RepositoryError::Query(format!(
                "vector dimension {} does not match {EMBEDDING_DIMENSION}",
                bad.len()
            )));
        }

        let strings = |f: fn(&Chunk) -> &str| StringArray::from_iter_values(chunks.iter().map(f));

        let chunk_index = Int32Array::from_iter_values(chunks.iter().map(|c| c.chunk_index as i32));
        let sentence_count: Int32Array =
            chunks.iter().map(|c| c.sentence_count.map(|n| n as i32)).collect();
        let start_pos: Int64Array = chunks.iter().map(|c| c.start_pos.map(|n| n as i64)).collect();
        let end_pos: Int64Array = chunks.iter().map(|c| c.end_pos.map(|n| n as i64)).collect();

        let values = Float32Array::from(vectors.concat());
        let field = Arc::new(Field::new("item", DataType::Float32, true));
        let vector_array = FixedSizeListArray::try_new(field, EMBEDDING_DIMENSION, Arc::new(values), None)
            .map_err(|e| RepositoryError::Query(format!("Failed to build vector column: {e}")))?;

        RecordBatch::try_new(
            Arc::new(knowledge_chunks_schema()),
            vec![
                Arc::new(strings(|c| &c.id)),
                Arc::new(strings(|c| &c.document_id)),
                Arc::new(chunk_index),
                Arc::new(strings(|c| &c.title)),
                Arc::new(strings(|c| c.category.as_str())),
                Arc::new(strings(|c| c.chunk_type.as_str())),
                Arc::new(strings(|c| &c.content)),
                Arc::new(sentence_count),
                Arc::new(start_pos),
                Arc::new(end_pos),
                Arc::new(vector_array),
            ],
        )
        .map_err(|e| RepositoryError::Query(format!("Failed to build record batch: {e}")))
    }

    /// Rebuild chunks from a result batch, paired with the `_distance`
    /// column when the batch came from a vector search.
    fn record_batch_to_chunks(batch: &RecordBatch) -> Result<Vec<(Chunk, Option<f32>)>, RepositoryError> {
        let num_rows = batch.num_rows();
        if num_rows == 0 {
            return Ok(Vec::new());
        }

        let id = string_column(batch, "id")?;
        let document_id = string_column(batch, "document_id")?;
        let chunk_index = typed_column::<Int32Array>(batch, "chunk_index")?;
        let title = string_column(batch, "title")?;
        let category = string_column(batch, "category")?;
        let chunk_type = string_column(batch, "chunk_type")?;
        let content = string_column(batch, "content")?;
        let sentence_count = typed_column::<Int32Array>(batch, "sentence_count")?;
        let start_pos = typed_column::<Int64Array>(batch, "start_pos")?;
        let end_pos = typed_column::<Int64Array>(batch, "end_pos")?;
        let distance = batch
            .column_by_name("_distance")
            .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

        let mut chunks = Vec::with_capacity(num_rows);
        for i in 0..num_rows {
            let category: Category = category
                .value(i)
                .parse()
                .map_err(|e: String| RepositoryError::Query(e))?;
            let chunk_type: ChunkType = chunk_type
                .value(i)
                .parse()
                .map_err(|e: String| RepositoryError::Query(e))?;

            let chunk = Chunk {
                id: id.value(i).to_string(),
                document_id: document_id.value(i).to_string(),
                chunk_index: chunk_index.value(i) as usize,
                title: title.value(i).to_string(),
                category,
                chunk_type,
                content: content.value(i).to_string(),
                sentence_count: (!sentence_count.is_null(i)).then(|| sentence_count.value(i) as u32),
                start_pos: (!start_pos.is_null(i)).then(|| start_pos.value(i) as usize),
                end_pos: (!end_pos.is_null(i)).then(|| end_pos.value(i) as usize),
            };
            chunks.push((chunk, distance.map(|d| d.value(i))));
        }
        Ok(chunks)
    }

    async fn collect(
        stream: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<(Chunk, Option<f32>)>, RepositoryError> {
        let batches: Vec<RecordBatch> = stream
            .try_collect()
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to collect results: {e}")))?;

        let mut chunks = Vec::new();
        for batch in &batches {
            chunks.extend(Self::record_batch_to_chunks(batch)?);
        }
        Ok(chunks)
    }
}

fn typed_column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T, RepositoryError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| RepositoryError::Query(format!("missing or mistyped column: {name}")))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, RepositoryError> {
    typed_column::<StringArray>(batch, name)
}

/// Quote a value for a Lance SQL filter.
fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl ChunkStore for LanceChunkStore {
    async fn upsert(&self, chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<(), RepositoryError> {
        if chunks.is_empty() {
            return Ok(());
        }
        let batch = Self::build_record_batch(chunks, vectors)?;

        let ids: Vec<String> = chunks.iter().map(|c| sql_literal(&c.id)).collect();
        self.table
            .delete(&format!("id IN ({})", ids.join(", ")))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to replace chunks: {e}")))?;

        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);
        self.table
            .add(reader)
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to add chunks: {e}")))?;

        tracing::debug!(count = chunks.len(), "Upserted knowledge chunks");
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredChunk>, RepositoryError> {
        if limit == 0 || self.count().await? == 0 {
            return Ok(Vec::new());
        }

        let stream = self
            .table
            .vector_search(vector)
            .map_err(|e| RepositoryError::Query(format!("Vector search setup failed: {e}")))?
            .distance_type(lancedb::DistanceType::Cosine)
            .limit(limit)
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("Vector search failed: {e}")))?;

        let mut scored: Vec<ScoredChunk> = Self::collect(stream)
            .await?
            .into_iter()
            .map(|(chunk, distance)| ScoredChunk {
                chunk,
                similarity: 1.0 - distance.unwrap_or(1.0),
            })
            .collect();

        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn all_chunks(&self) -> Result<Vec<Chunk>, RepositoryError> {
        let stream = self
            .table
            .query()
            .execute()
            .await
            .map_err(|e| RepositoryError::Query(format!("Chunk scan failed: {e}")))?;

        let mut chunks: Vec<Chunk> = Self::collect(stream).await?.into_iter().map(|(c, _)| c).collect();
        chunks.sort_by(|a, b| {
            a.document_id
                .cmp(&b.document_id)
                .then(a.chunk_index.cmp(&b.chunk_index))
        });
        Ok(chunks)
    }

    async fn delete_document(&self, document_id: &str) -> Result<u64, RepositoryError> {
        let filter = format!("document_id = {}", sql_literal(document_id));
        let count = self
            .table
            .count_rows(Some(filter.clone()))
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to count chunks: {e}")))?;
        if count == 0 {
            return Ok(0);
        }

        self.table
            .delete(&filter)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to delete chunks: {e}")))?;
        Ok(count as u64)
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.table
            .delete("id IS NOT NULL")
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to clear chunks: {e}")))?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        self.table
            .count_rows(None)
            .await
            .map_err(|e| RepositoryError::Query(format!("Failed to count chunks: {e}")))
    }
}
