//! Arrow schema for the LanceDB knowledge chunk table.
//!
//! Arrow versions MUST match lancedb's transitive dependency (57.3 for lancedb 0.26).

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};

/// all-MiniLM-L6-v2 embedding dimension.
pub const EMBEDDING_DIMENSION: i32 = 384;

/// Name of the single table holding knowledge chunks.
pub const KNOWLEDGE_CHUNKS_TABLE: &str = "knowledge_chunks";

/// Schema for the `knowledge_chunks` table.
///
/// One row per chunk, with the chunk metadata needed to rebuild a
/// `Chunk` and a 384-dimensional float32 vector for cosine search.
pub fn knowledge_chunks_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("document_id", DataType::Utf8, false),
        Field::new("chunk_index", DataType::Int32, false),
        Field::new("title", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("chunk_type", DataType::Utf8, false),
        Field::new("content", DataType::Utf8, false),
        Field::new("sentence_count", DataType::Int32, true),
        Field::new("start_pos", DataType::Int64, true),
        Field::new("end_pos", DataType::Int64, true),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIMENSION,
            ),
            false,
        ),
    ])
}
