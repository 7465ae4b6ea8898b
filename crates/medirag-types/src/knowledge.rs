//! Knowledge base types.
//!
//! Documents are split into chunks, each chunk is embedded and stored in a
//! vector index. Search returns chunks scored by a weighted blend of
//! semantic, keyword, and category similarity.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Topic category of a knowledge document.
///
/// The category selects the chunking strategy and drives category
/// similarity during search.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MedicalCondition,
    Treatment,
    Symptom,
    Prevention,
    Wellness,
    #[default]
    General,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::MedicalCondition,
        Category::Treatment,
        Category::Symptom,
        Category::Prevention,
        Category::Wellness,
        Category::General,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MedicalCondition => "medical_condition",
            Category::Treatment => "treatment",
            Category::Symptom => "symptom",
            Category::Prevention => "prevention",
            Category::Wellness => "wellness",
            Category::General => "general",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "medical_condition" => Ok(Category::MedicalCondition),
            "treatment" => Ok(Category::Treatment),
            "symptom" => Ok(Category::Symptom),
            "prevention" => Ok(Category::Prevention),
            "wellness" => Ok(Category::Wellness),
            "general" => Ok(Category::General),
            "other" => Ok(Category::Other),
            other => Err(format!("invalid category: '{other}'")),
        }
    }
}

/// How a chunk was produced by the chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    MedicalParagraph,
    MedicalSentence,
    GeneralParagraph,
    SplitParagraph,
    LongSentence,
    FixedSize,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::MedicalParagraph => "medical_paragraph",
            ChunkType::MedicalSentence => "medical_sentence",
            ChunkType::GeneralParagraph => "general_paragraph",
            ChunkType::SplitParagraph => "split_paragraph",
            ChunkType::LongSentence => "long_sentence",
            ChunkType::FixedSize => "fixed_size",
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medical_paragraph" => Ok(ChunkType::MedicalParagraph),
            "medical_sentence" => Ok(ChunkType::MedicalSentence),
            "general_paragraph" => Ok(ChunkType::GeneralParagraph),
            "split_paragraph" => Ok(ChunkType::SplitParagraph),
            "long_sentence" => Ok(ChunkType::LongSentence),
            "fixed_size" => Ok(ChunkType::FixedSize),
            other => Err(format!("invalid chunk type: '{other}'")),
        }
    }
}

/// Input for adding a document to the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_source() -> String {
    "manual".to_string()
}

/// A source document stored in the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// 12 hex chars derived from the title and the start of the content.
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub source: String,
    pub tags: Vec<String>,
    pub added_at: DateTime<Utc>,
    pub word_count: usize,
    pub char_count: usize,
}

/// A retrievable span of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// `{document_id}_chunk_{chunk_index}`.
    pub id: String,
    pub document_id: String,
    pub chunk_index: usize,
    pub title: String,
    pub category: Category,
    pub chunk_type: ChunkType,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentence_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_pos: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_pos: Option<usize>,
}

/// A chunk with its vector-store similarity, before re-ranking.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
}

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk_id: String,
    pub document_id: String,
    pub title: String,
    pub category: Category,
    pub chunk_type: ChunkType,
    pub content: String,
    pub relevance_score: f64,
    pub semantic_score: f64,
    pub keyword_score: f64,
    pub category_score: f64,
}

/// Knowledge base statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeStats {
    pub total_documents: usize,
    pub total_chunks: usize,
    pub categories: BTreeMap<String, usize>,
    pub chunk_types: BTreeMap<String, usize>,
    pub average_chunk_size: f64,
    pub embedding_dimension: usize,
    pub embedding_model: String,
    pub embedding_model_available: bool,
    pub relevance_threshold: f64,
    pub last_updated: DateTime<Utc>,
}

/// Full knowledge base dump for backup or analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeExport {
    pub documents: Vec<Document>,
    pub chunks: Vec<Chunk>,
    pub stats: KnowledgeStats,
    pub export_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for category in Category::ALL {
            let parsed: Category = category.to_string().parse().unwrap();
            assert_eq!(category, parsed);
        }
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&Category::MedicalCondition).unwrap();
        assert_eq!(json, "\"medical_condition\"");
    }

    #[test]
    fn test_invalid_category() {
        assert!("cardiology".parse::<Category>().is_err());
    }

    #[test]
    fn test_new_document_defaults() {
        let doc: NewDocument =
            serde_json::from_str(r#"{"title": "Sleep", "content": "Sleep well."}"#).unwrap();
        assert_eq!(doc.category, Category::General);
        assert_eq!(doc.source, "manual");
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn test_chunk_type_display() {
        assert_eq!(ChunkType::LongSentence.to_string(), "long_sentence");
        assert_eq!("fixed_size".parse::<ChunkType>().unwrap(), ChunkType::FixedSize);
    }
}
