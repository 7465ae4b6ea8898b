//! Re-ranking of vector-store candidates.
//!
//! The final relevance of a chunk blends cosine similarity with word-set
//! overlap and a bonus for queries that name the chunk's category.

use medirag_types::knowledge::{Category, ScoredChunk, SearchResult};

use crate::text::keyword_similarity;

pub const SEMANTIC_WEIGHT: f64 = 0.7;
pub const KEYWORD_WEIGHT: f64 = 0.2;
pub const CATEGORY_WEIGHT: f64 = 0.1;

/// Multiplier for chunks outside the requested category.
pub const FILTER_PENALTY: f64 = 0.5;

/// Query terms that indicate interest in a category.
pub fn category_terms(category: Category) -> &'static [&'static str] {
    match category {
        Category::MedicalCondition => &["condition", "disease", "illness", "symptom"],
        Category::Treatment => &["treatment", "therapy", "medication", "cure"],
        Category::Prevention => &["prevention", "prevent", "avoid", "protection"],
        Category::Wellness => &["wellness", "health", "fitness", "lifestyle"],
        Category::Symptom | Category::General | Category::Other => &[],
    }
}

/// Share of the category's terms found in the query, in `[0, 1]`.
pub fn category_similarity(query: &str, category: Category) -> f64 {
    let terms = category_terms(category);
    if terms.is_empty() {
        return 0.0;
    }
    let query = query.to_lowercase();
    let matches = terms.iter().filter(|t| query.contains(*t)).count();
    (matches as f64 / terms.len() as f64).min(1.0)
}

/// Score one candidate against the query.
pub fn score_candidate(
    query: &str,
    candidate: ScoredChunk,
    category_filter: Option<Category>,
) -> SearchResult {
    let chunk = candidate.chunk;
    let semantic = f64::from(candidate.similarity);
    let keyword = keyword_similarity(query, &chunk.content);
    let category = category_similarity(query, chunk.category);

    let mut combined =
        semantic * SEMANTIC_WEIGHT + keyword * KEYWORD_WEIGHT + category * CATEGORY_WEIGHT;
    if category_filter.is_some_and(|wanted| wanted != chunk.category) {
        combined *= FILTER_PENALTY;
    }

    SearchResult {
        chunk_id: chunk.id,
        document_id: chunk.document_id,
        title: chunk.title,
        category: chunk.category,
        chunk_type: chunk.chunk_type,
        content: chunk.content,
        relevance_score: combined,
        semantic_score: semantic,
        keyword_score: keyword,
        category_score: category,
    }
}

/// Score, sort descending, drop results under `threshold`, keep `limit`.
pub fn rank(
    query: &str,
    candidates: Vec<ScoredChunk>,
    category_filter: Option<Category>,
    threshold: f64,
    limit: usize,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = candidates
        .into_iter()
        .map(|c| score_candidate(query, c, category_filter))
        .collect();
    results.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    results.retain(|r| r.relevance_score >= threshold);
    results.truncate(limit);
    results
}
