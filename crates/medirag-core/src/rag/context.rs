//! Context assembly for generation: merging retrieved chunks and
//! rendering knowledge and memory as prompt text.

use std::collections::{BTreeMap, HashSet};

use medirag_types::knowledge::{Category, SearchResult};
use medirag_types::memory::MemoryEntry;

use crate::memory::insights::top_counts;
use crate::text::{contains_any, truncate_chars};

/// Results kept after merging direct and category searches.
pub const MAX_KNOWLEDGE_RESULTS: usize = 5;
const KNOWLEDGE_CONTEXT_SOURCES: usize = 3;
const MEMORY_CONTEXT_TURNS: usize = 2;
const SUMMARY_TOPICS: usize = 3;

/// Query terms that trigger an extra search filtered to the category.
pub fn retrieval_terms(category: Category) -> &'static [&'static str] {
    match category {
        Category::MedicalCondition => &["condition", "disease", "illness", "symptom", "diagnosis"],
        Category::Treatment => &["treatment", "therapy", "medication", "cure", "remedy"],
        Category::Prevention => &["prevention", "prevent", "avoid", "protection", "screening"],
        Category::Wellness => &["wellness", "health", "fitness", "lifestyle", "nutrition"],
        Category::Symptom | Category::General | Category::Other => &[],
    }
}

/// Categories whose retrieval terms occur in the query.
pub fn query_categories(query: &str) -> Vec<Category> {
    Category::ALL
        .into_iter()
        .filter(|c| contains_any(query, retrieval_terms(*c)))
        .collect()
}

/// Drop results whose content was already seen, then keep the best
/// [`MAX_KNOWLEDGE_RESULTS`].
pub fn merge_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    let mut merged: Vec<SearchResult> = results
        .into_iter()
        .filter(|r| seen.insert(r.content.clone()))
        .collect();
    merged.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    merged.truncate(MAX_KNOWLEDGE_RESULTS);
    merged
}

pub fn format_knowledge_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .take(KNOWLEDGE_CONTEXT_SOURCES)
        .enumerate()
        .map(|(i, r)| {
            format!(
                "Source {}: {}\nContent: {}...\nRelevance: {:.2}",
                i + 1,
                r.title,
                truncate_chars(&r.content, 200),
                r.relevance_score
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_memory_context(memories: &[MemoryEntry]) -> String {
    memories
        .iter()
        .take(MEMORY_CONTEXT_TURNS)
        .map(|m| {
            format!(
                "Previous: {}...\nResponse: {}...",
                truncate_chars(&m.user_message, 100),
                truncate_chars(&m.assistant_response, 100)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Topic and mood of the memories used as context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySummary {
    pub main_topics: Vec<(String, u32)>,
    pub average_sentiment: f64,
    pub conversation_length: usize,
}

pub fn summarize_memories(memories: &[MemoryEntry]) -> MemorySummary {
    if memories.is_empty() {
        return MemorySummary::default();
    }

    let mut topics: BTreeMap<String, u32> = BTreeMap::new();
    for keyword in memories.iter().flat_map(|m| &m.keywords) {
        *topics.entry(keyword.clone()).or_default() += 1;
    }
    let average_sentiment =
        memories.iter().map(|m| m.sentiment.score()).sum::<f64>() / memories.len() as f64;

    MemorySummary {
        main_topics: top_counts(&topics, SUMMARY_TOPICS),
        average_sentiment,
        conversation_length: memories.len(),
    }
}

/// Everything the generators need for one reply.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub user_message: String,
    pub user_id: Option<String>,
    pub knowledge_context: String,
    pub memory_context: String,
    pub summary: MemorySummary,
}

impl GenerationContext {
    pub fn new(
        user_message: &str,
        user_id: Option<&str>,
        knowledge: &[SearchResult],
        memories: &[MemoryEntry],
    ) -> Self {
        Self {
            user_message: user_message.to_string(),
            user_id: user_id.map(str::to_string),
            knowledge_context: format_knowledge_context(knowledge),
            memory_context: format_memory_context(memories),
            summary: summarize_memories(memories),
        }
    }

    /// Knowledge then memory context, cut to `max_chars`.
    pub fn prompt_context(&self, max_chars: usize) -> String {
        let mut sections = Vec::new();
        if !self.knowledge_context.is_empty() {
            sections.push(format!("Relevant medical information:\n{}", self.knowledge_context));
        }
        if !self.memory_context.is_empty() {
            sections.push(format!("Earlier in this conversation:\n{}", self.memory_context));
        }
        if !self.summary.main_topics.is_empty() {
            let topics: Vec<&str> = self.summary.main_topics.iter().map(|(t, _)| t.as_str()).collect();
            sections.push(format!("Recurring topics: {}", topics.join(", ")));
        }
        truncate_chars(&sections.join("\n\n"), max_chars).to_string()
    }
}
