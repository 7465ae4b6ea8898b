//! Retrieval quality metrics over ranked result lists.

use std::collections::HashSet;

use medirag_types::evaluation::QueryRetrievalMetrics;
use medirag_types::knowledge::SearchResult;

/// Whether any keyword occurs in the result's lowercased content or title.
pub fn is_relevant(result: &SearchResult, keywords: &[String]) -> bool {
    let content = result.content.to_lowercase();
    let title = result.title.to_lowercase();
    keywords
        .iter()
        .any(|k| content.contains(k.as_str()) || title.contains(k.as_str()))
}

/// Normalised discounted cumulative gain of a ranked relevance list.
///
/// The ideal ranking places `min(total_relevant, retrieved)` relevant
/// results first.
pub fn ndcg(relevance: &[bool], total_relevant: usize) -> f64 {
    if total_relevant == 0 {
        return 0.0;
    }
    let gain = |i: usize| 1.0 / ((i + 2) as f64).log2();

    let dcg: f64 = relevance
        .iter()
        .enumerate()
        .filter(|(_, relevant)| **relevant)
        .map(|(i, _)| gain(i))
        .sum();
    let idcg: f64 = (0..total_relevant.min(relevance.len())).map(gain).sum();

    if idcg > 0.0 { dcg / idcg } else { 0.0 }
}

/// Precision, recall, F1, reciprocal rank and NDCG for one query.
///
/// `total_relevant` is the number of relevant keywords; recall is capped
/// at 1 since several results can match the same keyword.
pub fn query_metrics(relevance: &[bool], total_relevant: usize) -> QueryRetrievalMetrics {
    let true_positives = relevance.iter().filter(|r| **r).count() as f64;

    let precision = if relevance.is_empty() {
        0.0
    } else {
        true_positives / relevance.len() as f64
    };
    let recall = if total_relevant == 0 {
        0.0
    } else {
        (true_positives / total_relevant as f64).min(1.0)
    };
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    let mean_reciprocal_rank = relevance
        .iter()
        .position(|r| *r)
        .map_or(0.0, |rank| 1.0 / (rank + 1) as f64);

    QueryRetrievalMetrics {
        precision,
        recall,
        f1_score,
        mean_reciprocal_rank,
        ndcg: ndcg(relevance, total_relevant),
    }
}

/// How focused a result set is: 1 for a single category, lower as more
/// categories appear.
pub fn context_coherence(results: &[SearchResult]) -> f64 {
    if results.len() < 2 {
        return 1.0;
    }
    let categories: HashSet<_> = results.iter().map(|r| r.category).collect();
    (1.0 - (categories.len() - 1) as f64 / results.len() as f64).max(0.0)
}

/// Histogram label of a score: its 0.1 bucket, floored.
pub fn score_bucket(score: f64) -> String {
    format!("{:.1}", (score * 10.0).floor() / 10.0)
}
