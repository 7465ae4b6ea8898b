//! Retrieval evaluation types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::knowledge::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A query with the results it is expected to surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestQuery {
    pub query: String,
    pub expected_category: Category,
    pub expected_keywords: Vec<String>,
    pub difficulty: Difficulty,
}

/// Keywords that mark a result as relevant or irrelevant for a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruth {
    pub topic: String,
    pub relevant: Vec<String>,
    pub irrelevant: Vec<String>,
}

/// Mean, spread, and bounds of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatSummary {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// [`StatSummary`] plus order statistics, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Per-query retrieval metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryRetrievalMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub mean_reciprocal_rank: f64,
    pub ndcg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalAccuracy {
    pub precision: Option<StatSummary>,
    pub recall: Option<StatSummary>,
    pub f1_score: Option<StatSummary>,
    pub mean_reciprocal_rank: Option<StatSummary>,
    pub ndcg: Option<StatSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyReport {
    pub response_times: Option<LatencySummary>,
    pub search_times: Option<LatencySummary>,
    pub embedding_times: Option<LatencySummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyMetrics {
    pub mean_score: f64,
    pub std_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub score_range: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCount {
    pub threshold: f64,
    pub above: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceScoring {
    pub relevance_scores: Vec<f64>,
    /// Bucket label (e.g. `"0.7"`) to count.
    pub score_distribution: BTreeMap<String, usize>,
    pub threshold_analysis: Vec<ThresholdCount>,
    pub consistency_metrics: Option<ConsistencyMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextAwareness {
    pub context_utilization: Option<StatSummary>,
    pub response_relevance: Option<StatSummary>,
    pub context_coherence: Option<StatSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEffectiveness {
    pub memory_utilization: f64,
    pub session_memory_ratio: f64,
    pub long_term_memory_ratio: f64,
    pub active_sessions: usize,
    pub user_profiles: usize,
    pub memory_retention_days: i64,
}

/// Result of one comprehensive evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub retrieval_accuracy: RetrievalAccuracy,
    pub latency: LatencyReport,
    pub relevance_scoring: RelevanceScoring,
    pub context_awareness: ContextAwareness,
    pub memory_effectiveness: Option<MemoryEffectiveness>,
    pub overall_score: f64,
}

/// A report bundled with the test data it was produced from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationExport {
    pub evaluation_results: EvaluationReport,
    pub test_queries: Vec<TestQuery>,
    pub ground_truth: Vec<GroundTruth>,
    pub export_timestamp: DateTime<Utc>,
}
