//! Runs the evaluation suites against the knowledge base and memory.
//!
//! A failed search is logged and skipped so one bad query does not void a
//! run. Reports from [`Evaluator::run_comprehensive_evaluation`] are
//! persisted and form the evaluation history.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use medirag_types::error::RepositoryError;
use medirag_types::evaluation::{
    ConsistencyMetrics, ContextAwareness, EvaluationExport, EvaluationReport, GroundTruth,
    LatencyReport, MemoryEffectiveness, QueryRetrievalMetrics, RelevanceScoring,
    RetrievalAccuracy, TestQuery, ThresholdCount,
};
use medirag_types::knowledge::SearchResult;

use crate::knowledge::service::KnowledgeService;
use crate::memory::manager::MemoryManager;
use crate::repository::document::DocumentRepository;
use crate::repository::evaluation::EvaluationRepository;
use crate::repository::memory::MemoryRepository;

use super::dataset;
use super::metrics::{context_coherence, is_relevant, query_metrics, score_bucket};
use super::stats::{latency_summary, max, mean, min, std_dev, summarize};

const RETRIEVAL_LIMIT: usize = 5;
const CONTEXT_LIMIT: usize = 3;
const THRESHOLDS: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];
/// Share of a search attributed to vector search; the rest is embedding.
const SEARCH_SHARE: f64 = 0.7;
/// Mean latency, in seconds, at which the latency score reaches zero.
const MAX_ACCEPTABLE_LATENCY: f64 = 5.0;
const MEMORY_NORMALISER: f64 = 1000.0;
/// Reports returned by [`Evaluator::history`].
const HISTORY_LIMIT: usize = 50;

pub struct Evaluator<E: EvaluationRepository> {
    repo: E,
    queries: Vec<TestQuery>,
    ground_truth: Vec<GroundTruth>,
}

impl<E: EvaluationRepository> Evaluator<E> {
    /// Evaluator over the built-in queries and ground truth.
    pub fn new(repo: E) -> Self {
        Self {
            repo,
            queries: dataset::test_queries(),
            ground_truth: dataset::ground_truth(),
        }
    }

    pub fn queries(&self) -> &[TestQuery] {
        &self.queries
    }

    async fn search_all<D: DocumentRepository>(
        &self,
        kb: &KnowledgeService<D>,
        limit: usize,
    ) -> Vec<(String, Vec<SearchResult>, f64)> {
        let mut runs = Vec::with_capacity(self.queries.len());
        for test in &self.queries {
            let started = Instant::now();
            match kb.search(&test.query, limit, None).await {
                Ok(results) => {
                    runs.push((test.query.clone(), results, started.elapsed().as_secs_f64()))
                }
                Err(e) => warn!(query = %test.query, error = %e, "Evaluation query failed"),
            }
        }
        runs
    }

    pub async fn evaluate_retrieval_accuracy<D: DocumentRepository>(
        &self,
        kb: &KnowledgeService<D>,
    ) -> RetrievalAccuracy {
        let per_query: Vec<_> = self
            .search_all(kb, RETRIEVAL_LIMIT)
            .await
            .into_iter()
            .map(|(query, results, _)| {
                let keywords = dataset::relevant_keywords(&query, &self.ground_truth);
                let relevance: Vec<bool> = results.iter().map(|r| is_relevant(r, &keywords)).collect();
                query_metrics(&relevance, keywords.len())
            })
            .collect();

        let column = |f: fn(&QueryRetrievalMetrics) -> f64| {
            summarize(&per_query.iter().map(f).collect::<Vec<_>>())
        };
        RetrievalAccuracy {
            precision: column(|m| m.precision),
            recall: column(|m| m.recall),
            f1_score: column(|m| m.f1_score),
            mean_reciprocal_rank: column(|m| m.mean_reciprocal_rank),
            ndcg: column(|m| m.ndcg),
        }
    }

    pub async fn evaluate_latency<D: DocumentRepository>(&self, kb: &KnowledgeService<D>) -> LatencyReport {
        let totals: Vec<f64> = self
            .search_all(kb, RETRIEVAL_LIMIT)
            .await
            .into_iter()
            .map(|(_, _, secs)| secs)
            .collect();
        let search: Vec<f64> = totals.iter().map(|t| t * SEARCH_SHARE).collect();
        let embedding: Vec<f64> = totals.iter().map(|t| t * (1.0 - SEARCH_SHARE)).collect();

        LatencyReport {
            response_times: latency_summary(&totals),
            search_times: latency_summary(&search),
            embedding_times: latency_summary(&embedding),
        }
    }

    pub async fn evaluate_relevance_scoring<D: DocumentRepository>(
        &self,
        kb: &KnowledgeService<D>,
    ) -> RelevanceScoring {
        let scores: Vec<f64> = self
            .search_all(kb, RETRIEVAL_LIMIT)
            .await
            .into_iter()
            .flat_map(|(_, results, _)| results.into_iter().map(|r| r.relevance_score))
            .collect();

        let mut score_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for score in &scores {
            *score_distribution.entry(score_bucket(*score)).or_default() += 1;
        }

        let (threshold_analysis, consistency_metrics) = if scores.is_empty() {
            (Vec::new(), None)
        } else {
            let thresholds = THRESHOLDS
                .iter()
                .map(|&threshold| {
                    let above = scores.iter().filter(|s| **s >= threshold).count();
                    ThresholdCount {
                        threshold,
                        above,
                        percentage: above as f64 / scores.len() as f64 * 100.0,
                    }
                })
                .collect();
            let consistency = ConsistencyMetrics {
                mean_score: mean(&scores),
                std_score: std_dev(&scores),
                min_score: min(&scores),
                max_score: max(&scores),
                score_range: max(&scores) - min(&scores),
            };
            (thresholds, Some(consistency))
        };

        RelevanceScoring {
            relevance_scores: scores,
            score_distribution,
            threshold_analysis,
            consistency_metrics,
        }
    }

    pub async fn evaluate_context_awareness<D: DocumentRepository>(
        &self,
        kb: &KnowledgeService<D>,
    ) -> ContextAwareness {
        let mut utilization = Vec::new();
        let mut relevance = Vec::new();
        let mut coherence = Vec::new();

        for (_, results, _) in self.search_all(kb, CONTEXT_LIMIT).await {
            utilization.push(results.len() as f64 / CONTEXT_LIMIT as f64);
            if !results.is_empty() {
                let scores: Vec<f64> = results.iter().map(|r| r.relevance_score).collect();
                relevance.push(mean(&scores));
            }
            coherence.push(context_coherence(&results));
        }

        ContextAwareness {
            context_utilization: summarize(&utilization),
            response_relevance: summarize(&relevance),
            context_coherence: summarize(&coherence),
        }
    }

    /// Memory usage ratios, or `None` when memory stats are unavailable.
    pub async fn evaluate_memory_effectiveness<R: MemoryRepository>(
        &self,
        memory: &MemoryManager<R>,
    ) -> Option<MemoryEffectiveness> {
        let stats = match memory.stats().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Memory stats unavailable for evaluation");
                return None;
            }
        };
        let total = stats.total_memories.max(1) as f64;
        Some(MemoryEffectiveness {
            memory_utilization: stats.total_memories as f64 / MEMORY_NORMALISER,
            session_memory_ratio: stats.session_memories as f64 / total,
            long_term_memory_ratio: stats.long_term_memories as f64 / total,
            active_sessions: stats.active_sessions,
            user_profiles: stats.user_profiles,
            memory_retention_days: stats.memory_retention_days,
        })
    }

    /// Run every suite, score the result and save it to history.
    pub async fn run_comprehensive_evaluation<D, R>(
        &self,
        kb: &KnowledgeService<D>,
        memory: &MemoryManager<R>,
    ) -> Result<EvaluationReport, RepositoryError>
    where
        D: DocumentRepository,
        R: MemoryRepository,
    {
        info!(queries = self.queries.len(), "Starting comprehensive evaluation");

        let mut report = EvaluationReport {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            retrieval_accuracy: self.evaluate_retrieval_accuracy(kb).await,
            latency: self.evaluate_latency(kb).await,
            relevance_scoring: self.evaluate_relevance_scoring(kb).await,
            context_awareness: self.evaluate_context_awareness(kb).await,
            memory_effectiveness: self.evaluate_memory_effectiveness(memory).await,
            overall_score: 0.0,
        };
        report.overall_score = overall_score(&report);

        self.repo.save(&report).await?;
        info!(
            report_id = %report.id,
            overall_score = format!("{:.3}", report.overall_score),
            "Comprehensive evaluation completed"
        );
        Ok(report)
    }

    /// Saved reports, newest first.
    pub async fn history(&self) -> Result<Vec<EvaluationReport>, RepositoryError> {
        self.repo.list(HISTORY_LIMIT).await
    }

    pub async fn clear_history(&self) -> Result<u64, RepositoryError> {
        self.repo.clear().await
    }

    /// A report bundled with the queries and ground truth it was run with.
    pub fn export(&self, report: EvaluationReport) -> EvaluationExport {
        EvaluationExport {
            evaluation_results: report,
            test_queries: self.queries.clone(),
            ground_truth: self.ground_truth.clone(),
            export_timestamp: Utc::now(),
        }
    }
}

/// Mean of the component scores that are available.
pub fn overall_score(report: &EvaluationReport) -> f64 {
    let mut scores = Vec::new();
    if let Some(f1) = &report.retrieval_accuracy.f1_score {
        scores.push(f1.mean);
    }
    if let Some(times) = &report.latency.response_times {
        scores.push((1.0 - times.mean / MAX_ACCEPTABLE_LATENCY).max(0.0));
    }
    if let Some(consistency) = &report.relevance_scoring.consistency_metrics {
        scores.push(consistency.mean_score);
    }
    if let Some(coherence) = &report.context_awareness.context_coherence {
        scores.push(coherence.mean);
    }
    if let Some(memory) = &report.memory_effectiveness {
        scores.push(memory.memory_utilization.min(1.0));
    }
    mean(&scores)
}
