//! Reply pipeline: retrieval, style selection, generation, persistence.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{Instrument, debug, info, info_span, warn};

use medirag_types::chat::{
    ChatReply, GeneratedBy, LatencyStats, ResponseMetrics, ResponseMetricsSummary, ResponseStyle,
    RetrievalAccuracyStats, SystemConfiguration, SystemExport, SystemPerformance, SystemStats,
    UtilizationStats,
};
use medirag_types::config::{LlmConfig, RagConfig};
use medirag_types::error::RagError;
use medirag_types::knowledge::SearchResult;
use medirag_types::llm::{LlmError, StopReason};
use medirag_types::memory::MemoryEntry;

use crate::evaluation::stats::{max, mean, min, round3, std_dev};
use crate::knowledge::service::KnowledgeService;
use crate::llm::box_provider::BoxLlmProvider;
use crate::memory::manager::{ALL_USERS, MemoryManager};
use crate::repository::document::DocumentRepository;
use crate::repository::memory::MemoryRepository;
use crate::repository::metrics::MetricsRepository;
use crate::text::contains_any;

use super::context::{GenerationContext, merge_results, query_categories};
use super::prompt::build_request;
use super::style::{URGENT_TERMS, determine_response_style};
use super::templates;
use super::topics::detect_small_talk;

/// Reply returned when retrieval fails.
pub const APOLOGY: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again.";

const DIRECT_SEARCH_LIMIT: usize = 3;
const CATEGORY_SEARCH_LIMIT: usize = 2;
const SESSION_MEMORY_LIMIT: usize = 5;
const LONG_TERM_MEMORY_LIMIT: usize = 3;
/// Knowledge relevance above which a reply counts as well grounded.
const HIGH_RELEVANCE: f64 = 0.7;

/// A language model plus the settings used to call it.
pub struct LlmBackend {
    provider: BoxLlmProvider,
    config: LlmConfig,
}

impl LlmBackend {
    pub fn new(provider: BoxLlmProvider, config: LlmConfig) -> Self {
        Self { provider, config }
    }

    pub fn name(&self) -> &str {
        self.provider.name()
    }
}

/// Orchestrates knowledge retrieval, memory and generation for each turn.
pub struct RagService<D, R, M>
where
    D: DocumentRepository,
    R: MemoryRepository,
    M: MetricsRepository,
{
    knowledge: Arc<KnowledgeService<D>>,
    memory: Arc<MemoryManager<R>>,
    metrics: M,
    llm: Option<LlmBackend>,
    config: RagConfig,
}

impl<D, R, M> RagService<D, R, M>
where
    D: DocumentRepository,
    R: MemoryRepository,
    M: MetricsRepository,
{
    pub fn new(
        knowledge: Arc<KnowledgeService<D>>,
        memory: Arc<MemoryManager<R>>,
        metrics: M,
        llm: Option<LlmBackend>,
        config: RagConfig,
    ) -> Self {
        Self {
            knowledge,
            memory,
            metrics,
            llm,
            config,
        }
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeService<D>> {
        &self.knowledge
    }

    pub fn memory(&self) -> &Arc<MemoryManager<R>> {
        &self.memory
    }

    /// Name of the configured language model provider, if any.
    pub fn llm_provider(&self) -> Option<&str> {
        self.llm.as_ref().map(LlmBackend::name)
    }

    /// Answer one user message.
    ///
    /// Never fails: a retrieval error produces an apology reply with the
    /// `error` field set.
    pub async fn generate_response(
        &self,
        user_message: &str,
        session_id: &str,
        user_id: Option<&str>,
    ) -> ChatReply {
        let started = Instant::now();
        let span = info_span!(
            "rag.generate",
            rag.session_id = %session_id,
            rag.user_id = user_id.unwrap_or_default(),
            rag.knowledge_hits = tracing::field::Empty,
            rag.style = tracing::field::Empty,
        );

        match self
            .respond(user_message, session_id, user_id, started)
            .instrument(span)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Failed to generate response");
                ChatReply {
                    response: APOLOGY.to_string(),
                    session_id: session_id.to_string(),
                    knowledge_sources: Vec::new(),
                    memory_used: false,
                    user_profile_used: false,
                    response_style: ResponseStyle::Professional,
                    generated_by: GeneratedBy::Error,
                    response_time_secs: started.elapsed().as_secs_f64(),
                    metrics: None,
                    error: Some(e.to_string()),
                    timestamp: Utc::now(),
                }
            }
        }
    }

    async fn respond(
        &self,
        user_message: &str,
        session_id: &str,
        user_id: Option<&str>,
        started: Instant,
    ) -> Result<ChatReply, RagError> {
        let knowledge = self.retrieve_knowledge(user_message).await?;
        let memories = self.retrieve_memories(user_message, session_id, user_id).await?;
        let profile = match user_id {
            Some(user_id) => Some(self.memory.get_user_profile(user_id).await?),
            None => None,
        };

        let ctx = GenerationContext::new(user_message, user_id, &knowledge, &memories);
        let style = determine_response_style(profile.as_ref(), user_message);

        let span = tracing::Span::current();
        span.record("rag.knowledge_hits", knowledge.len());
        span.record("rag.style", tracing::field::display(style));

        let (response, generated_by) = self.generate(&ctx, style, session_id).await;
        let response_time = started.elapsed().as_secs_f64();
        let knowledge_sources: Vec<String> = knowledge.iter().map(|r| r.title.clone()).collect();

        self.store_turn(
            session_id,
            user_id,
            user_message,
            &response,
            style,
            generated_by,
            &knowledge_sources,
        )
        .await;

        let metrics = response_metrics(
            response_time,
            user_message,
            &response,
            &knowledge,
            memories.len(),
        );
        if let Err(e) = self.metrics.record(session_id, &metrics).await {
            warn!(session_id = %session_id, error = %e, "Failed to record response metrics");
        }

        info!(
            session_id = %session_id,
            style = %style,
            generated_by = %generated_by,
            knowledge_sources = knowledge.len(),
            memories = memories.len(),
            response_time_ms = (response_time * 1000.0) as u64,
            "Generated response"
        );

        Ok(ChatReply {
            response,
            session_id: session_id.to_string(),
            knowledge_sources,
            memory_used: !memories.is_empty(),
            user_profile_used: profile.as_ref().is_some_and(|p| p.stored),
            response_style: style,
            generated_by,
            response_time_secs: response_time,
            metrics: Some(metrics),
            error: None,
            timestamp: Utc::now(),
        })
    }

    /// Direct search plus one filtered search per category named in the
    /// query, merged and cut to the best five.
    async fn retrieve_knowledge(&self, query: &str) -> Result<Vec<SearchResult>, RagError> {
        let mut results = self.knowledge.search(query, DIRECT_SEARCH_LIMIT, None).await?;
        for category in query_categories(query) {
            let filtered = self
                .knowledge
                .search(query, CATEGORY_SEARCH_LIMIT, Some(category))
                .await?;
            results.extend(filtered);
        }
        Ok(merge_results(results))
    }

    async fn retrieve_memories(
        &self,
        query: &str,
        session_id: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<MemoryEntry>, RagError> {
        let mut memories = self
            .memory
            .get_session_context(session_id, Some(SESSION_MEMORY_LIMIT))
            .await?;
        if let Some(user_id) = user_id {
            let long_term = self
                .memory
                .get_relevant_long_term_memories(query, Some(user_id), LONG_TERM_MEMORY_LIMIT)
                .await?;
            memories.extend(long_term.into_iter().map(|scored| scored.entry));
        }
        Ok(memories)
    }

    async fn generate(
        &self,
        ctx: &GenerationContext,
        style: ResponseStyle,
        session_id: &str,
    ) -> (String, GeneratedBy) {
        if !contains_any(&ctx.user_message, URGENT_TERMS)
            && let Some(kind) = detect_small_talk(&ctx.user_message)
        {
            let turn = match self.memory.get_session_history(session_id).await {
                Ok(history) => history.len(),
                Err(e) => {
                    debug!(error = %e, "Session history unavailable for small talk rotation");
                    0
                }
            };
            return (kind.reply(turn).to_string(), GeneratedBy::SmallTalk);
        }

        if let Some(llm) = &self.llm {
            match self.generate_with_llm(llm, ctx, style).await {
                Ok(text) => return (text, GeneratedBy::Llm),
                Err(e) => {
                    warn!(provider = llm.name(), error = %e, "LLM generation failed, using template");
                }
            }
        }

        (templates::render(style, ctx), GeneratedBy::Template)
    }

    async fn generate_with_llm(
        &self,
        llm: &LlmBackend,
        ctx: &GenerationContext,
        style: ResponseStyle,
    ) -> Result<String, RagError> {
        let request = build_request(style, ctx, &llm.config, self.config.max_context_length);

        llm.provider.check_context(&request).await?;

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = llm.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
        );
        let timeout = Duration::from_secs(self.config.response_timeout_secs);
        let response = tokio::time::timeout(timeout, llm.provider.complete(&request).instrument(span))
            .await
            .map_err(|_| RagError::Timeout(self.config.response_timeout_secs))??;

        if response.stop_reason == StopReason::ContentFilter || response.content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion.into());
        }
        debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "LLM completion received"
        );
        Ok(response.content)
    }

    #[allow(clippy::too_many_arguments)]
    async fn store_turn(
        &self,
        session_id: &str,
        user_id: Option<&str>,
        user_message: &str,
        response: &str,
        style: ResponseStyle,
        generated_by: GeneratedBy,
        knowledge_sources: &[String],
    ) {
        let context = serde_json::json!({
            "response_style": style,
            "generated_by": generated_by,
            "knowledge_sources": knowledge_sources,
        });
        if let Err(e) = self
            .memory
            .add_session_memory(session_id, user_message, response, context, user_id)
            .await
        {
            warn!(session_id = %session_id, error = %e, "Failed to store conversation turn");
        }
    }

    pub async fn system_stats(&self) -> Result<SystemStats, RagError> {
        let memory_stats = self.memory.stats().await?;
        let knowledge_stats = self.knowledge.stats().await?;
        let metrics = self.metrics.list().await?;

        let times: Vec<f64> = metrics.iter().map(|m| m.response_time).collect();
        let relevances: Vec<f64> = metrics.iter().map(|m| m.knowledge_relevance).collect();

        Ok(SystemStats {
            memory_stats,
            knowledge_stats,
            evaluation_metrics: ResponseMetricsSummary {
                average_response_time: round3(mean(&times)),
                average_knowledge_relevance: round3(mean(&relevances)),
                total_responses: metrics.len(),
            },
            system_configuration: SystemConfiguration {
                max_context_length: self.config.max_context_length,
                response_timeout_secs: self.config.response_timeout_secs,
                embedding_model_available: self.knowledge.is_model_backed(),
                llm_provider: self.llm_provider().map(str::to_string),
            },
            generated_at: Utc::now(),
        })
    }

    /// Performance over all recorded replies, or `None` before the first.
    pub async fn evaluate_system_performance(&self) -> Result<Option<SystemPerformance>, RagError> {
        let metrics = self.metrics.list().await?;
        if metrics.is_empty() {
            return Ok(None);
        }

        let times: Vec<f64> = metrics.iter().map(|m| m.response_time).collect();
        let relevances: Vec<f64> = metrics.iter().map(|m| m.knowledge_relevance).collect();
        let memory_stats = self.memory.stats().await?;
        let knowledge_stats = self.knowledge.stats().await?;

        Ok(Some(SystemPerformance {
            latency: LatencyStats {
                average_response_time: mean(&times),
                min_response_time: min(&times),
                max_response_time: max(&times),
                response_time_std: std_dev(&times),
            },
            retrieval_accuracy: RetrievalAccuracyStats {
                average_knowledge_relevance: mean(&relevances),
                knowledge_relevance_std: std_dev(&relevances),
                high_relevance_responses: relevances.iter().filter(|r| **r > HIGH_RELEVANCE).count(),
            },
            system_utilization: UtilizationStats {
                total_responses: metrics.len(),
                memory_utilization_rate: (memory_stats.total_memories as f64 / 1000.0).min(1.0),
                knowledge_coverage: (knowledge_stats.total_chunks as f64 / 100.0).min(1.0),
            },
        }))
    }

    pub async fn export_system_data(&self) -> Result<SystemExport, RagError> {
        Ok(SystemExport {
            system_stats: self.system_stats().await?,
            response_metrics: self.metrics.list().await?,
            memory_export: self.memory.export().await?,
            knowledge_export: self.knowledge.export().await?,
            export_timestamp: Utc::now(),
        })
    }

    /// Remove all memory, knowledge and recorded metrics.
    pub async fn clear_system_data(&self) -> Result<(), RagError> {
        self.memory.clear_user_data(ALL_USERS).await?;
        self.knowledge.clear().await?;
        let metrics = self.metrics.clear().await?;
        info!(metrics, "Cleared all system data");
        Ok(())
    }

    /// Seed the built-in dataset when the knowledge base is empty.
    ///
    /// Returns the number of documents added.
    pub async fn ensure_knowledge(&self) -> Result<usize, RagError> {
        Ok(self.knowledge.seed_healthcare_data().await?)
    }
}

fn response_metrics(
    response_time: f64,
    user_message: &str,
    response: &str,
    knowledge: &[SearchResult],
    memory_count: usize,
) -> ResponseMetrics {
    let scores: Vec<f64> = knowledge.iter().map(|r| r.relevance_score).collect();
    let knowledge_relevance = mean(&scores);
    ResponseMetrics {
        response_time,
        knowledge_relevance,
        memory_utilization: memory_count,
        response_length: response.chars().count(),
        user_message_length: user_message.chars().count(),
        knowledge_sources_count: knowledge.len(),
        average_knowledge_score: knowledge_relevance,
    }
}
