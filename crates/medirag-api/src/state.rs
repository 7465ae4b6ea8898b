//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST
//! API. Services are generic over repository traits; AppState pins them to
//! the SQLite implementations and picks the chunk store and embedder from
//! the configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use medirag_core::evaluation::evaluator::Evaluator;
use medirag_core::knowledge::box_embedder::BoxEmbedder;
use medirag_core::knowledge::box_store::BoxChunkStore;
use medirag_core::knowledge::fallback::FallbackEmbedder;
use medirag_core::knowledge::memory_store::InMemoryChunkStore;
use medirag_core::knowledge::service::KnowledgeService;
use medirag_core::memory::manager::MemoryManager;
use medirag_core::rag::service::{LlmBackend, RagService};
use medirag_infra::config::load_config;
use medirag_infra::llm::{create_provider, resolve_api_key};
use medirag_infra::sqlite::document::SqliteDocumentRepository;
use medirag_infra::sqlite::evaluation::SqliteEvaluationRepository;
use medirag_infra::sqlite::memory::SqliteMemoryRepository;
use medirag_infra::sqlite::metrics::SqliteMetricsRepository;
use medirag_infra::sqlite::pool::DatabasePool;
use medirag_infra::vector::chunks::LanceChunkStore;
use medirag_infra::vector::embedder::FastEmbedder;
use medirag_infra::vector::lance::LanceVectorStore;
use medirag_types::config::{AppConfig, EmbeddingModelKind, VectorBackend};

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteKnowledgeService = KnowledgeService<SqliteDocumentRepository>;

pub type ConcreteMemoryManager = MemoryManager<SqliteMemoryRepository>;

pub type ConcreteRagService =
    RagService<SqliteDocumentRepository, SqliteMemoryRepository, SqliteMetricsRepository>;

pub type ConcreteEvaluator = Evaluator<SqliteEvaluationRepository>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<ConcreteRagService>,
    pub knowledge: Arc<ConcreteKnowledgeService>,
    pub memory: Arc<ConcreteMemoryManager>,
    pub evaluator: Arc<ConcreteEvaluator>,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect storage,
    /// wire services. The LLM is enabled when its API key variable is set.
    pub async fn init(data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;
        let llm = create_provider(&config.llm, resolve_api_key(&config.llm))
            .map(|provider| LlmBackend::new(provider, config.llm.clone()));

        Self::build(data_dir, config, llm).await
    }

    /// Wire services from an already loaded configuration.
    pub async fn build(
        data_dir: PathBuf,
        config: AppConfig,
        llm: Option<LlmBackend>,
    ) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::open(&data_dir)
            .await
            .context("Failed to open database")?;

        let chunks = match config.knowledge.backend {
            VectorBackend::Lance => {
                let store = LanceVectorStore::open(&data_dir)
                    .await
                    .context("Failed to open vector store")?;
                BoxChunkStore::new(LanceChunkStore::open(&store).await?)
            }
            VectorBackend::Memory => BoxChunkStore::new(InMemoryChunkStore::new()),
        };

        let embedder = match config.knowledge.embedding_model {
            EmbeddingModelKind::Fastembed => FallbackEmbedder::new(BoxEmbedder::new(FastEmbedder::new(
                Some(data_dir.join("models")),
            ))),
            EmbeddingModelKind::Hashing => FallbackEmbedder::hashing_only(),
        };

        let knowledge = Arc::new(KnowledgeService::new(
            SqliteDocumentRepository::new(db_pool.clone()),
            chunks,
            embedder,
            &config.knowledge,
        ));
        let memory = Arc::new(MemoryManager::new(
            SqliteMemoryRepository::new(db_pool.clone()),
            &config.memory,
        ));
        let rag = RagService::new(
            knowledge.clone(),
            memory.clone(),
            SqliteMetricsRepository::new(db_pool.clone()),
            llm,
            config.rag.clone(),
        );
        let evaluator = Evaluator::new(SqliteEvaluationRepository::new(db_pool));

        tracing::debug!(
            data_dir = %data_dir.display(),
            backend = ?config.knowledge.backend,
            embedding_model = ?config.knowledge.embedding_model,
            llm = rag.llm_provider().unwrap_or("none"),
            "Application state ready"
        );

        Ok(Self {
            rag: Arc::new(rag),
            knowledge,
            memory,
            evaluator: Arc::new(evaluator),
            config: Arc::new(config),
            data_dir,
        })
    }

    /// Seed the built-in dataset into an empty knowledge base.
    pub async fn ensure_knowledge(&self) -> anyhow::Result<()> {
        let seeded = self
            .rag
            .ensure_knowledge()
            .await
            .context("Failed to seed knowledge base")?;
        if seeded > 0 {
            tracing::info!(documents = seeded, "Knowledge base was empty, seeded built-in dataset");
        }
        Ok(())
    }

    /// State over a temp dir: in-memory vectors, hashing embedder, no LLM
    /// and no relevance cut-off.
    #[cfg(test)]
    pub async fn for_tests(data_dir: &std::path::Path) -> Self {
        let mut config = AppConfig::default();
        config.knowledge.backend = VectorBackend::Memory;
        config.knowledge.embedding_model = EmbeddingModelKind::Hashing;
        config.knowledge.relevance_threshold = 0.0;
        Self::build(data_dir.to_path_buf(), config, None)
            .await
            .unwrap()
    }
}
