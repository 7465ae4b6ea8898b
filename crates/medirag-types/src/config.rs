//! Application configuration types.
//!
//! `AppConfig` represents `config.toml` in the data directory. Every field
//! has a default, so an empty file (or no file) yields a working setup.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub rag: RagConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where chunk vectors are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    #[default]
    Lance,
    Memory,
}

/// Which embedder produces vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingModelKind {
    /// Local all-MiniLM-L6-v2 with hashing fallback.
    #[default]
    Fastembed,
    /// Hashing embedder only (no model download).
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_max_chunks_per_document")]
    pub max_chunks_per_document: usize,
    #[serde(default = "default_knowledge_relevance_threshold")]
    pub relevance_threshold: f64,
    /// Nearest neighbours fetched from the vector store before re-ranking.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,
    #[serde(default)]
    pub backend: VectorBackend,
    #[serde(default)]
    pub embedding_model: EmbeddingModelKind,
}

fn default_chunk_size() -> usize {
    512
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_max_chunks_per_document() -> usize {
    10
}

fn default_knowledge_relevance_threshold() -> f64 {
    0.6
}

fn default_candidate_pool() -> usize {
    50
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_chunks_per_document: default_max_chunks_per_document(),
            relevance_threshold: default_knowledge_relevance_threshold(),
            candidate_pool: default_candidate_pool(),
            backend: VectorBackend::default(),
            embedding_model: EmbeddingModelKind::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_max_context_window")]
    pub max_context_window: usize,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    /// Minimum similarity for a long-term memory to be recalled.
    #[serde(default = "default_memory_relevance_threshold")]
    pub relevance_threshold: f64,
}

fn default_max_context_window() -> usize {
    10
}

fn default_retention_days() -> i64 {
    30
}

fn default_memory_relevance_threshold() -> f64 {
    0.7
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_context_window: default_max_context_window(),
            retention_days: default_retention_days(),
            relevance_threshold: default_memory_relevance_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Maximum chars of retrieved context passed to the LLM.
    #[serde(default = "default_max_context_length")]
    pub max_context_length: usize,
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,
}

fn default_max_context_length() -> usize {
    2000
}

fn default_response_timeout_secs() -> u64 {
    30
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            max_context_length: default_max_context_length(),
            response_timeout_secs: default_response_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Override for OpenAI-compatible endpoints (Ollama, OpenRouter, ...).
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_max_tokens() -> u32 {
    800
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.knowledge.chunk_size, 512);
        assert_eq!(config.knowledge.chunk_overlap, 50);
        assert_eq!(config.knowledge.max_chunks_per_document, 10);
        assert_eq!(config.knowledge.relevance_threshold, 0.6);
        assert_eq!(config.memory.max_context_window, 10);
        assert_eq!(config.memory.retention_days, 30);
        assert_eq!(config.rag.max_context_length, 2000);
        assert_eq!(config.rag.response_timeout_secs, 30);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.knowledge.backend, VectorBackend::Lance);
        assert_eq!(config.knowledge.embedding_model, EmbeddingModelKind::Fastembed);
    }

    #[test]
    fn test_app_config_deserialize_partial_section() {
        let toml_str = r#"
[knowledge]
backend = "memory"
embedding_model = "hashing"
relevance_threshold = 0.4

[llm]
model = "llama3.1"
base_url = "http://localhost:11434/v1"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.knowledge.backend, VectorBackend::Memory);
        assert_eq!(config.knowledge.embedding_model, EmbeddingModelKind::Hashing);
        assert_eq!(config.knowledge.relevance_threshold, 0.4);
        assert_eq!(config.knowledge.chunk_size, 512);
        assert_eq!(config.llm.model, "llama3.1");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert_eq!(config.llm.max_tokens, 800);
    }
}
