//! Connection settings for an OpenAI-compatible chat-completions endpoint.
//!
//! The same provider talks to OpenAI, OpenRouter, a local Ollama server or
//! any other service speaking the chat-completions protocol; only the base
//! URL and model change.

use secrecy::SecretString;

use medirag_types::config::LlmConfig;
use medirag_types::llm::ProviderCapabilities;

/// Default endpoint when `llm.base_url` is not set.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "ollama").
    pub provider_name: String,
    pub base_url: String,
    pub api_key: SecretString,
    pub model: String,
    pub capabilities: ProviderCapabilities,
}

impl OpenAiCompatConfig {
    /// Build the provider settings from the `[llm]` config section.
    pub fn from_llm_config(config: &LlmConfig, api_key: SecretString) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        Self {
            provider_name: provider_name_for(&base_url).to_string(),
            base_url,
            api_key,
            model: config.model.clone(),
            capabilities: ProviderCapabilities {
                max_context_tokens: 128_000,
                max_output_tokens: 16_384,
            },
        }
    }
}

/// Guess a display name from the endpoint host.
pub fn provider_name_for(base_url: &str) -> &'static str {
    let url = base_url.to_ascii_lowercase();
    if url.contains("api.openai.com") {
        "openai"
    } else if url.contains("openrouter.ai") {
        "openrouter"
    } else if url.contains(":11434") || url.contains("ollama") {
        "ollama"
    } else if url.contains("mistral.ai") {
        "mistral"
    } else {
        "openai_compatible"
    }
}
