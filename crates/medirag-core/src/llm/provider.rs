//! LlmProvider trait definition.
//!
//! The chat-completion backend used to phrase replies. Implementations live
//! in medirag-infra (e.g., `OpenAiCompatibleProvider`).

use medirag_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

/// Trait for LLM provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Estimate the input tokens of a request without sending it.
    fn count_tokens(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<u32, LlmError>> + Send;
}

/// Rough token estimate of a request: four chars per token.
pub fn estimate_tokens(request: &CompletionRequest) -> u32 {
    let chars = request.system.as_deref().map_or(0, |s| s.chars().count())
        + request
            .messages
            .iter()
            .map(|m| m.content.chars().count())
            .sum::<usize>();
    u32::try_from(chars.div_ceil(4)).unwrap_or(u32::MAX)
}
