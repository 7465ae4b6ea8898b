//! BoxLlmProvider -- type-erased LlmProvider for the optional reply backend.
//!
//! `LlmProvider` uses `async fn` in traits and is not object-safe, so
//! `LlmProviderDyn` re-exposes it with boxed futures and a blanket impl.

use std::future::Future;
use std::pin::Pin;

use medirag_types::llm::{CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities};

use super::provider::LlmProvider;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, LlmError>> + Send + 'a>>;

pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &ProviderCapabilities;

    fn complete_boxed<'a>(&'a self, request: &'a CompletionRequest) -> BoxFuture<'a, CompletionResponse>;

    fn count_tokens_boxed<'a>(&'a self, request: &'a CompletionRequest) -> BoxFuture<'a, u32>;
}

impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        LlmProvider::capabilities(self)
    }

    fn complete_boxed<'a>(&'a self, request: &'a CompletionRequest) -> BoxFuture<'a, CompletionResponse> {
        Box::pin(self.complete(request))
    }

    fn count_tokens_boxed<'a>(&'a self, request: &'a CompletionRequest) -> BoxFuture<'a, u32> {
        Box::pin(self.count_tokens(request))
    }
}

pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn>,
}

impl BoxLlmProvider {
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn capabilities(&self) -> &ProviderCapabilities {
        self.inner.capabilities()
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.inner.complete_boxed(request).await
    }

    /// Estimated input tokens of `request`, or `ContextLengthExceeded` when
    /// they exceed the model's context window.
    pub async fn check_context(&self, request: &CompletionRequest) -> Result<u32, LlmError> {
        let requested = self.inner.count_tokens_boxed(request).await?;
        let max = self.capabilities().max_context_tokens;
        if requested > max {
            return Err(LlmError::ContextLengthExceeded { max, requested });
        }
        Ok(requested)
    }
}
