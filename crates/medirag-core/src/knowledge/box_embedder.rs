//! BoxEmbedder -- type-erased [`Embedder`] holding the configured primary model.
//!
//! `Embedder` uses `async fn` in traits, so `EmbedderDyn` re-exposes it with a
//! boxed future. `BoxEmbedder::embed` also checks the output shape: one
//! vector per text, each of the declared dimension.

use std::future::Future;
use std::pin::Pin;

use medirag_types::error::EmbeddingError;

use super::embedder::Embedder;

type EmbedFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send + 'a>>;

pub trait EmbedderDyn: Send + Sync {
    fn embed_dyn<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a>;

    fn model_name_dyn(&self) -> &str;

    fn dimension_dyn(&self) -> usize;

    fn is_model_backed_dyn(&self) -> bool;
}

impl<T: Embedder> EmbedderDyn for T {
    fn embed_dyn<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a> {
        Box::pin(self.embed(texts))
    }

    fn model_name_dyn(&self) -> &str {
        self.model_name()
    }

    fn dimension_dyn(&self) -> usize {
        self.dimension()
    }

    fn is_model_backed_dyn(&self) -> bool {
        self.is_model_backed()
    }
}

pub struct BoxEmbedder {
    inner: Box<dyn EmbedderDyn>,
}

impl BoxEmbedder {
    pub fn new<T: Embedder + 'static>(embedder: T) -> Self {
        Self {
            inner: Box::new(embedder),
        }
    }

    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let vectors = self.inner.embed_dyn(texts).await?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::Inference(format!(
                "{} returned {} vectors for {} texts",
                self.model_name(),
                vectors.len(),
                texts.len()
            )));
        }
        let expected = self.dimension();
        if let Some(v) = vectors.iter().find(|v| v.len() != expected) {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: v.len(),
            });
        }
        Ok(vectors)
    }

    pub fn model_name(&self) -> &str {
        self.inner.model_name_dyn()
    }

    pub fn dimension(&self) -> usize {
        self.inner.dimension_dyn()
    }

    pub fn is_model_backed(&self) -> bool {
        self.inner.is_model_backed_dyn()
    }
}
