//! FastEmbed-based local embedding generator.
//!
//! Implements the `Embedder` trait from `medirag-core` using fastembed's
//! all-MiniLM-L6-v2 model (384 dimensions) with ONNX runtime inference.
//! The model is loaded on first use; loading and inference run on the
//! blocking thread pool.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;

use medirag_core::knowledge::embedder::{EMBEDDING_DIMENSION, Embedder};
use medirag_types::error::EmbeddingError;

/// Name reported for the local model.
pub const MODEL_NAME: &str = "all-MiniLM-L6-v2";

/// Local sentence-embedding model.
pub struct FastEmbedder {
    cache_dir: Option<PathBuf>,
    model: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl FastEmbedder {
    /// Model files are cached in `cache_dir` (fastembed's default when `None`).
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            cache_dir,
            model: OnceCell::new(),
        }
    }

    async fn model(&self) -> Result<Arc<Mutex<TextEmbedding>>, EmbeddingError> {
        self.model
            .get_or_try_init(|| async {
                let cache_dir = self.cache_dir.clone();
                tracing::info!(model = MODEL_NAME, "Loading embedding model");

                let model = tokio::task::spawn_blocking(move || {
                    let mut options =
                        InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
                    if let Some(dir) = cache_dir {
                        options = options.with_cache_dir(dir);
                    }
                    TextEmbedding::try_new(options)
                })
                .await
                .map_err(|e| EmbeddingError::Init(format!("model loading task failed: {e}")))?
                .map_err(|e| EmbeddingError::Init(e.to_string()))?;

                tracing::info!(model = MODEL_NAME, dimension = EMBEDDING_DIMENSION, "Embedding model loaded");
                Ok(Arc::new(Mutex::new(model)))
            })
            .await
            .cloned()
    }
}

impl Embedder for FastEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.model().await?;
        let texts = texts.to_vec();
        let expected = texts.len();

        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| EmbeddingError::Inference("embedding model lock poisoned".to_string()))?;
            model
                .embed(texts, None)
                .map_err(|e| EmbeddingError::Inference(e.to_string()))
        })
        .await
        .map_err(|e| EmbeddingError::Inference(format!("embedding task failed: {e}")))??;

        if vectors.len() != expected {
            return Err(EmbeddingError::Inference(format!(
                "expected {expected} vectors, got {}",
                vectors.len()
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != EMBEDDING_DIMENSION) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: EMBEDDING_DIMENSION,
                actual: bad.len(),
            });
        }

        tracing::debug!(batch_size = expected, "Generated embeddings");
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }

    fn is_model_backed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_input_skips_model_load() {
        let embedder = FastEmbedder::new(None);
        assert!(embedder.embed(&[]).await.unwrap().is_empty());
        assert!(embedder.model.get().is_none());
    }

    #[test]
    fn test_reports_model_metadata() {
        let embedder = FastEmbedder::new(None);
        assert_eq!(embedder.model_name(), "all-MiniLM-L6-v2");
        assert_eq!(embedder.dimension(), 384);
        assert!(embedder.is_model_backed());
    }
}
