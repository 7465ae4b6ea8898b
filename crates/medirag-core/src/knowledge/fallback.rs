//! Primary embedder with a hashing fallback.
//!
//! If the primary model fails (during lazy initialization or inference),
//! the failure is logged and every later call goes to the hashing embedder.
//! The switch is permanent for the process so query and chunk vectors come
//! from the same space; `KnowledgeService::reindex` re-embeds stored chunks.

use std::sync::atomic::{AtomicBool, Ordering};

use medirag_types::error::EmbeddingError;

use super::box_embedder::BoxEmbedder;
use super::embedder::Embedder;
use super::hashing::HashingEmbedder;

pub struct FallbackEmbedder {
    primary: Option<BoxEmbedder>,
    fallback: HashingEmbedder,
    degraded: AtomicBool,
}

impl FallbackEmbedder {
    pub fn new(primary: BoxEmbedder) -> Self {
        let fallback = HashingEmbedder::with_dimension(primary.dimension());
        Self {
            primary: Some(primary),
            fallback,
            degraded: AtomicBool::new(false),
        }
    }

    /// Hashing only; used when no model is configured.
    pub fn hashing_only() -> Self {
        Self {
            primary: None,
            fallback: HashingEmbedder::new(),
            degraded: AtomicBool::new(true),
        }
    }

    fn active_primary(&self) -> Option<&BoxEmbedder> {
        if self.degraded.load(Ordering::Acquire) {
            None
        } else {
            self.primary.as_ref()
        }
    }

    fn degrade(&self, reason: &EmbeddingError) {
        if !self.degraded.swap(true, Ordering::AcqRel) {
            tracing::warn!(
                error = %reason,
                fallback = self.fallback.model_name(),
                "Embedding model failed, switching to hashing embedder"
            );
        }
    }
}

impl Embedder for FallbackEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if let Some(primary) = self.active_primary() {
            match primary.embed(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) => self.degrade(&e),
            }
        }
        self.fallback.embed(texts).await
    }

    fn model_name(&self) -> &str {
        match self.active_primary() {
            Some(primary) => primary.model_name(),
            None => self.fallback.model_name(),
        }
    }

    fn dimension(&self) -> usize {
        self.fallback.dimension()
    }

    fn is_model_backed(&self) -> bool {
        self.active_primary()
            .map(|p| p.is_model_backed())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    use super::*;
    use crate::knowledge::embedder::EMBEDDING_DIMENSION;

    struct FailingEmbedder {
        calls: Arc<AtomicUsize>,
    }

    impl Embedder for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(EmbeddingError::Init("model download failed".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }

        fn dimension(&self) -> usize {
            EMBEDDING_DIMENSION
        }

        fn is_model_backed(&self) -> bool {
            true
        }
    }

    struct ConstantEmbedder {
        dimension: usize,
    }

    impl Embedder for ConstantEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|_| vec![0.5; self.dimension]).collect())
        }

        fn model_name(&self) -> &str {
            "constant"
        }

        fn dimension(&self) -> usize {
            EMBEDDING_DIMENSION
        }

        fn is_model_backed(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_primary_used_when_healthy() {
        let embedder = FallbackEmbedder::new(BoxEmbedder::new(ConstantEmbedder {
            dimension: EMBEDDING_DIMENSION,
        }));
        let vectors = embedder.embed(&["anything".to_string()]).await.unwrap();
        assert_eq!(vectors[0][0], 0.5);
        assert!(embedder.is_model_backed());
        assert_eq!(embedder.model_name(), "constant");
    }

    #[tokio::test]
    async fn test_failure_switches_to_hashing_permanently() {
        let calls = Arc::new(AtomicUsize::new(0));
        let embedder = FallbackEmbedder::new(BoxEmbedder::new(FailingEmbedder {
            calls: calls.clone(),
        }));

        let texts = vec!["chest pain".to_string()];
        let first = embedder.embed(&texts).await.unwrap();
        let second = embedder.embed(&texts).await.unwrap();

        assert_eq!(first, HashingEmbedder::new().embed(&texts).await.unwrap());
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!embedder.is_model_backed());
        assert_eq!(embedder.model_name(), "hashing-bow");
    }

    #[tokio::test]
    async fn test_wrong_dimension_triggers_fallback() {
        let embedder = FallbackEmbedder::new(BoxEmbedder::new(ConstantEmbedder { dimension: 8 }));
        let vectors = embedder.embed(&["sleep".to_string()]).await.unwrap();
        assert_eq!(vectors[0].len(), EMBEDDING_DIMENSION);
        assert!(!embedder.is_model_backed());
    }

    #[tokio::test]
    async fn test_hashing_only() {
        let embedder = FallbackEmbedder::hashing_only();
        assert!(!embedder.is_model_backed());
        let vectors = embedder.embed(&["sleep hygiene".to_string()]).await.unwrap();
        assert_eq!(vectors[0].len(), EMBEDDING_DIMENSION);
    }
}
