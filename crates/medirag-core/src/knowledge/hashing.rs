//! Bag-of-words hashing embedder.
//!
//! Used when the learned embedding model is unavailable. Words longer than
//! two chars are hashed into a fixed-size vector weighted by frequency, and
//! the vector is L2-normalised. FNV-1a keeps the mapping stable across
//! processes so stored vectors stay comparable after a restart.

use std::collections::HashMap;

use medirag_types::error::EmbeddingError;

use super::embedder::{EMBEDDING_DIMENSION, Embedder};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic term-frequency hashing embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(EMBEDDING_DIMENSION)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Embed one text synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut frequencies: HashMap<String, u32> = HashMap::new();
        for word in text.to_lowercase().split_whitespace() {
            if word.chars().count() > 2 {
                *frequencies.entry(word.to_string()).or_default() += 1;
            }
        }

        let mut vector = vec![0.0f32; self.dimension];
        for (word, freq) in &frequencies {
            let slot = (fnv1a(word) % self.dimension as u64) as usize;
            vector[slot] += *freq as f32;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn model_name(&self) -> &str {
        "hashing-bow"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_model_backed(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_vectors_are_normalised_and_sized() {
        let embedder = HashingEmbedder::new();
        let v = embedder.embed_text("High blood pressure requires regular monitoring");
        assert_eq!(v.len(), EMBEDDING_DIMENSION);
        assert!((norm(&v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_deterministic() {
        let embedder = HashingEmbedder::new();
        assert_eq!(
            embedder.embed_text("diabetes management plan"),
            embedder.embed_text("diabetes management plan")
        );
    }

    #[test]
    fn test_short_words_ignored() {
        let embedder = HashingEmbedder::new();
        let v = embedder.embed_text("a an is to");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_case_insensitive() {
        let embedder = HashingEmbedder::new();
        assert_eq!(embedder.embed_text("Fever"), embedder.embed_text("fever"));
    }

    #[test]
    fn test_fnv1a_known_value() {
        // Reference value for FNV-1a 64 of "a".
        assert_eq!(fnv1a("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let embedder = HashingEmbedder::new();
        let texts = vec!["cold symptoms".to_string(), "flu vaccine".to_string()];
        let vectors = embedder.embed(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], embedder.embed_text("cold symptoms"));
        assert_eq!(vectors[1], embedder.embed_text("flu vaccine"));
    }
}
