//! Embedding generation for the semantic matcher
//!
//! The router treats embedding as a black-box, deterministic function
//! text -> fixed-length vector. The trait seam exists so tests can supply
//! deterministic stub vectors without loading a model.

pub mod local;

pub use local::LocalEmbeddingService;

use crate::error::Result;
use async_trait::async_trait;

/// Embedding service trait defining required operations
///
/// Implementations must be deterministic: identical input text always yields
/// an identical vector, which is what makes `IntentRouter::decide` a pure
/// function of its arguments.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts (batched)
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embedding dimensionality
    fn dimensions(&self) -> usize;

    /// Model name
    fn model_name(&self) -> &str;
}

/// Calculate cosine similarity between two vectors
///
/// Returns 0.0 for mismatched lengths or zero-magnitude input rather than
/// NaN, so a degenerate vector can never win the semantic argmax.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        let x = vec![1.0, 0.0, 0.0];
        let y = vec![0.0, 1.0, 0.0];

        assert!((cosine_similarity(&x, &x) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&x, &y).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![-1.0, -2.0, -3.0];

        assert!((cosine_similarity(&x, &y) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_length_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
