//! Semantic fallback matcher
//!
//! Scores the transcript against every trigger phrase by cosine similarity
//! of their embeddings and returns the global best. Phrase embeddings are
//! computed once at startup; only the transcript is embedded per request.

use crate::embeddings::{cosine_similarity, EmbeddingService};
use crate::error::{Result, WayfinderError};
use crate::taxonomy::FeatureTaxonomy;
use crate::types::FeatureLabel;
use std::sync::Arc;
use tracing::debug;

/// A semantic hit: owning label, winning phrase, and its rounded score
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticMatch {
    pub label: FeatureLabel,
    pub phrase: String,
    /// Cosine similarity rounded to three decimals; a similarity score in
    /// [-1.0, 1.0], not a calibrated probability
    pub score: f32,
}

/// One precomputed phrase embedding
struct PhraseEntry {
    label: FeatureLabel,
    phrase: String,
    vector: Vec<f32>,
}

/// Embedding-similarity matcher over a precomputed phrase index
pub struct SemanticMatcher {
    index: Vec<PhraseEntry>,
    embeddings: Arc<dyn EmbeddingService>,
}

impl SemanticMatcher {
    /// Build the phrase index by embedding every trigger phrase once
    pub async fn new(
        taxonomy: &FeatureTaxonomy,
        embeddings: Arc<dyn EmbeddingService>,
    ) -> Result<Self> {
        let pairs: Vec<(FeatureLabel, &str)> = taxonomy.entries().collect();
        if pairs.is_empty() {
            return Err(WayfinderError::Validation(
                "Cannot build a semantic index over an empty taxonomy".to_string(),
            ));
        }

        let texts: Vec<&str> = pairs.iter().map(|(_, phrase)| *phrase).collect();
        let vectors = embeddings.embed_batch(&texts).await?;

        if vectors.len() != pairs.len() {
            return Err(WayfinderError::Embedding(format!(
                "Phrase index mismatch: {} phrases, {} embeddings",
                pairs.len(),
                vectors.len()
            )));
        }

        let index = pairs
            .into_iter()
            .zip(vectors)
            .map(|((label, phrase), vector)| PhraseEntry {
                label,
                phrase: phrase.to_string(),
                vector,
            })
            .collect::<Vec<_>>();

        debug!(
            "Semantic phrase index built: {} phrases, model '{}'",
            index.len(),
            embeddings.model_name()
        );

        Ok(Self { index, embeddings })
    }

    /// Find the best-scoring phrase for the transcript
    ///
    /// One global argmax over the flattened phrase list, not a per-label
    /// maximum. Exact score ties resolve to the first phrase in registry
    /// order (strictly-greater comparison). Always produces a match; an
    /// embedding failure propagates as an error rather than a synthesized
    /// fallback decision.
    pub async fn find(&self, transcript: &str) -> Result<SemanticMatch> {
        let query = self.embeddings.embed(transcript).await?;

        let mut best: Option<(&PhraseEntry, f32)> = None;
        for entry in &self.index {
            let score = cosine_similarity(&query, &entry.vector);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((entry, score)),
            }
        }

        // Index is non-empty by construction.
        let (entry, score) = best.ok_or_else(|| {
            WayfinderError::Embedding("Semantic index is empty".to_string())
        })?;

        Ok(SemanticMatch {
            label: entry.label,
            phrase: entry.phrase.clone(),
            score: round3(score),
        })
    }

    /// Number of indexed phrases
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Round to three decimal places
fn round3(score: f32) -> f32 {
    (score * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Deterministic stub: maps known texts to fixed 3-d vectors
    struct StubEmbeddings;

    fn stub_vector(text: &str) -> Vec<f32> {
        match text {
            "news" => vec![1.0, 0.0, 0.0],
            "headline" => vec![1.0, 0.0, 0.0], // exact tie with "news"
            "money" => vec![0.0, 1.0, 0.0],
            "tell me what happened today" => vec![0.9, 0.1, 0.0],
            "how much is this worth" => vec![0.1, 0.9, 0.0],
            _ => vec![0.0, 0.0, 1.0],
        }
    }

    #[async_trait]
    impl EmbeddingService for StubEmbeddings {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(stub_vector(text))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| stub_vector(t)).collect())
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    fn test_taxonomy() -> FeatureTaxonomy {
        FeatureTaxonomy::from_entries(vec![
            (
                FeatureLabel::News,
                vec!["news".to_string(), "headline".to_string()],
            ),
            (FeatureLabel::Currency, vec!["money".to_string()]),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_global_argmax_across_labels() {
        let matcher = SemanticMatcher::new(&test_taxonomy(), Arc::new(StubEmbeddings))
            .await
            .unwrap();

        let hit = matcher.find("how much is this worth").await.unwrap();
        assert_eq!(hit.label, FeatureLabel::Currency);
        assert_eq!(hit.phrase, "money");

        let hit = matcher.find("tell me what happened today").await.unwrap();
        assert_eq!(hit.label, FeatureLabel::News);
    }

    #[tokio::test]
    async fn test_exact_tie_goes_to_registry_order() {
        let matcher = SemanticMatcher::new(&test_taxonomy(), Arc::new(StubEmbeddings))
            .await
            .unwrap();

        // "news" and "headline" have identical stub vectors; the query
        // vector is equidistant, so the first phrase in registry order wins.
        let hit = matcher.find("tell me what happened today").await.unwrap();
        assert_eq!(hit.phrase, "news");
    }

    #[tokio::test]
    async fn test_score_is_rounded_to_three_decimals() {
        let matcher = SemanticMatcher::new(&test_taxonomy(), Arc::new(StubEmbeddings))
            .await
            .unwrap();

        let hit = matcher.find("tell me what happened today").await.unwrap();
        // cos([0.9, 0.1, 0], [1, 0, 0]) = 0.9 / |(0.9, 0.1)| = 0.99388...
        assert!((hit.score - 0.994).abs() < 1e-6);
        assert!(hit.score >= -1.0 && hit.score <= 1.0);
    }

    #[tokio::test]
    async fn test_index_counts_all_phrases() {
        let matcher = SemanticMatcher::new(&test_taxonomy(), Arc::new(StubEmbeddings))
            .await
            .unwrap();
        assert_eq!(matcher.len(), 3);
        assert!(!matcher.is_empty());
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.4204), 0.42);
        assert_eq!(round3(0.9999), 1.0);
        assert_eq!(round3(-0.12345), -0.123);
    }
}
