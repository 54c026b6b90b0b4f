//! Intent decision engine
//!
//! Orchestrates the matching stages into one request/response contract:
//! action check, then lexical matching, then the semantic fallback. Each
//! `decide` call is stateless and independent; the taxonomy and phrase
//! index are shared read-only, so calls may run concurrently without locks.

use crate::embeddings::EmbeddingService;
use crate::error::{Result, WayfinderError};
use crate::matcher::{LexicalMatcher, SemanticMatcher};
use crate::taxonomy::FeatureTaxonomy;
use crate::types::{FeatureLabel, Intent, IntentDecision};
use std::sync::Arc;
use tracing::debug;

/// Exact-match control words checked before any feature matching
const ACTION_WORDS: [&str; 2] = ["stop", "play"];

/// Confidence assigned per decision path
const ACTION_CONFIDENCE: f32 = 0.99;
const SELF_FEATURE_CONFIDENCE: f32 = 0.9;
const NAVIGATE_CONFIDENCE: f32 = 1.0;

/// The voice command intent router
///
/// Built once at startup from the immutable taxonomy and an embedding
/// service; trigger-phrase embeddings are precomputed during construction so
/// request paths embed only the transcript.
pub struct IntentRouter {
    taxonomy: Arc<FeatureTaxonomy>,
    lexical: LexicalMatcher,
    semantic: SemanticMatcher,
}

impl IntentRouter {
    /// Create the router, eagerly building the semantic phrase index
    pub async fn new(
        taxonomy: Arc<FeatureTaxonomy>,
        embeddings: Arc<dyn EmbeddingService>,
    ) -> Result<Self> {
        let lexical = LexicalMatcher::new(Arc::clone(&taxonomy));
        let semantic = SemanticMatcher::new(&taxonomy, embeddings).await?;

        Ok(Self {
            taxonomy,
            lexical,
            semantic,
        })
    }

    /// Shared taxonomy, for callers that surface available commands
    pub fn taxonomy(&self) -> &FeatureTaxonomy {
        &self.taxonomy
    }

    /// Turn a transcript plus optional active-feature hint into one decision
    ///
    /// Stages run strictly in order and stop at the first decisive result:
    /// 1. exact action word ("stop"/"play") with an active feature
    /// 2. lexical substring match over all labels
    /// 3. semantic embedding fallback
    ///
    /// Always returns one of Navigate/Query/Read/Action; the router never
    /// declines to act. Ambiguous input resolves to the best-scoring guess
    /// and callers decide whether to discard low-confidence results.
    ///
    /// An empty (post-trim) transcript fails with
    /// [`WayfinderError::EmptyInput`] before any matching.
    pub async fn decide(
        &self,
        transcript: &str,
        current_feature: Option<FeatureLabel>,
    ) -> Result<IntentDecision> {
        let trimmed = transcript.trim();
        if trimmed.is_empty() {
            return Err(WayfinderError::EmptyInput);
        }

        // A hint for a feature this taxonomy was built without is treated
        // as absent rather than an error; wire-level validation already
        // rejected identifiers outside the closed enum.
        let current_feature = current_feature.filter(|c| self.taxonomy.contains(*c));

        // Stage 1: control actions short-circuit everything else.
        if let Some(current) = current_feature {
            let folded = trimmed.to_lowercase();
            if ACTION_WORDS.contains(&folded.as_str()) {
                debug!("Action word '{}' on active feature {}", folded, current);
                return Ok(IntentDecision {
                    command: Some(current),
                    intent: Intent::Action,
                    confidence: ACTION_CONFIDENCE,
                    query: Some(transcript.to_string()),
                });
            }
        }

        // Stage 2: lexical matching over all labels.
        if let Some(hit) = self.lexical.find(transcript) {
            if current_feature == Some(hit.label) {
                // Querying the active feature; "read" selects read-aloud.
                let intent = if transcript.to_lowercase().contains("read") {
                    Intent::Read
                } else {
                    Intent::Query
                };
                debug!(
                    "Lexical self-feature hit '{}' on {} -> {}",
                    hit.phrase, hit.label, intent
                );
                return Ok(IntentDecision {
                    command: Some(hit.label),
                    intent,
                    confidence: SELF_FEATURE_CONFIDENCE,
                    query: Some(transcript.to_string()),
                });
            }

            debug!("Lexical hit '{}' -> navigate to {}", hit.phrase, hit.label);
            return Ok(IntentDecision {
                command: Some(hit.label),
                intent: Intent::Navigate,
                confidence: NAVIGATE_CONFIDENCE,
                query: None,
            });
        }

        // Stage 3: semantic fallback. Navigation decisions never carry a
        // query payload, with or without an active feature.
        let hit = self.semantic.find(transcript).await?;
        debug!(
            "Semantic fallback: '{}' -> {} (score {})",
            hit.phrase, hit.label, hit.score
        );

        Ok(IntentDecision {
            command: Some(hit.label),
            intent: Intent::Navigate,
            confidence: hit.score,
            query: None,
        })
    }
}
