//! Deterministic lexical matcher
//!
//! Case-insensitive substring search over the taxonomy, scanning labels and
//! phrases in registry order and returning the first hit.

use crate::taxonomy::FeatureTaxonomy;
use crate::types::FeatureLabel;
use std::sync::Arc;

/// A successful lexical hit: the owning label and the phrase that matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalMatch {
    pub label: FeatureLabel,
    pub phrase: String,
}

/// Substring matcher over the shared taxonomy
#[derive(Debug, Clone)]
pub struct LexicalMatcher {
    taxonomy: Arc<FeatureTaxonomy>,
}

impl LexicalMatcher {
    pub fn new(taxonomy: Arc<FeatureTaxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Find the first trigger phrase contained in the transcript
    ///
    /// Tie-break is first-found in registry order (label order, then phrase
    /// order) rather than longest or most-specific match. Callers must not
    /// assume the most specific phrase wins; this is a documented contract
    /// decision, kept because changing it changes observable routing.
    pub fn find(&self, transcript: &str) -> Option<LexicalMatch> {
        let haystack = transcript.to_lowercase();

        for (label, phrase) in self.taxonomy.entries() {
            if haystack.contains(&phrase.to_lowercase()) {
                return Some(LexicalMatch {
                    label,
                    phrase: phrase.to_string(),
                });
            }
        }

        None
    }
}
