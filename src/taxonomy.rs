//! Static feature taxonomy: label -> trigger phrases
//!
//! The taxonomy is the single registry both matchers search. It is built once
//! at process start and never mutated, so it is safe for unlimited concurrent
//! readers behind an `Arc` with no lock discipline.
//!
//! Iteration order matters: the lexical matcher's first-found rule and the
//! semantic matcher's tie-break both resolve in registry order, so `labels()`
//! and `entries()` must be stable and deterministic across runs.

use crate::error::{Result, WayfinderError};
use crate::types::FeatureLabel;
use std::collections::HashSet;

/// Immutable registry mapping each feature to its trigger phrases
#[derive(Debug, Clone)]
pub struct FeatureTaxonomy {
    /// (label, phrases) in registry order
    entries: Vec<(FeatureLabel, Vec<String>)>,
}

/// Built-in trigger phrases, derived from the perception features the
/// backend actually serves
fn default_phrases(label: FeatureLabel) -> Vec<&'static str> {
    match label {
        FeatureLabel::News => vec!["news", "article", "headline"],
        FeatureLabel::Text => vec!["text", "document", "page"],
        FeatureLabel::Currency => vec!["currency", "money", "banknote", "cash"],
        FeatureLabel::Object => vec!["describe", "object", "scene", "around me"],
        FeatureLabel::Face => vec!["face", "who is this", "person"],
        FeatureLabel::Product => vec!["product", "barcode", "scan"],
        FeatureLabel::Distance => vec!["distance", "how far", "obstacle"],
        FeatureLabel::Music => vec!["music", "song", "tune"],
        FeatureLabel::Chat => vec!["chat", "question", "assistant"],
    }
}

impl FeatureTaxonomy {
    /// Build the taxonomy with built-in trigger phrases for every label
    pub fn with_defaults() -> Self {
        let entries = FeatureLabel::ALL
            .iter()
            .map(|&label| {
                let phrases = default_phrases(label)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                (label, phrases)
            })
            .collect();

        // Defaults are known-valid; validation guards config overrides.
        Self { entries }
    }

    /// Build the taxonomy from explicit entries, in the given order
    ///
    /// Validates that every label has at least one phrase, no phrase is
    /// empty, and no phrase (case-insensitively) belongs to two labels.
    pub fn from_entries(entries: Vec<(FeatureLabel, Vec<String>)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(WayfinderError::Validation(
                "Taxonomy must contain at least one feature".to_string(),
            ));
        }

        let mut seen_labels = HashSet::new();
        let mut seen_phrases: HashSet<String> = HashSet::new();

        for (label, phrases) in &entries {
            if !seen_labels.insert(*label) {
                return Err(WayfinderError::Validation(format!(
                    "Duplicate taxonomy entry for feature '{}'",
                    label
                )));
            }

            if phrases.is_empty() {
                return Err(WayfinderError::Validation(format!(
                    "Feature '{}' has no trigger phrases",
                    label
                )));
            }

            for phrase in phrases {
                let folded = phrase.trim().to_lowercase();
                if folded.is_empty() {
                    return Err(WayfinderError::Validation(format!(
                        "Feature '{}' has an empty trigger phrase",
                        label
                    )));
                }
                if !seen_phrases.insert(folded) {
                    return Err(WayfinderError::Validation(format!(
                        "Trigger phrase '{}' is mapped to more than one feature",
                        phrase
                    )));
                }
            }
        }

        Ok(Self { entries })
    }

    /// All labels in registry order
    pub fn labels(&self) -> impl Iterator<Item = FeatureLabel> + '_ {
        self.entries.iter().map(|(label, _)| *label)
    }

    /// Trigger phrases for one label, in registry order
    ///
    /// Empty slice for a label the taxonomy was built without.
    pub fn phrases_of(&self, label: FeatureLabel) -> &[String] {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, phrases)| phrases.as_slice())
            .unwrap_or(&[])
    }

    /// Flattened (label, phrase) pairs in registry order
    pub fn entries(&self) -> impl Iterator<Item = (FeatureLabel, &str)> + '_ {
        self.entries
            .iter()
            .flat_map(|(label, phrases)| phrases.iter().map(|p| (*label, p.as_str())))
    }

    /// Whether the taxonomy knows this label
    pub fn contains(&self, label: FeatureLabel) -> bool {
        self.entries.iter().any(|(l, _)| *l == label)
    }

    /// Number of features
    pub fn feature_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of trigger phrases across all features
    pub fn phrase_count(&self) -> usize {
        self.entries.iter().map(|(_, phrases)| phrases.len()).sum()
    }
}

impl Default for FeatureTaxonomy {
    fn default() -> Self {
        Self::with_defaults()
    }
}
