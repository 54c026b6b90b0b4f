//! Core data types for the Wayfinder intent router
//!
//! This module defines the fundamental data structures used throughout
//! wayfinder: feature labels, intents, transcripts, and the router's single
//! output record, `IntentDecision`.

use crate::error::{Result, WayfinderError};
use serde::{Deserialize, Serialize};

/// Application features a voice command can target
///
/// A closed enumeration rather than free-form strings: an identifier that
/// does not parse to a variant is rejected at the boundary instead of
/// silently falling into the "no context" routing branch.
///
/// Variant order is significant: the taxonomy iterates labels in this order
/// and the matchers' tie-break rules depend on it being stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureLabel {
    /// News search and article reading
    News,

    /// Document text recognition and read-aloud
    Text,

    /// Banknote detection and totaling
    Currency,

    /// Scene and object description
    Object,

    /// Face recognition of registered people
    Face,

    /// Product lookup via barcode
    Product,

    /// Distance estimation to obstacles
    Distance,

    /// Music recognition
    Music,

    /// General question answering
    Chat,
}

impl FeatureLabel {
    /// All labels in canonical registry order
    pub const ALL: [FeatureLabel; 9] = [
        FeatureLabel::News,
        FeatureLabel::Text,
        FeatureLabel::Currency,
        FeatureLabel::Object,
        FeatureLabel::Face,
        FeatureLabel::Product,
        FeatureLabel::Distance,
        FeatureLabel::Music,
        FeatureLabel::Chat,
    ];

    /// Parse a wire identifier (snake_case) into a label
    ///
    /// Fails with [`WayfinderError::UnknownFeature`] for anything the
    /// taxonomy does not know.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "news" => Ok(FeatureLabel::News),
            "text" => Ok(FeatureLabel::Text),
            "currency" => Ok(FeatureLabel::Currency),
            "object" => Ok(FeatureLabel::Object),
            "face" => Ok(FeatureLabel::Face),
            "product" => Ok(FeatureLabel::Product),
            "distance" => Ok(FeatureLabel::Distance),
            "music" => Ok(FeatureLabel::Music),
            "chat" => Ok(FeatureLabel::Chat),
            other => Err(WayfinderError::UnknownFeature(other.to_string())),
        }
    }

    /// Wire identifier for this label (matches the serde form)
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureLabel::News => "news",
            FeatureLabel::Text => "text",
            FeatureLabel::Currency => "currency",
            FeatureLabel::Object => "object",
            FeatureLabel::Face => "face",
            FeatureLabel::Product => "product",
            FeatureLabel::Distance => "distance",
            FeatureLabel::Music => "music",
            FeatureLabel::Chat => "chat",
        }
    }
}

impl std::fmt::Display for FeatureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FeatureLabel::News => "News",
            FeatureLabel::Text => "Text",
            FeatureLabel::Currency => "Currency",
            FeatureLabel::Object => "Object",
            FeatureLabel::Face => "Face",
            FeatureLabel::Product => "Product",
            FeatureLabel::Distance => "Distance",
            FeatureLabel::Music => "Music",
            FeatureLabel::Chat => "Chat",
        };
        write!(f, "{}", name)
    }
}

/// The router's classification of what the user wants done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Jump to another feature
    Navigate,

    /// Ask the active feature something
    Query,

    /// Have the active feature read content aloud
    Read,

    /// Control action on the active feature (stop/play)
    Action,

    /// Explicit "no signal"; reserved for callers, never produced by `decide`
    None,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Intent::Navigate => "navigate",
            Intent::Query => "query",
            Intent::Read => "read",
            Intent::Action => "action",
            Intent::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// Raw output of the external speech-to-text collaborator
///
/// The router only reads `text`; `confidence` is the ASR service's own score,
/// passed through unmodified for callers that want it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Recognized text
    pub text: String,

    /// ASR confidence, opaque to the router
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
        }
    }
}

/// The router's sole output, one per request
///
/// Immutable once produced; handed to the HTTP layer and never stored.
/// `query` is populated exactly when the intent carries a free-text payload
/// (`Query`/`Read`/`Action`); navigation jumps carry `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentDecision {
    /// Resolved target feature, or `None` when nothing matched
    pub command: Option<FeatureLabel>,

    /// Classification of the request
    pub intent: Intent,

    /// Certainty in [0.0, 1.0] for the lexical/action paths; the raw rounded
    /// cosine similarity for the semantic path (not a calibrated probability)
    pub confidence: f32,

    /// Original transcript when the intent carries a free-text payload
    pub query: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_parse_roundtrip() {
        for label in FeatureLabel::ALL {
            assert_eq!(FeatureLabel::parse(label.as_str()).unwrap(), label);
        }
    }

    #[test]
    fn test_label_parse_is_case_insensitive() {
        assert_eq!(FeatureLabel::parse("News").unwrap(), FeatureLabel::News);
        assert_eq!(
            FeatureLabel::parse("  CURRENCY ").unwrap(),
            FeatureLabel::Currency
        );
    }

    #[test]
    fn test_label_parse_unknown() {
        let err = FeatureLabel::parse("weather").unwrap_err();
        assert!(matches!(err, WayfinderError::UnknownFeature(_)));
    }

    #[test]
    fn test_label_serde_wire_form() {
        let json = serde_json::to_string(&FeatureLabel::News).unwrap();
        assert_eq!(json, "\"news\"");

        let label: FeatureLabel = serde_json::from_str("\"currency\"").unwrap();
        assert_eq!(label, FeatureLabel::Currency);
    }

    #[test]
    fn test_intent_display() {
        assert_eq!(Intent::Navigate.to_string(), "navigate");
        assert_eq!(Intent::Read.to_string(), "read");
    }

    #[test]
    fn test_decision_serialization() {
        let decision = IntentDecision {
            command: Some(FeatureLabel::News),
            intent: Intent::Read,
            confidence: 0.9,
            query: Some("read the news to me".to_string()),
        };

        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["command"], "news");
        assert_eq!(json["intent"], "read");
        assert_eq!(json["query"], "read the news to me");
    }
}
