//! Error types for the Wayfinder intent router
//!
//! This module provides structured error handling using thiserror for
//! error definitions and anyhow for error propagation at the edges.

use thiserror::Error;

/// Main error type for Wayfinder operations
#[derive(Error, Debug)]
pub enum WayfinderError {
    /// Transcript is empty or whitespace-only after trimming
    #[error("Transcript is empty; nothing to route")]
    EmptyInput,

    /// A feature identifier was supplied that the taxonomy does not know
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// The speech-to-text collaborator returned no usable transcript
    #[error("Transcription error: {0}")]
    Transcription(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid input or configuration value
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Wayfinder operations
pub type Result<T> = std::result::Result<T, WayfinderError>;

/// Convert anyhow::Error to WayfinderError
impl From<anyhow::Error> for WayfinderError {
    fn from(err: anyhow::Error) -> Self {
        WayfinderError::Other(err.to_string())
    }
}

impl WayfinderError {
    /// Whether this error is the caller's fault (HTTP 400-class)
    /// rather than a collaborator or server failure (500-class).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            WayfinderError::EmptyInput
                | WayfinderError::UnknownFeature(_)
                | WayfinderError::Validation(_)
        )
    }
}
