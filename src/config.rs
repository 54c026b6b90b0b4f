//! Configuration for the Wayfinder router and its collaborators
//!
//! Layered loading via the `config` crate: built-in defaults, overridden by
//! an optional TOML file, overridden by `WAYFINDER_*` environment variables
//! (double underscore as section separator, e.g. `WAYFINDER_SERVER__PORT`).
//!
//! All sections are plain data; the loaded `WayfinderConfig` is turned into
//! immutable runtime objects (taxonomy, embedding service, router) once at
//! startup and passed by reference from there on.

use crate::error::{Result, WayfinderError};
use crate::taxonomy::FeatureTaxonomy;
use crate::types::FeatureLabel;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WayfinderConfig {
    pub server: ServerConfig,
    pub embedding: EmbeddingConfig,
    pub transcription: TranscriptionConfig,
    pub taxonomy: TaxonomyConfig,
}

impl WayfinderConfig {
    /// Load configuration: defaults <- optional TOML file <- env vars
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config: WayfinderConfig = builder
            .add_source(
                Environment::with_prefix("WAYFINDER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.embedding.validate()?;
        Ok(config)
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: IpAddr,

    /// Bind port; the server probes upward if this one is taken
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3030,
        }
    }
}

/// Local embedding model settings (fastembed)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Model name; must be one of the supported fastembed models
    pub model: String,

    /// Where downloaded model files are cached
    pub cache_dir: PathBuf,

    /// Max texts per embedding batch
    pub batch_size: usize,

    /// Print a progress bar while downloading the model
    pub show_download_progress: bool,
}

impl EmbeddingConfig {
    /// Embedding dimensionality for the configured model
    pub fn dimensions(&self) -> usize {
        match self.model.as_str() {
            "nomic-embed-text-v1.5" | "nomic-embed-text-v1" | "bge-base-en-v1.5" => 768,
            "bge-large-en-v1.5" => 1024,
            // all-MiniLM-L6-v2, all-MiniLM-L12-v2, bge-small-en-v1.5
            _ => 384,
        }
    }

    /// Check that the model name is supported and batch size is sane
    pub fn validate(&self) -> Result<()> {
        const SUPPORTED: [&str; 7] = [
            "nomic-embed-text-v1.5",
            "nomic-embed-text-v1",
            "all-MiniLM-L6-v2",
            "all-MiniLM-L12-v2",
            "bge-small-en-v1.5",
            "bge-base-en-v1.5",
            "bge-large-en-v1.5",
        ];

        if !SUPPORTED.contains(&self.model.as_str()) {
            return Err(WayfinderError::Config(config::ConfigError::Message(
                format!(
                    "Unsupported embedding model: '{}'. Supported: {}",
                    self.model,
                    SUPPORTED.join(", ")
                ),
            )));
        }

        if self.batch_size == 0 {
            return Err(WayfinderError::Config(config::ConfigError::Message(
                "embedding.batch_size must be at least 1".to_string(),
            )));
        }

        Ok(())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wayfinder")
            .join("models");

        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            cache_dir,
            batch_size: 32,
            show_download_progress: false,
        }
    }
}

/// External speech-to-text collaborator settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// API base URL (Whisper-compatible transcription endpoint)
    pub base_url: String,

    /// Bearer token; defaults to `OPENAI_API_KEY` from the environment
    pub api_key: String,

    /// Model name sent with each request
    pub model: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: "whisper-1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Trigger-phrase overrides, keyed by wire label ("news", "text", ...)
///
/// Labels without an override keep the built-in phrases. An override key that
/// is not a known label fails fast at load time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    pub phrases: HashMap<String, Vec<String>>,
}

impl TaxonomyConfig {
    /// Build the immutable runtime taxonomy from defaults plus overrides
    pub fn build(&self) -> Result<FeatureTaxonomy> {
        // Reject unknown label keys before applying anything.
        for key in self.phrases.keys() {
            FeatureLabel::parse(key)?;
        }

        let defaults = FeatureTaxonomy::with_defaults();
        let entries = FeatureLabel::ALL
            .iter()
            .map(|&label| {
                let phrases = self
                    .phrases
                    .get(label.as_str())
                    .cloned()
                    .unwrap_or_else(|| defaults.phrases_of(label).to_vec());
                (label, phrases)
            })
            .collect();

        FeatureTaxonomy::from_entries(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WayfinderConfig::default();
        assert!(config.embedding.validate().is_ok());
        assert!(config.taxonomy.build().is_ok());
        assert_eq!(config.server.port, 3030);
    }

    #[test]
    fn test_embedding_dimensions() {
        let mut config = EmbeddingConfig::default();
        assert_eq!(config.dimensions(), 384);

        config.model = "nomic-embed-text-v1.5".to_string();
        assert_eq!(config.dimensions(), 768);

        config.model = "bge-large-en-v1.5".to_string();
        assert_eq!(config.dimensions(), 1024);
    }

    #[test]
    fn test_unsupported_model_rejected() {
        let config = EmbeddingConfig {
            model: "word2vec".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = EmbeddingConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_taxonomy_override_applies() {
        let mut taxonomy_config = TaxonomyConfig::default();
        taxonomy_config.phrases.insert(
            "news".to_string(),
            vec!["bulletin".to_string(), "headlines".to_string()],
        );

        let taxonomy = taxonomy_config.build().unwrap();
        assert_eq!(
            taxonomy.phrases_of(FeatureLabel::News),
            &["bulletin".to_string(), "headlines".to_string()]
        );
        // Untouched labels keep defaults
        assert!(!taxonomy.phrases_of(FeatureLabel::Currency).is_empty());
    }

    #[test]
    fn test_taxonomy_unknown_override_key_fails() {
        let mut taxonomy_config = TaxonomyConfig::default();
        taxonomy_config
            .phrases
            .insert("weather".to_string(), vec!["forecast".to_string()]);

        assert!(matches!(
            taxonomy_config.build(),
            Err(WayfinderError::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_load_from_toml_file() {
        use std::io::Write;

        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            "[server]\nport = 4040\n\n[taxonomy.phrases]\nmusic = [\"tunes\"]"
        )
        .unwrap();

        let config = WayfinderConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 4040);

        let taxonomy = config.taxonomy.build().unwrap();
        assert_eq!(
            taxonomy.phrases_of(FeatureLabel::Music),
            &["tunes".to_string()]
        );
    }
}
