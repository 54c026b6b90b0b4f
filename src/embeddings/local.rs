//! Local embedding service using fastembed
//!
//! Runs the configured model locally via ONNX Runtime. The model is
//! downloaded to the cache directory on first use and loaded from cache
//! afterwards. fastembed is synchronous, so inference runs in Tokio
//! blocking tasks to keep the request loop free.

use crate::config::EmbeddingConfig;
use crate::embeddings::EmbeddingService;
use crate::error::{Result, WayfinderError};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};
use tokio::task;
use tracing::{debug, info};

/// Local embedding service backed by fastembed
pub struct LocalEmbeddingService {
    /// Underlying model; Mutex because fastembed's embed takes &mut self
    model: Arc<Mutex<TextEmbedding>>,
    config: EmbeddingConfig,
    dimensions: usize,
}

impl LocalEmbeddingService {
    /// Load the configured model (downloading it on first use)
    ///
    /// The first run may take a while depending on model size and network
    /// speed; subsequent runs load from the cache directory.
    pub async fn new(config: EmbeddingConfig) -> Result<Self> {
        config.validate()?;

        info!(
            "Loading embedding model '{}' (cache: {})",
            config.model,
            config.cache_dir.display()
        );

        let embedding_model = Self::model_name_to_enum(&config.model)?;

        let init_options = InitOptions::new(embedding_model)
            .with_show_download_progress(config.show_download_progress)
            .with_cache_dir(config.cache_dir.clone());

        let model = task::spawn_blocking(move || TextEmbedding::try_new(init_options))
            .await
            .map_err(|e| WayfinderError::Other(format!("Task join error: {}", e)))?
            .map_err(|e| WayfinderError::Embedding(format!("Failed to load model: {}", e)))?;

        let dimensions = config.dimensions();
        info!("Embedding model ready: {} dimensions", dimensions);

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            config,
            dimensions,
        })
    }

    fn model_name_to_enum(model_name: &str) -> Result<EmbeddingModel> {
        match model_name {
            "nomic-embed-text-v1.5" => Ok(EmbeddingModel::NomicEmbedTextV15),
            "nomic-embed-text-v1" => Ok(EmbeddingModel::NomicEmbedTextV1),
            "all-MiniLM-L6-v2" => Ok(EmbeddingModel::AllMiniLML6V2),
            "all-MiniLM-L12-v2" => Ok(EmbeddingModel::AllMiniLML12V2),
            "bge-small-en-v1.5" => Ok(EmbeddingModel::BGESmallENV15),
            "bge-base-en-v1.5" => Ok(EmbeddingModel::BGEBaseENV15),
            "bge-large-en-v1.5" => Ok(EmbeddingModel::BGELargeENV15),
            _ => Err(WayfinderError::Config(config::ConfigError::Message(
                format!("Unsupported embedding model: '{}'", model_name),
            ))),
        }
    }

    /// Embed one batch of texts in a blocking task and validate dimensions
    async fn embed_batch_blocking(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding batch of {} texts", texts.len());

        let model = Arc::clone(&self.model);
        let dimensions = self.dimensions;

        let embeddings = task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|e| format!("Mutex lock failed: {}", e))?;
            guard
                .embed(texts, None)
                .map_err(|e| format!("Embedding generation failed: {}", e))
        })
        .await
        .map_err(|e| WayfinderError::Other(format!("Task join error: {}", e)))?
        .map_err(WayfinderError::Embedding)?;

        for (i, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimensions {
                return Err(WayfinderError::Embedding(format!(
                    "Embedding {} has wrong dimensions: expected {}, got {}",
                    i,
                    dimensions,
                    embedding.len()
                )));
            }
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingService for LocalEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(WayfinderError::Validation(
                "Text to embed cannot be empty".to_string(),
            ));
        }

        let mut embeddings = self.embed_batch_blocking(vec![text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| WayfinderError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        for (i, text) in texts.iter().enumerate() {
            if text.trim().is_empty() {
                return Err(WayfinderError::Validation(format!(
                    "Text at index {} cannot be empty",
                    i
                )));
            }
        }

        let owned: Vec<String> = texts.iter().map(|s| s.to_string()).collect();

        let mut all = Vec::with_capacity(owned.len());
        for chunk in owned.chunks(self.config.batch_size) {
            let chunk_embeddings = self.embed_batch_blocking(chunk.to_vec()).await?;
            all.extend(chunk_embeddings);
        }

        Ok(all)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
