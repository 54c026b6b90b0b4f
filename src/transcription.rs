//! Speech-to-text collaborator
//!
//! The router never transcribes audio itself; it consumes a transcript
//! produced by an external ASR service. This module provides the trait seam
//! plus a client for a Whisper-compatible HTTP transcription API. Retry
//! policy lives here in the collaborator wrapper, never in the router.

use crate::config::TranscriptionConfig;
use crate::error::{Result, WayfinderError};
use crate::types::Transcript;
use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Maximum retry attempts for rate limiting and timeouts
const MAX_RETRIES: usize = 3;

/// Backoff base duration in milliseconds
const BACKOFF_BASE_MS: u64 = 1000;

/// Speech-to-text service trait
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Transcribe a short audio clip to text
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<Transcript>;
}

/// Whisper-compatible HTTP transcription client
pub struct RemoteTranscriptionService {
    client: Client,
    config: TranscriptionConfig,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl RemoteTranscriptionService {
    pub fn new(config: TranscriptionConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(WayfinderError::Validation(
                "Transcription API key is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    async fn call_api_with_retry(&self, audio: &[u8], filename: &str) -> Result<String> {
        let mut retries = 0;

        loop {
            match self.call_api(audio, filename).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    if retries >= MAX_RETRIES {
                        return Err(e);
                    }

                    let should_retry = match &e {
                        WayfinderError::Transcription(msg) => {
                            msg.contains("rate limit") || msg.contains("timeout")
                        }
                        WayfinderError::Http(err) => err.is_timeout(),
                        _ => false,
                    };

                    if !should_retry {
                        return Err(e);
                    }

                    let backoff_ms = BACKOFF_BASE_MS * 2_u64.pow(retries as u32);
                    warn!(
                        "Transcription call failed, retrying after {}ms (attempt {}/{})",
                        backoff_ms,
                        retries + 1,
                        MAX_RETRIES
                    );

                    sleep(Duration::from_millis(backoff_ms)).await;
                    retries += 1;
                }
            }
        }
    }

    async fn call_api(&self, audio: &[u8], filename: &str) -> Result<String> {
        debug!(
            "Transcribing {} bytes of audio via {}",
            audio.len(),
            self.config.base_url
        );

        let part = multipart::Part::bytes(audio.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| WayfinderError::Transcription(e.to_string()))?;

        let form = multipart::Form::new()
            .text("model", self.config.model.clone())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();

        match status {
            StatusCode::OK => {
                let body = response.json::<TranscriptionResponse>().await?;
                debug!("Transcription ok ({} chars)", body.text.len());
                Ok(body.text)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                WayfinderError::Transcription("Invalid or missing API key".to_string()),
            ),
            StatusCode::TOO_MANY_REQUESTS => Err(WayfinderError::Transcription(
                "Transcription rate limit exceeded".to_string(),
            )),
            _ => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(WayfinderError::Transcription(format!(
                    "API error (status {}): {}",
                    status, body
                )))
            }
        }
    }
}

#[async_trait]
impl TranscriptionService for RemoteTranscriptionService {
    async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> Result<Transcript> {
        if audio.is_empty() {
            return Err(WayfinderError::Validation(
                "Audio clip is empty".to_string(),
            ));
        }

        let text = self.call_api_with_retry(&audio, filename).await?;

        if text.trim().is_empty() {
            return Err(WayfinderError::Transcription(
                "Service returned an empty transcript".to_string(),
            ));
        }

        Ok(Transcript {
            text,
            confidence: None,
        })
    }
}
