//! Wayfinder - Voice Command Intent Router
//!
//! The routing core of an assistive perception backend for visually-impaired
//! users. Given a raw speech transcript and an optional "currently active
//! feature" hint, wayfinder produces one structured [`IntentDecision`]:
//! navigate to another feature, query or read within the active feature, or
//! perform a control action (stop/play), with a numeric confidence.
//!
//! # Architecture
//!
//! - **Types**: [`FeatureLabel`], [`Intent`], [`Transcript`], [`IntentDecision`]
//! - **Taxonomy**: immutable registry of trigger phrases per feature
//! - **Matchers**: deterministic lexical substring search, then a semantic
//!   embedding-similarity fallback over the same taxonomy
//! - **Router**: [`IntentRouter::decide`] orchestrates action check ->
//!   lexical -> semantic into one uniform contract
//! - **API**: axum HTTP layer consumed by the application frontends
//!
//! Speech-to-text and the embedding model are external collaborators behind
//! the [`TranscriptionService`] and [`EmbeddingService`] traits.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wayfinder_core::{
//!     FeatureLabel, FeatureTaxonomy, IntentRouter, LocalEmbeddingService,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = wayfinder_core::config::WayfinderConfig::load(None)?;
//!     let taxonomy = Arc::new(config.taxonomy.build()?);
//!     let embeddings = Arc::new(LocalEmbeddingService::new(config.embedding).await?);
//!
//!     let router = IntentRouter::new(taxonomy, embeddings).await?;
//!     let decision = router
//!         .decide("read the news to me", Some(FeatureLabel::News))
//!         .await?;
//!
//!     println!("{:?}", decision);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod matcher;
pub mod router;
pub mod taxonomy;
pub mod transcription;
pub mod types;

// Re-export commonly used types
pub use api::{ApiServer, ApiServerConfig};
pub use config::WayfinderConfig;
pub use embeddings::{EmbeddingService, LocalEmbeddingService};
pub use error::{Result, WayfinderError};
pub use router::IntentRouter;
pub use taxonomy::FeatureTaxonomy;
pub use transcription::{RemoteTranscriptionService, TranscriptionService};
pub use types::{FeatureLabel, Intent, IntentDecision, Transcript};
