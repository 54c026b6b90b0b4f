//! HTTP surface for the intent router
//!
//! One logical operation — transcript in, `IntentDecision` out — plus an
//! audio convenience endpoint that runs the transcription collaborator
//! first, a taxonomy listing for clients, and a health check.

pub mod server;

pub use server::{ApiServer, ApiServerConfig};
