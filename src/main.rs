//! Wayfinder - Voice Command Intent Router
//!
//! Entry point for the wayfinder service: serve the HTTP API, make one-shot
//! routing decisions from the command line, or print the taxonomy.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wayfinder_core::{
    api::{ApiServer, ApiServerConfig},
    config::WayfinderConfig,
    error::Result,
    transcription::{RemoteTranscriptionService, TranscriptionService},
    FeatureLabel, IntentRouter, LocalEmbeddingService,
};

#[derive(Parser)]
#[command(name = "wayfinder")]
#[command(about = "Voice command intent router for an assistive perception backend")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, short, global = true, env = "WAYFINDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP intent API (default)
    Serve,

    /// Make one routing decision and print it as JSON
    Route {
        /// Speech transcript to route
        transcript: String,

        /// Currently active feature (news, text, currency, ...)
        #[arg(long, short)]
        feature: Option<String>,
    },

    /// Print the feature taxonomy
    Labels,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = WayfinderConfig::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Route {
            transcript,
            feature,
        } => route_once(config, &transcript, feature.as_deref()).await,
        Command::Labels => {
            print_labels(&config)?;
            Ok(())
        }
    }
}

/// Build the immutable runtime objects shared by every request
async fn build_router(config: &WayfinderConfig) -> Result<Arc<IntentRouter>> {
    let taxonomy = Arc::new(config.taxonomy.build()?);
    info!(
        "Taxonomy loaded: {} features, {} trigger phrases",
        taxonomy.feature_count(),
        taxonomy.phrase_count()
    );

    let embeddings = Arc::new(LocalEmbeddingService::new(config.embedding.clone()).await?);
    let router = IntentRouter::new(taxonomy, embeddings).await?;

    Ok(Arc::new(router))
}

async fn serve(config: WayfinderConfig) -> anyhow::Result<()> {
    let router = build_router(&config).await?;

    let transcription: Option<Arc<dyn TranscriptionService>> =
        match RemoteTranscriptionService::new(config.transcription.clone()) {
            Ok(service) => Some(Arc::new(service)),
            Err(e) => {
                warn!("Transcription service disabled: {}", e);
                None
            }
        };

    let server_config = ApiServerConfig {
        addr: config.server.addr(),
    };

    ApiServer::new(server_config, router, transcription)
        .serve()
        .await
}

async fn route_once(
    config: WayfinderConfig,
    transcript: &str,
    feature: Option<&str>,
) -> anyhow::Result<()> {
    let current = match feature {
        Some(s) => Some(FeatureLabel::parse(s)?),
        None => None,
    };

    let router = build_router(&config).await?;
    let decision = router.decide(transcript, current).await?;

    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

fn print_labels(config: &WayfinderConfig) -> Result<()> {
    let taxonomy = config.taxonomy.build()?;

    println!("Feature taxonomy:");
    println!();
    for label in taxonomy.labels() {
        println!("  {:<10} {}", label.as_str(), taxonomy.phrases_of(label).join(", "));
    }
    println!();
    println!("{} features, {} trigger phrases", taxonomy.feature_count(), taxonomy.phrase_count());

    Ok(())
}
