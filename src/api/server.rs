//! HTTP API server for the intent router

use crate::error::WayfinderError;
use crate::router::IntentRouter;
use crate::transcription::TranscriptionService;
use crate::types::{FeatureLabel, IntentDecision};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Server address
    pub addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 3030).into(),
        }
    }
}

/// Shared request state
#[derive(Clone)]
struct AppState {
    router: Arc<IntentRouter>,
    /// Absent when no transcription API key is configured; the audio
    /// endpoint then answers with a server error instead of the whole
    /// service failing at startup.
    transcription: Option<Arc<dyn TranscriptionService>>,
    instance_id: String,
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create new API server around a built router
    pub fn new(
        config: ApiServerConfig,
        router: Arc<IntentRouter>,
        transcription: Option<Arc<dyn TranscriptionService>>,
    ) -> Self {
        let instance_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

        Self {
            config,
            state: AppState {
                router,
                transcription,
                instance_id,
            },
        }
    }

    /// Consume the server and return its axum router, for embedding into a
    /// larger application or driving requests in tests
    pub fn into_router(self) -> Router {
        Self::build_router(self.state)
    }

    /// Build router
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/intent", post(intent_handler))
            .route("/intent/audio", post(intent_audio_handler))
            .route("/labels", get(labels_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Start serving with dynamic port allocation
    ///
    /// Tries the configured address first, then probes upward if the
    /// primary port is unavailable.
    pub async fn serve(self) -> anyhow::Result<()> {
        let instance_id = self.state.instance_id.clone();
        let router = Self::build_router(self.state);

        match tokio::net::TcpListener::bind(self.config.addr).await {
            Ok(listener) => {
                info!(
                    "Intent API [{}] listening on http://{}",
                    instance_id, self.config.addr
                );
                axum::serve(listener, router).await?;
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                debug!(
                    "Port {} in use, trying alternative ports...",
                    self.config.addr.port()
                );
            }
            Err(e) => return Err(e.into()),
        }

        let base_port = self.config.addr.port();
        for offset in 1..=10 {
            let alt_addr = SocketAddr::new(self.config.addr.ip(), base_port + offset);

            match tokio::net::TcpListener::bind(alt_addr).await {
                Ok(listener) => {
                    info!(
                        "Intent API [{}] listening on http://{}",
                        instance_id, alt_addr
                    );
                    axum::serve(listener, router).await?;
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(anyhow::anyhow!(
            "All ports ({}-{}) are in use; intent API unavailable",
            base_port,
            base_port + 10
        ))
    }
}

/// Error payload returned to clients
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Wrapper so `WayfinderError` maps onto HTTP status codes
#[derive(Debug)]
struct ApiError(WayfinderError);

impl From<WayfinderError> for ApiError {
    fn from(err: WayfinderError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Intent request body
#[derive(Debug, Deserialize)]
struct IntentRequest {
    transcript: String,
    #[serde(default)]
    current_feature: Option<String>,
}

/// Parse the optional feature hint, failing fast on unknown identifiers
fn parse_feature(raw: Option<&str>) -> Result<Option<FeatureLabel>, WayfinderError> {
    match raw {
        Some(s) if !s.trim().is_empty() => Ok(Some(FeatureLabel::parse(s)?)),
        _ => Ok(None),
    }
}

/// `POST /intent` — transcript in, decision out
async fn intent_handler(
    State(state): State<AppState>,
    Json(req): Json<IntentRequest>,
) -> Result<Json<IntentDecision>, ApiError> {
    let current = parse_feature(req.current_feature.as_deref())?;
    let decision = state.router.decide(&req.transcript, current).await?;

    debug!(
        "Decision: intent={} command={:?} confidence={}",
        decision.intent, decision.command, decision.confidence
    );

    Ok(Json(decision))
}

#[derive(Debug, Deserialize)]
struct AudioParams {
    #[serde(default)]
    current_feature: Option<String>,
}

/// `POST /intent/audio` — raw audio body, transcribed then routed
async fn intent_audio_handler(
    State(state): State<AppState>,
    Query(params): Query<AudioParams>,
    body: Bytes,
) -> Result<Json<IntentDecision>, ApiError> {
    let transcription = state.transcription.as_ref().ok_or_else(|| {
        ApiError(WayfinderError::Transcription(
            "No transcription service configured".to_string(),
        ))
    })?;

    let current = parse_feature(params.current_feature.as_deref())?;
    let transcript = transcription
        .transcribe(body.to_vec(), "voice-input.webm")
        .await?;

    debug!("Transcribed audio: '{}'", transcript.text);

    let decision = state.router.decide(&transcript.text, current).await?;
    Ok(Json(decision))
}

/// One taxonomy entry as served to clients
#[derive(Debug, Serialize)]
struct LabelEntry {
    label: FeatureLabel,
    name: String,
    phrases: Vec<String>,
}

/// `GET /labels` — the taxonomy, so clients can surface available commands
async fn labels_handler(State(state): State<AppState>) -> Json<Vec<LabelEntry>> {
    let taxonomy = state.router.taxonomy();
    let entries = taxonomy
        .labels()
        .map(|label| LabelEntry {
            label,
            name: label.to_string(),
            phrases: taxonomy.phrases_of(label).to_vec(),
        })
        .collect();

    Json(entries)
}

/// Health check payload
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    instance_id: String,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        instance_id: state.instance_id.clone(),
    })
}
