//! HTTP layer integration tests
//!
//! Drives the axum router with real requests via tower's oneshot, checking
//! status codes and JSON shapes for the success and error paths.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use std::sync::Arc;
use tower::ServiceExt;
use wayfinder_core::{
    api::{ApiServer, ApiServerConfig},
    transcription::TranscriptionService,
    EmbeddingService, FeatureTaxonomy, IntentRouter, Result, Transcript, WayfinderError,
};

struct StubEmbeddings;

#[async_trait]
impl EmbeddingService for StubEmbeddings {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0])
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }

    fn dimensions(&self) -> usize {
        2
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Transcription stub that returns a fixed transcript
struct FixedTranscription(&'static str);

#[async_trait]
impl TranscriptionService for FixedTranscription {
    async fn transcribe(&self, audio: Vec<u8>, _filename: &str) -> Result<Transcript> {
        if audio.is_empty() {
            return Err(WayfinderError::Transcription(
                "No usable audio".to_string(),
            ));
        }
        Ok(Transcript::new(self.0))
    }
}

async fn app(transcription: Option<Arc<dyn TranscriptionService>>) -> axum::Router {
    let taxonomy = Arc::new(FeatureTaxonomy::with_defaults());
    let router = IntentRouter::new(taxonomy, Arc::new(StubEmbeddings))
        .await
        .unwrap();

    ApiServer::new(ApiServerConfig::default(), Arc::new(router), transcription).into_router()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn intent_endpoint_returns_decision_json() {
    let app = app(None).await;

    let response = app
        .oneshot(json_request(
            "/intent",
            serde_json::json!({
                "transcript": "Open Text feature please",
                "current_feature": "news"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["command"], "text");
    assert_eq!(json["intent"], "navigate");
    assert_eq!(json["confidence"], 1.0);
    assert_eq!(json["query"], serde_json::Value::Null);
}

#[tokio::test]
async fn intent_endpoint_self_feature_read() {
    let app = app(None).await;

    let response = app
        .oneshot(json_request(
            "/intent",
            serde_json::json!({
                "transcript": "read the news to me",
                "current_feature": "news"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["command"], "news");
    assert_eq!(json["intent"], "read");
    assert_eq!(json["query"], "read the news to me");
}

#[tokio::test]
async fn empty_transcript_is_bad_request() {
    let app = app(None).await;

    let response = app
        .oneshot(json_request(
            "/intent",
            serde_json::json!({ "transcript": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn unknown_current_feature_is_bad_request() {
    let app = app(None).await;

    let response = app
        .oneshot(json_request(
            "/intent",
            serde_json::json!({
                "transcript": "open the news",
                "current_feature": "weather"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("weather"));
}

#[tokio::test]
async fn null_current_feature_is_accepted() {
    let app = app(None).await;

    let response = app
        .oneshot(json_request(
            "/intent",
            serde_json::json!({
                "transcript": "open the currency feature",
                "current_feature": null
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["command"], "currency");
}

#[tokio::test]
async fn audio_endpoint_transcribes_then_routes() {
    let app = app(Some(Arc::new(FixedTranscription("read the news to me")))).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/intent/audio?current_feature=news")
                .header(header::CONTENT_TYPE, "audio/webm")
                .body(Body::from(vec![0u8; 64]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["intent"], "read");
    assert_eq!(json["command"], "news");
}

#[tokio::test]
async fn audio_endpoint_transcription_failure_is_server_error() {
    let app = app(Some(Arc::new(FixedTranscription("ignored")))).await;

    // Empty body makes the stub fail like a collaborator outage.
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/intent/audio")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn audio_endpoint_without_service_is_server_error() {
    let app = app(None).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/intent/audio")
                .body(Body::from(vec![0u8; 16]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn labels_endpoint_lists_taxonomy() {
    let app = app(None).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/labels")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 9);
    assert_eq!(entries[0]["label"], "news");
    assert!(entries[0]["phrases"].as_array().unwrap().len() > 0);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = app(None).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
