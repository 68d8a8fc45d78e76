// Integration tests for the transcription relay
//
// Stub Transcriber implementations stand in for the upstream inference
// provider so every path through the handler is exercised locally.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use quickscribe::config::UpstreamConfig;
use quickscribe::relay::MAX_UPLOAD_BYTES;
use quickscribe::{create_router, AppState, HostedWhisper, Transcriber};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::ServiceExt;

const BOUNDARY: &str = "quickscribe-test-boundary";

struct FixedTranscriber(&'static str);

#[async_trait::async_trait]
impl Transcriber for FixedTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        Ok(self.0.to_string())
    }
}

struct FailingTranscriber;

#[async_trait::async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        Err(anyhow!("inference endpoint error: 503 Service Unavailable"))
    }
}

struct RecordingTranscriber {
    seen: Arc<Mutex<Vec<Vec<u8>>>>,
}

#[async_trait::async_trait]
impl Transcriber for RecordingTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        self.seen.lock().await.push(audio.to_vec());
        Ok("ok".to_string())
    }
}

fn app(transcriber: impl Transcriber + 'static) -> Router {
    create_router(AppState::new(Arc::new(transcriber)))
}

fn multipart_body(fields: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, data) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        if *name == "audio" {
            body.extend_from_slice(
                b"Content-Disposition: form-data; name=\"audio\"; filename=\"recording.wav\"\r\n\
                  Content-Type: audio/wav\r\n\r\n",
            );
        } else {
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            );
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn transcribe_request(fields: &[(&str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/transcribe")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields)))
        .expect("failed to build request")
}

async fn response_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn test_valid_upload_passes_text_through() -> Result<()> {
    let app = app(FixedTranscriber("hello"));

    let request = transcribe_request(&[("audio", &b"\x01"[..]), ("model", &b"whisper-small"[..])]);
    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await?;
    assert_eq!(
        body,
        json!({"text": "hello"}),
        "success body carries text only, no error field"
    );

    Ok(())
}

#[tokio::test]
async fn test_missing_audio_field() -> Result<()> {
    let app = app(FixedTranscriber("unused"));

    let request = transcribe_request(&[("model", &b"whisper-small"[..])]);
    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await?;
    assert_eq!(body, json!({"text": "", "error": "No audio file provided"}));

    Ok(())
}

#[tokio::test]
async fn test_oversized_upload_rejected() -> Result<()> {
    let app = app(FixedTranscriber("unused"));

    let payload = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let response = app
        .oneshot(transcribe_request(&[("audio", payload.as_slice())]))
        .await?;

    assert_eq!(
        response.status(),
        StatusCode::PAYLOAD_TOO_LARGE,
        "uploads over the byte ceiling must be rejected"
    );

    Ok(())
}

#[tokio::test]
async fn test_upstream_failure_maps_to_5xx() -> Result<()> {
    let app = app(FailingTranscriber);

    let response = app
        .oneshot(transcribe_request(&[("audio", &b"\x01\x02"[..])]))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = response_json(response).await?;
    assert_eq!(body["text"], "");

    let error = body["error"].as_str().unwrap_or_default();
    assert!(!error.is_empty(), "error message must not be empty");
    assert!(error.contains("503"), "error should carry the upstream status, got: {error}");

    Ok(())
}

#[tokio::test]
async fn test_audio_bytes_forwarded_unchanged() -> Result<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = app(RecordingTranscriber {
        seen: Arc::clone(&seen),
    });

    let audio = b"RIFF fake wav payload";
    let request = transcribe_request(&[
        ("audio", audio.as_slice()),
        ("model", &b"custom"[..]),
        ("junk", &b"ignored"[..]),
    ]);
    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK, "extra fields are ignored");

    let seen = seen.lock().await;
    assert_eq!(seen.len(), 1, "exactly one upstream call per upload");
    assert_eq!(seen[0], audio.to_vec(), "audio bytes must pass through unmodified");

    Ok(())
}

#[tokio::test]
async fn test_full_relay_against_stubbed_upstream() -> Result<()> {
    // Stub inference endpoint returning a fixed transcript
    let upstream = Router::new().route(
        "/",
        post(|| async { Json(json!({"text": "hello"})) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream).await;
    });

    let transcriber = HostedWhisper::new(&UpstreamConfig {
        endpoint: format!("http://{}/", addr),
        token: "test-token".to_string(),
    });
    let app = create_router(AppState::new(Arc::new(transcriber)));

    let request = transcribe_request(&[("audio", &b"\x01"[..]), ("model", &b"whisper-small"[..])]);
    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await?;
    assert_eq!(body, json!({"text": "hello"}));

    Ok(())
}

#[tokio::test]
async fn test_health_check() -> Result<()> {
    let app = app(FixedTranscriber("unused"));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("failed to build request");
    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}
