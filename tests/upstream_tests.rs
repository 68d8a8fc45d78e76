// Integration tests for the hosted inference client
//
// A local axum server stands in for the upstream endpoint so the bearer
// header, multipart forwarding, and response parsing are verified without
// leaving the machine.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use quickscribe::config::UpstreamConfig;
use quickscribe::{HostedWhisper, Transcriber};
use serde_json::{json, Value};
use tokio::sync::Mutex;

type SeenAuth = Arc<Mutex<Option<String>>>;

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: Value,
    seen_auth: SeenAuth,
}

async fn stub_inference(
    State(state): State<StubState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    *state.seen_auth.lock().await = auth;

    (state.status, Json(state.body.clone()))
}

async fn spawn_stub(status: StatusCode, body: Value) -> Result<(SocketAddr, SeenAuth)> {
    let seen_auth: SeenAuth = Arc::new(Mutex::new(None));
    let state = StubState {
        status,
        body,
        seen_auth: Arc::clone(&seen_auth),
    };

    let app = Router::new()
        .route("/", post(stub_inference))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((addr, seen_auth))
}

fn client_for(addr: SocketAddr, token: &str) -> HostedWhisper {
    HostedWhisper::new(&UpstreamConfig {
        endpoint: format!("http://{}/", addr),
        token: token.to_string(),
    })
}

#[tokio::test]
async fn test_transcribe_success() -> Result<()> {
    let (addr, seen_auth) = spawn_stub(StatusCode::OK, json!({"text": "hello world"})).await?;

    let client = client_for(addr, "test-token");
    let text = client.transcribe(b"\x01\x02\x03").await?;

    assert_eq!(text, "hello world");
    assert_eq!(
        seen_auth.lock().await.as_deref(),
        Some("Bearer test-token"),
        "bearer credential must reach the upstream"
    );

    Ok(())
}

#[tokio::test]
async fn test_missing_text_field_maps_to_empty() -> Result<()> {
    let (addr, _) = spawn_stub(StatusCode::OK, json!({"chunks": []})).await?;

    let client = client_for(addr, "test-token");
    let text = client.transcribe(b"\x01").await?;

    assert_eq!(text, "", "absent text field must not fail the request");

    Ok(())
}

#[tokio::test]
async fn test_upstream_error_status() -> Result<()> {
    let (addr, _) = spawn_stub(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"error": "model overloaded"}),
    )
    .await?;

    let client = client_for(addr, "test-token");
    let result = client.transcribe(b"\x01").await;

    let err = result.expect_err("non-2xx upstream status must be an error");
    assert!(
        format!("{err:#}").contains("503"),
        "error should carry the upstream status, got: {err:#}"
    );

    Ok(())
}
