use axum::{
    body::Bytes,
    extract::{
        multipart::{Multipart, MultipartError},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::state::AppState;

/// Uploads above this size are rejected before the handler logic runs
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Error returned when no `audio` field arrives with the upload
pub const NO_AUDIO_FILE: &str = "No audio file provided";

// ============================================================================
// Request/Response Types
// ============================================================================

/// The relay's JSON contract: `text` always present, `error` only on failure
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscribeResponse {
    fn ok(text: String) -> Self {
        Self { text, error: None }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/transcribe
///
/// Accepts one multipart upload with an `audio` field, forwards the bytes
/// to the upstream inference provider, and returns its transcript. Any
/// extra fields (the advisory `model` label included) are ignored.
pub async fn transcribe(State(state): State<AppState>, multipart: Multipart) -> Response {
    let audio = match read_audio_field(multipart).await {
        Ok(Some(audio)) => audio,
        Ok(None) => {
            // Validation failure ends the request here; exactly one
            // response is sent
            return (
                StatusCode::BAD_REQUEST,
                Json(TranscribeResponse::failure(NO_AUDIO_FILE)),
            )
                .into_response();
        }
        Err(e) => {
            error!("Failed to read upload: {}", e.body_text());
            return (e.status(), Json(TranscribeResponse::failure(e.body_text())))
                .into_response();
        }
    };

    info!("Received audio upload ({} bytes)", audio.len());

    match state.transcriber.transcribe(&audio).await {
        Ok(text) => (StatusCode::OK, Json(TranscribeResponse::ok(text))).into_response(),
        Err(e) => {
            error!("Error processing audio: {:#}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(TranscribeResponse::failure(format!("{:#}", e))),
            )
                .into_response()
        }
    }
}

/// Walk the multipart fields and pull out the `audio` payload
async fn read_audio_field(mut multipart: Multipart) -> Result<Option<Bytes>, MultipartError> {
    let mut audio = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio") => {
                audio = Some(field.bytes().await?);
            }
            Some("model") => {
                let label = field.text().await.unwrap_or_default();
                debug!("Model field (advisory, not forwarded): {}", label);
            }
            other => {
                debug!("Ignoring unexpected field: {:?}", other);
            }
        }
    }

    Ok(audio)
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
