//! Relay service: the HTTP front door for transcription
//!
//! This module provides a stateless REST API:
//! - POST /api/transcribe - Forward one audio upload to the upstream
//!   inference provider and return its transcript
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{TranscribeResponse, MAX_UPLOAD_BYTES, NO_AUDIO_FILE};
pub use routes::create_router;
pub use state::AppState;
