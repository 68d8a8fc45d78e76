use std::sync::Arc;

use crate::upstream::Transcriber;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream speech-to-text client; immutable after startup, so
    /// concurrent requests share it without coordination
    pub transcriber: Arc<dyn Transcriber>,
}

impl AppState {
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self { transcriber }
    }
}
