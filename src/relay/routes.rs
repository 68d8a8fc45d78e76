use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Transcription relay
        .route("/api/transcribe", post(handlers::transcribe))
        // Reject oversized uploads ahead of the handler
        .layer(DefaultBodyLimit::max(handlers::MAX_UPLOAD_BYTES))
        // Browser clients call from another origin
        .layer(CorsLayer::permissive())
        // Request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
