use super::handlers;
use super::state::AppState;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(
    state: AppState,
    allowed_origins: &[String],
    max_chunk_bytes: usize,
) -> Result<Router> {
    let cors = cors_layer(allowed_origins)?;

    Ok(Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Stream lifecycle
        .route("/stream/connect", post(handlers::connect_session))
        .route(
            "/stream/:session_id/:filename/chunks",
            post(handlers::receive_chunk),
        )
        .route(
            "/stream/:session_id/:filename/finalize",
            post(handlers::finalize_recording),
        )
        .route("/stream/:session_id", delete(handlers::close_session))
        // Diagnostics
        .route(
            "/recordings/:filename/status",
            get(handlers::recording_status),
        )
        .route("/sessions/:session_id", get(handlers::session_info))
        // Chunk bodies are raw media; raise the default body limit
        .layer(DefaultBodyLimit::max(max_chunk_bytes))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    if allowed_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid allowed origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(layer.allow_origin(origins))
}
