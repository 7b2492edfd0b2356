use super::state::AppState;
use crate::pipeline::RecordingState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChunkAccepted {
    pub filename: String,
    pub sequence: u64,
    pub total_bytes: u64,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct FinalizeResponse {
    pub filename: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub session_id: String,
    /// Recordings still processing when the session closed; their pipelines
    /// keep running.
    pub in_flight: usize,
}

#[derive(Debug, Serialize)]
pub struct RecordingStatus {
    pub filename: String,
    pub state: RecordingState,
    pub fragments: usize,
    pub bytes: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Filenames become buffer paths and object keys, so anything that could
/// escape the buffer directory is rejected before the store sees it. With
/// separators refused, the name is a single path component, so only the
/// literal `.`/`..` components are traversal forms; names merely containing
/// dots (e.g. `take..2.webm`) are fine.
fn valid_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && filename != "."
        && filename != ".."
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /stream/connect
/// Open a new connection session
pub async fn connect_session(State(state): State<AppState>) -> impl IntoResponse {
    let session_id = state.registry.connect().await;

    (StatusCode::OK, Json(ConnectResponse { session_id }))
}

/// POST /stream/:session_id/:filename/chunks
/// Append one fragment to a recording's buffer
pub async fn receive_chunk(
    State(state): State<AppState>,
    Path((session_id, filename)): Path<(String, String)>,
    body: Bytes,
) -> impl IntoResponse {
    if !valid_filename(&filename) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid filename: {}", filename),
            }),
        )
            .into_response();
    }

    if !state.registry.track(&session_id, &filename).await {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response();
    }

    state.orchestrator.mark_receiving(&filename).await;

    // An append failure is reported but does not poison the stream; later
    // chunks for this filename still attempt to append.
    match state.store.append_chunk(&filename, body.to_vec()).await {
        Ok(receipt) => (
            StatusCode::OK,
            Json(ChunkAccepted {
                filename,
                sequence: receipt.sequence,
                total_bytes: receipt.total_bytes,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Error saving chunk for {}: {}", filename, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to save chunk: {}", e),
                }),
            )
                .into_response()
        }
    }
}

/// POST /stream/:session_id/:filename/finalize
/// No more fragments will arrive; run the processing pipeline
pub async fn finalize_recording(
    State(state): State<AppState>,
    Path((session_id, filename)): Path<(String, String)>,
    Json(req): Json<FinalizeRequest>,
) -> impl IntoResponse {
    if !valid_filename(&filename) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid filename: {}", filename),
            }),
        )
            .into_response();
    }

    if !state.registry.contains(&session_id).await {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response();
    }

    match state
        .orchestrator
        .finalize(filename.clone(), req.user_id)
        .await
    {
        Some(_handle) => {
            info!("Pipeline started for {}", filename);
            (
                StatusCode::ACCEPTED,
                Json(FinalizeResponse {
                    filename,
                    status: "processing".to_string(),
                }),
            )
                .into_response()
        }
        None => {
            warn!("Duplicate finalize rejected for {}", filename);
            (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Recording {} is already processing", filename),
                }),
            )
                .into_response()
        }
    }
}

/// DELETE /stream/:session_id
/// Tear down session bookkeeping; in-flight pipelines are not cancelled
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.disconnect(&session_id).await {
        Some(in_flight) => (
            StatusCode::OK,
            Json(DisconnectResponse {
                session_id,
                in_flight,
            }),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /recordings/:filename/status
/// Pipeline state plus buffer counters for a recording
pub async fn recording_status(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    match state.orchestrator.state_of(&filename).await {
        Some(recording_state) => {
            let fragments = state.store.fragments(&filename).await;
            let bytes = state.store.tracked_bytes(&filename).await;
            (
                StatusCode::OK,
                Json(RecordingStatus {
                    filename,
                    state: recording_state,
                    fragments: fragments.len(),
                    bytes,
                }),
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Recording {} not found", filename),
            }),
        )
            .into_response(),
    }
}

/// GET /sessions/:session_id
/// Session bookkeeping snapshot
pub async fn session_info(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.info(&session_id).await {
        Some(info) => (StatusCode::OK, Json(info)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", session_id),
            }),
        )
            .into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
