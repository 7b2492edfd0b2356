//! HTTP ingestion surface
//!
//! Thin transport glue translating HTTP requests into the three inbound
//! events the pipeline reacts to:
//! - POST /stream/connect - open a session (chunk-received needs one)
//! - POST /stream/:session_id/:filename/chunks - append a fragment
//! - POST /stream/:session_id/:filename/finalize - trigger the pipeline
//! - DELETE /stream/:session_id - session teardown only
//! Plus diagnostics:
//! - GET /recordings/:filename/status - pipeline state and buffer counters
//! - GET /sessions/:session_id - session bookkeeping snapshot
//! - GET /health - health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
