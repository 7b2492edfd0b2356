//! Error taxonomy for the ingestion and processing pipeline.
//!
//! The pipeline's fatal-vs-best-effort policy dispatches on these variants:
//! `Upstream` is fatal for the notify-start, upload and notify-complete
//! steps but not for the transcript-ready post, and `Enrichment` only ever
//! skips the transcription sub-stage.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("buffer IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no buffer for recording: {0}")]
    NotFound(String),

    #[error("upstream call '{call}' failed: {detail}")]
    Upstream { call: &'static str, detail: String },

    #[error("enrichment failed: {0}")]
    Enrichment(String),
}

impl Error {
    /// Upstream failure from a non-success HTTP status.
    pub fn upstream_status(call: &'static str, status: reqwest::StatusCode) -> Self {
        Error::Upstream {
            call,
            detail: format!("status {}", status),
        }
    }

    /// Upstream failure from a transport-level error (connect, timeout, body).
    pub fn upstream_transport(call: &'static str, err: reqwest::Error) -> Self {
        Error::Upstream {
            call,
            detail: err.to_string(),
        }
    }
}

/// Result type alias using the pipeline error taxonomy
pub type Result<T> = std::result::Result<T, Error>;
