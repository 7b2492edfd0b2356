//! Post-processing pipeline
//!
//! For every finalized recording the orchestrator runs the stage sequence
//! notify-start → upload → plan check → transcribe+summarize (premium only,
//! best-effort) → notify-complete → delete local buffer, short-circuiting on
//! fatal stage failure. At most one pipeline runs per filename; pipelines
//! outlive the connection that started them.

mod orchestrator;
mod state;

pub use orchestrator::{PipelineOrchestrator, TRANSCRIPTION_SIZE_LIMIT};
pub use state::RecordingState;
