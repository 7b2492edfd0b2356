pub mod backend;
pub mod config;
pub mod enrich;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod store;

pub use backend::{BackendNotifier, HttpBackendNotifier, PlanTier};
pub use config::Config;
pub use enrich::{Enricher, Enrichment, OpenAiEnricher};
pub use error::{Error, Result};
pub use http::{create_router, AppState};
pub use pipeline::{PipelineOrchestrator, RecordingState, TRANSCRIPTION_SIZE_LIMIT};
pub use session::{SessionInfo, SessionRegistry};
pub use storage::{ObjectStorage, S3CompatibleStorage};
pub use store::{ChunkReceipt, ChunkStore, Fragment};
