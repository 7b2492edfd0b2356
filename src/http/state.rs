use crate::pipeline::PipelineOrchestrator;
use crate::session::SessionRegistry;
use crate::store::ChunkStore;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub store: Arc<ChunkStore>,
    pub orchestrator: Arc<PipelineOrchestrator>,
}

impl AppState {
    pub fn new(
        registry: Arc<SessionRegistry>,
        store: Arc<ChunkStore>,
        orchestrator: Arc<PipelineOrchestrator>,
    ) -> Self {
        Self {
            registry,
            store,
            orchestrator,
        }
    }
}
