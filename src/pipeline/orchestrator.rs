use super::state::RecordingState;
use crate::backend::{BackendNotifier, PlanTier};
use crate::enrich::Enricher;
use crate::error::Result;
use crate::session::SessionRegistry;
use crate::storage::ObjectStorage;
use crate::store::ChunkStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Recordings at or above this size are uploaded but not transcribed.
pub const TRANSCRIPTION_SIZE_LIMIT: u64 = 25_000_000;

const CONTENT_TYPE_WEBM: &str = "video/webm";

/// Runs the post-processing pipeline for finalized recordings.
///
/// The state table doubles as the single-writer guard: a filename whose state
/// is non-terminal and past `Receiving` has a pipeline in flight, and a second
/// finalize for it is rejected. Cloning is cheap; clones share the state
/// table and collaborators.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    store: Arc<ChunkStore>,
    storage: Arc<dyn ObjectStorage>,
    notifier: Arc<dyn BackendNotifier>,
    enricher: Arc<dyn Enricher>,
    registry: Arc<SessionRegistry>,
    states: Arc<Mutex<HashMap<String, RecordingState>>>,
}

impl PipelineOrchestrator {
    pub fn new(
        store: Arc<ChunkStore>,
        storage: Arc<dyn ObjectStorage>,
        notifier: Arc<dyn BackendNotifier>,
        enricher: Arc<dyn Enricher>,
        registry: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            store,
            storage,
            notifier,
            enricher,
            registry,
            states: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Current processing state of a recording, if known.
    pub async fn state_of(&self, filename: &str) -> Option<RecordingState> {
        let states = self.states.lock().await;
        states.get(filename).copied()
    }

    /// Mark a recording as receiving chunks. A fresh filename (or one whose
    /// previous run reached a terminal state) starts over; a recording with a
    /// pipeline in flight is left untouched.
    pub async fn mark_receiving(&self, filename: &str) {
        let mut states = self.states.lock().await;
        match states.get(filename) {
            Some(state) if !state.is_terminal() => {}
            _ => {
                states.insert(filename.to_string(), RecordingState::Receiving);
            }
        }
    }

    /// React to the finalize signal: claim the filename and spawn its
    /// pipeline task. Returns the task handle, or `None` if a pipeline for
    /// this filename is already in flight (the duplicate is rejected, never
    /// run in parallel).
    pub async fn finalize(&self, filename: String, user_id: String) -> Option<JoinHandle<()>> {
        {
            let mut states = self.states.lock().await;
            if let Some(state) = states.get(&filename) {
                if !state.is_terminal() && *state != RecordingState::Receiving {
                    warn!(
                        "Rejecting duplicate finalize for {} (state: {:?})",
                        filename, state
                    );
                    return None;
                }
            }
            states.insert(filename.clone(), RecordingState::Uploading);
        }

        info!("Finalize received for {} (user: {})", filename, user_id);

        let this = self.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = this.run(&filename, &user_id).await {
                error!("Pipeline failed for {}: {}", filename, e);
                // The local buffer is kept on every fatal path for manual recovery.
                this.set_state(&filename, RecordingState::Failed).await;
            }
            this.registry.untrack(&filename).await;
        }))
    }

    async fn set_state(&self, filename: &str, state: RecordingState) {
        let mut states = self.states.lock().await;
        states.insert(filename.to_string(), state);
    }

    /// The ordered stage sequence. Any error returned here is fatal and
    /// transitions the recording to `Failed` without touching the buffer.
    async fn run(&self, filename: &str, user_id: &str) -> Result<()> {
        // Stage 1: notify-start. The response carries the plan tier, read
        // exactly once for this run.
        let plan = self.notifier.processing_started(user_id, filename).await?;

        // Stage 2: upload. Reading an unknown filename fails here, before
        // any storage call is attempted.
        let media = self.store.read_all(filename).await?;
        // Only premium runs need the bytes again after the upload consumes them.
        let media_for_enrichment = (plan == PlanTier::Pro).then(|| media.clone());
        self.storage.put(filename, media, CONTENT_TYPE_WEBM).await?;

        // Stage 3: plan check.
        self.set_state(filename, RecordingState::PlanCheck).await;

        // Stage 4: transcription, premium tier only and best-effort.
        if let Some(media) = media_for_enrichment {
            self.set_state(filename, RecordingState::Transcribing).await;
            self.enrich_stage(filename, user_id, media).await;
        } else {
            info!("Plan tier {:?} does not include transcription for {}", plan, filename);
        }

        // Stage 5: notify-complete, then cleanup.
        self.set_state(filename, RecordingState::NotifyingComplete)
            .await;
        self.notifier.processing_complete(user_id, filename).await?;

        if let Err(e) = self.store.delete(filename).await {
            // Upload already succeeded; a stranded buffer file is logged,
            // not a pipeline failure.
            warn!("Failed to delete buffer for {}: {}", filename, e);
        }
        self.set_state(filename, RecordingState::CleanedUp).await;

        info!("Pipeline complete for {}", filename);
        Ok(())
    }

    /// Best-effort sub-stage: size gate, enrich, post the transcript.
    /// Failures here are logged and never abort the pipeline.
    async fn enrich_stage(&self, filename: &str, user_id: &str, media: Vec<u8>) {
        let size = match self.store.size_of(filename).await {
            Ok(size) => size,
            Err(e) => {
                warn!("Skipping transcription for {}: {}", filename, e);
                return;
            }
        };

        if size >= TRANSCRIPTION_SIZE_LIMIT {
            info!(
                "Skipping transcription for {}: {} bytes is at or above the {} byte limit",
                filename, size, TRANSCRIPTION_SIZE_LIMIT
            );
            return;
        }

        let enrichment = match self.enricher.enrich(filename, media).await {
            Ok(enrichment) => enrichment,
            Err(e) => {
                warn!("Enrichment failed for {}, continuing without transcript: {}", filename, e);
                return;
            }
        };

        let content = serde_json::json!({
            "title": enrichment.title,
            "summary": enrichment.summary,
        })
        .to_string();

        if let Err(e) = self
            .notifier
            .transcript_ready(user_id, filename, &content, &enrichment.transcript)
            .await
        {
            warn!("Transcript notification failed for {}: {}", filename, e);
        }
    }
}
