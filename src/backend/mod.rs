//! Backend lifecycle notifications
//!
//! Thin client for the external metadata service that owns recording rows
//! and billing-plan state. Three calls, no retries; each call site decides
//! whether a failure is fatal to the pipeline.

pub mod client;
pub mod messages;

pub use client::HttpBackendNotifier;
pub use messages::PlanTier;

use crate::error::Result;
use async_trait::async_trait;

/// Lifecycle calls to the metadata backend.
#[async_trait]
pub trait BackendNotifier: Send + Sync {
    /// Announce that processing has started. The response carries the owner's
    /// plan tier, which gates the transcription stage.
    async fn processing_started(&self, user_id: &str, filename: &str) -> Result<PlanTier>;

    /// Post the transcript plus the generated title/summary content.
    async fn transcript_ready(
        &self,
        user_id: &str,
        filename: &str,
        content: &str,
        transcript: &str,
    ) -> Result<()>;

    /// Announce that processing finished and the recording is durable.
    async fn processing_complete(&self, user_id: &str, filename: &str) -> Result<()>;
}
