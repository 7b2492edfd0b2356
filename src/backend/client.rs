use super::messages::{PlanTier, ProcessingStarted, RecordingRef, TranscriptReady};
use super::BackendNotifier;
use crate::error::{Error, Result};
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Reqwest-backed notifier for the metadata backend's REST API.
pub struct HttpBackendNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackendNotifier {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build backend HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, user_id: &str, action: &str) -> String {
        format!("{}/recording/{}/{}", self.base_url, user_id, action)
    }

    async fn post<B: serde::Serialize>(
        &self,
        call: &'static str,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::upstream_transport(call, e))?;

        if !resp.status().is_success() {
            return Err(Error::upstream_status(call, resp.status()));
        }

        Ok(resp)
    }
}

#[async_trait]
impl BackendNotifier for HttpBackendNotifier {
    async fn processing_started(&self, user_id: &str, filename: &str) -> Result<PlanTier> {
        let url = self.url(user_id, "processing");
        let body = RecordingRef {
            filename: filename.to_string(),
        };

        let resp = self.post("processing-start", &url, &body).await?;
        let started: ProcessingStarted = resp
            .json()
            .await
            .map_err(|e| Error::upstream_transport("processing-start", e))?;

        info!(
            "Backend acknowledged processing start for {} (plan: {:?})",
            filename, started.plan
        );

        Ok(started.plan)
    }

    async fn transcript_ready(
        &self,
        user_id: &str,
        filename: &str,
        content: &str,
        transcript: &str,
    ) -> Result<()> {
        let url = self.url(user_id, "transcribe");
        let body = TranscriptReady {
            filename: filename.to_string(),
            content: content.to_string(),
            transcript: transcript.to_string(),
        };

        self.post("transcript-ready", &url, &body).await?;

        info!("Backend accepted transcript for {}", filename);
        Ok(())
    }

    async fn processing_complete(&self, user_id: &str, filename: &str) -> Result<()> {
        let url = self.url(user_id, "complete");
        let body = RecordingRef {
            filename: filename.to_string(),
        };

        self.post("processing-complete", &url, &body).await?;

        info!("Backend acknowledged processing complete for {}", filename);
        Ok(())
    }
}
