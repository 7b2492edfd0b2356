//! Transcription and summary enrichment
//!
//! Wraps the external speech-to-text and completion services behind a single
//! `enrich` operation: audio bytes in, `{transcript, title, summary}` out.
//! Both sub-calls and the completion-output parse are validated here; a
//! malformed completion is an `EnrichmentError`, never silently passed
//! upstream.

use crate::config::TranscriptionConfig;
use crate::error::{Error, Result};
use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Result of enriching a recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub transcript: String,
    pub title: String,
    pub summary: String,
}

/// Speech-to-text plus title/summary generation.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, filename: &str, media: Vec<u8>) -> Result<Enrichment>;
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TitleSummary {
    title: String,
    summary: String,
}

/// Parse the completion output, which must be exactly a two-field
/// `{title, summary}` JSON object.
fn parse_title_summary(content: &str) -> Result<TitleSummary> {
    serde_json::from_str(content)
        .map_err(|e| Error::Enrichment(format!("completion output is not {{title, summary}}: {e}")))
}

/// OpenAI-style enricher: multipart transcription call followed by a
/// JSON-mode chat completion.
pub struct OpenAiEnricher {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    transcription_model: String,
    completion_model: String,
}

impl OpenAiEnricher {
    pub fn new(config: &TranscriptionConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build transcription HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            transcription_model: config.transcription_model.clone(),
            completion_model: config.completion_model.clone(),
        })
    }

    async fn transcribe(&self, filename: &str, media: Vec<u8>) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(media)
            .file_name(filename.to_string())
            .mime_str("video/webm")
            .map_err(|e| Error::Enrichment(format!("invalid media part: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.transcription_model.clone())
            .text("response_format", "text")
            .part("file", part);

        let url = format!("{}/audio/transcriptions", self.api_base);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Enrichment(format!("transcription call failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::Enrichment(format!(
                "transcription call returned status {}",
                resp.status()
            )));
        }

        resp.text()
            .await
            .map_err(|e| Error::Enrichment(format!("transcription body unreadable: {e}")))
    }

    async fn summarize(&self, transcript: &str) -> Result<TitleSummary> {
        let prompt = format!(
            "You are going to generate a title and a nice description using the \
             speech to text transcription provided: transcription: {transcript} \
             and then return it in JSON format as {{\"title\": <title>, \"summary\": <summary>}}"
        );

        let body = serde_json::json!({
            "model": self.completion_model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": prompt }
            ]
        });

        let url = format!("{}/chat/completions", self.api_base);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Enrichment(format!("completion call failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(Error::Enrichment(format!(
                "completion call returned status {}",
                resp.status()
            )));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| Error::Enrichment(format!("completion body unreadable: {e}")))?;

        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| Error::Enrichment("completion returned no choices".to_string()))?;

        parse_title_summary(content)
    }
}

#[async_trait]
impl Enricher for OpenAiEnricher {
    async fn enrich(&self, filename: &str, media: Vec<u8>) -> Result<Enrichment> {
        info!("Transcribing {}", filename);
        let transcript = self.transcribe(filename, media).await?;

        info!("Generating title and summary for {}", filename);
        let generated = self.summarize(&transcript).await?;

        Ok(Enrichment {
            transcript,
            title: generated.title,
            summary: generated.summary,
        })
    }
}
