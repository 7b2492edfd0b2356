use serde::{Deserialize, Serialize};

/// Billing tier of the recording's owner, returned by the processing-start
/// call and immutable for the rest of the pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanTier {
    #[serde(rename = "FREE")]
    Free,
    #[serde(rename = "PRO")]
    Pro,
}

/// Body for processing-start and processing-complete calls
#[derive(Debug, Serialize)]
pub struct RecordingRef {
    pub filename: String,
}

/// Body for the transcript-ready call
#[derive(Debug, Serialize)]
pub struct TranscriptReady {
    pub filename: String,
    /// Generated title/summary, serialized as a JSON object string
    pub content: String,
    pub transcript: String,
}

/// Response of the processing-start call
#[derive(Debug, Deserialize)]
pub struct ProcessingStarted {
    pub plan: PlanTier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_tier_uses_backend_spelling() {
        let started: ProcessingStarted = serde_json::from_str(r#"{"plan":"PRO"}"#).unwrap();
        assert_eq!(started.plan, PlanTier::Pro);

        let started: ProcessingStarted = serde_json::from_str(r#"{"plan":"FREE"}"#).unwrap();
        assert_eq!(started.plan, PlanTier::Free);
    }
}
