use serde::Serialize;

/// Processing state of a single recording.
///
/// `Receiving` is entered on the first chunk; the finalize signal moves the
/// recording to `Uploading` and the pipeline advances it from there.
/// `CleanedUp` and `Failed` are terminal. The local buffer exists from
/// `Receiving` until cleanup, and is deliberately retained on every path
/// into `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingState {
    Receiving,
    Uploading,
    PlanCheck,
    Transcribing,
    NotifyingComplete,
    CleanedUp,
    Failed,
}

impl RecordingState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordingState::CleanedUp | RecordingState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_cleaned_up_and_failed_are_terminal() {
        assert!(RecordingState::CleanedUp.is_terminal());
        assert!(RecordingState::Failed.is_terminal());
        assert!(!RecordingState::Receiving.is_terminal());
        assert!(!RecordingState::Uploading.is_terminal());
        assert!(!RecordingState::PlanCheck.is_terminal());
        assert!(!RecordingState::Transcribing.is_terminal());
        assert!(!RecordingState::NotifyingComplete.is_terminal());
    }

    #[test]
    fn states_serialize_in_screaming_snake_case() {
        let json = serde_json::to_string(&RecordingState::NotifyingComplete).unwrap();
        assert_eq!(json, "\"NOTIFYING_COMPLETE\"");
    }
}
