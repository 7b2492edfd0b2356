use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Snapshot of a connection session for status reporting
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub connected_at: DateTime<Utc>,
    pub filenames: Vec<String>,
}

#[derive(Debug)]
struct SessionEntry {
    connected_at: DateTime<Utc>,
    filenames: HashSet<String>,
}

/// Process-wide registry of live connection sessions.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection and return its session id.
    pub async fn connect(&self) -> String {
        let session_id = format!("session-{}", uuid::Uuid::new_v4());

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session_id.clone(),
            SessionEntry {
                connected_at: Utc::now(),
                filenames: HashSet::new(),
            },
        );

        info!("Session connected: {}", session_id);
        session_id
    }

    /// Record that `filename` is being streamed over `session_id`.
    /// Returns false if the session is unknown.
    pub async fn track(&self, session_id: &str, filename: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(entry) => {
                entry.filenames.insert(filename.to_string());
                true
            }
            None => false,
        }
    }

    /// Drop a filename from every session that tracks it. Called when its
    /// pipeline reaches a terminal state.
    pub async fn untrack(&self, filename: &str) {
        let mut sessions = self.sessions.write().await;
        for entry in sessions.values_mut() {
            entry.filenames.remove(filename);
        }
    }

    /// Tear down session bookkeeping. Recordings still in flight keep their
    /// pipelines running; only the session entry is removed.
    pub async fn disconnect(&self, session_id: &str) -> Option<usize> {
        let mut sessions = self.sessions.write().await;
        match sessions.remove(session_id) {
            Some(entry) => {
                let in_flight = entry.filenames.len();
                if in_flight > 0 {
                    info!(
                        "Session {} disconnected with {} recording(s) in flight; pipelines continue",
                        session_id, in_flight
                    );
                } else {
                    info!("Session disconnected: {}", session_id);
                }
                Some(in_flight)
            }
            None => {
                warn!("Disconnect for unknown session: {}", session_id);
                None
            }
        }
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions.contains_key(session_id)
    }

    /// Snapshot of a session for the status endpoint.
    pub async fn info(&self, session_id: &str) -> Option<SessionInfo> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(|entry| {
            let mut filenames: Vec<String> = entry.filenames.iter().cloned().collect();
            filenames.sort();
            SessionInfo {
                session_id: session_id.to_string(),
                connected_at: entry.connected_at,
                filenames,
            }
        })
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
