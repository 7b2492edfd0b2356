// End-to-end tests for the HTTP ingestion surface
//
// A real server is bound on an ephemeral port with mocked outbound
// collaborators, and driven with a plain HTTP client: open a session, stream
// chunks, finalize, and watch the recording reach a terminal state.

use async_trait::async_trait;
use clipflow::{
    create_router, AppState, BackendNotifier, ChunkStore, Enricher, Enrichment, Error,
    ObjectStorage, PipelineOrchestrator, PlanTier, SessionRegistry,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct OkNotifier;

#[async_trait]
impl BackendNotifier for OkNotifier {
    async fn processing_started(
        &self,
        _user_id: &str,
        _filename: &str,
    ) -> clipflow::Result<PlanTier> {
        Ok(PlanTier::Free)
    }

    async fn transcript_ready(
        &self,
        _user_id: &str,
        _filename: &str,
        _content: &str,
        _transcript: &str,
    ) -> clipflow::Result<()> {
        Ok(())
    }

    async fn processing_complete(&self, _user_id: &str, _filename: &str) -> clipflow::Result<()> {
        Ok(())
    }
}

struct OkStorage;

#[async_trait]
impl ObjectStorage for OkStorage {
    async fn put(&self, _key: &str, _body: Vec<u8>, _content_type: &str) -> clipflow::Result<()> {
        Ok(())
    }
}

struct NoEnricher;

#[async_trait]
impl Enricher for NoEnricher {
    async fn enrich(&self, _filename: &str, _media: Vec<u8>) -> clipflow::Result<Enrichment> {
        Err(Error::Enrichment("not used in these tests".to_string()))
    }
}

async fn serve() -> (SocketAddr, TempDir) {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(ChunkStore::new(temp.path()).await.unwrap());
    let registry = Arc::new(SessionRegistry::new());

    let orchestrator = Arc::new(PipelineOrchestrator::new(
        Arc::clone(&store),
        Arc::new(OkStorage),
        Arc::new(OkNotifier),
        Arc::new(NoEnricher),
        Arc::clone(&registry),
    ));

    let state = AppState::new(registry, store, orchestrator);
    let router = create_router(state, &[], 1024 * 1024).expect("router construction failed");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, temp)
}

#[tokio::test]
async fn test_stream_and_finalize_over_http() {
    let (addr, _temp) = serve().await;
    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    // Health
    let resp = client.get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    // Open a session
    let resp = client
        .post(format!("{}/stream/connect", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Stream two chunks
    for (i, chunk) in [&b"AA"[..], &b"BB"[..]].iter().enumerate() {
        let resp = client
            .post(format!("{}/stream/{}/rec1.webm/chunks", base, session_id))
            .body(chunk.to_vec())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["sequence"], i as u64);
    }

    // Recording is now visible as RECEIVING with both fragments
    let resp = client
        .get(format!("{}/recordings/rec1.webm/status", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["state"], "RECEIVING");
    assert_eq!(body["fragments"], 2);
    assert_eq!(body["bytes"], 4);

    // Finalize and wait for the pipeline to finish
    let resp = client
        .post(format!("{}/stream/{}/rec1.webm/finalize", base, session_id))
        .json(&serde_json::json!({ "user_id": "u1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);

    let mut state = String::new();
    for _ in 0..200 {
        let resp = client
            .get(format!("{}/recordings/rec1.webm/status", base))
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = resp.json().await.unwrap();
        state = body["state"].as_str().unwrap().to_string();
        if state == "CLEANED_UP" || state == "FAILED" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(state, "CLEANED_UP");

    // Close the session
    let resp = client
        .delete(format!("{}/stream/{}", base, session_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_chunks_for_unknown_session_are_rejected() {
    let (addr, _temp) = serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!(
            "http://{}/stream/session-nope/rec1.webm/chunks",
            addr
        ))
        .body(b"AA".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_path_escaping_filenames_are_rejected() {
    let (addr, _temp) = serve().await;
    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let resp = client
        .post(format!("{}/stream/connect", base))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    let session_id = body["session_id"].as_str().unwrap().to_string();

    let resp = client
        .post(format!("{}/stream/{}/..%2F..%2Fetc/chunks", base, session_id))
        .body(b"AA".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_filenames_containing_dots_are_accepted() {
    let (addr, _temp) = serve().await;
    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let resp = client
        .post(format!("{}/stream/connect", base))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Consecutive dots inside a name are not a traversal form
    let resp = client
        .post(format!("{}/stream/{}/take..2.webm/chunks", base, session_id))
        .body(b"AA".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // A literal `..` component still is ("%2E%2E" decodes to "..")
    let resp = client
        .post(format!("{}/stream/{}/%2E%2E/chunks", base, session_id))
        .body(b"AA".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_unknown_recording_status_is_not_found() {
    let (addr, _temp) = serve().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("http://{}/recordings/nope.webm/status", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
