use anyhow::Result;
use clap::Parser;
use clipflow::{
    create_router, AppState, ChunkStore, Config, HttpBackendNotifier, OpenAiEnricher,
    PipelineOrchestrator, S3CompatibleStorage, SessionRegistry,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "clipflow", about = "Recording ingestion and processing service")]
struct Args {
    /// Config file base name (without extension)
    #[arg(long, default_value = "config/clipflow")]
    config: String,

    /// Override the listening port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if let Some(port) = args.port {
        cfg.service.port = port;
    }

    info!("clipflow v0.1.0");
    info!("Buffer directory: {}", cfg.service.buffer_dir);
    info!("Backend: {}", cfg.backend.base_url);
    info!(
        "Object storage: {} (bucket: {})",
        cfg.storage.endpoint, cfg.storage.bucket
    );

    let timeout = Duration::from_secs(cfg.service.request_timeout_secs);

    let store = Arc::new(ChunkStore::new(&cfg.service.buffer_dir).await?);
    let registry = Arc::new(SessionRegistry::new());
    let notifier = Arc::new(HttpBackendNotifier::new(&cfg.backend.base_url, timeout)?);
    let storage = Arc::new(S3CompatibleStorage::new(&cfg.storage, timeout)?);
    let enricher = Arc::new(OpenAiEnricher::new(&cfg.transcription, timeout)?);

    let orchestrator = Arc::new(PipelineOrchestrator::new(
        Arc::clone(&store),
        storage,
        notifier,
        enricher,
        Arc::clone(&registry),
    ));

    let state = AppState::new(registry, store, orchestrator);
    let router = create_router(
        state,
        &cfg.service.allowed_origins,
        cfg.service.max_chunk_bytes,
    )?;

    let addr = format!("{}:{}", cfg.service.bind, cfg.service.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server is running on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
