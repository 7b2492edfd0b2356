use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub backend: BackendConfig,
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub bind: String,
    pub port: u16,
    /// Origins allowed to stream to this service; empty means any origin.
    pub allowed_origins: Vec<String>,
    /// Directory holding in-flight recording buffers.
    pub buffer_dir: String,
    /// Maximum accepted chunk body size in bytes.
    pub max_chunk_bytes: usize,
    /// Timeout applied to every outbound call.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// S3-compatible endpoint, e.g. "https://storage.example.com"
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    /// Static bearer token for S3-compatible gateways; omit for anonymous.
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the metadata backend, e.g. "https://api.example.com/"
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionConfig {
    pub api_base: String,
    pub api_key: String,
    pub transcription_model: String,
    pub completion_model: String,
}

impl Config {
    /// Load configuration from an optional file plus `CLIPFLOW_`-prefixed
    /// environment variables (e.g. `CLIPFLOW_SERVICE__PORT=5000`).
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.bind", "0.0.0.0")?
            .set_default("service.port", 5000_i64)?
            .set_default("service.allowed_origins", Vec::<String>::new())?
            .set_default("service.buffer_dir", "temp_upload")?
            .set_default("service.max_chunk_bytes", 16_i64 * 1024 * 1024)?
            .set_default("service.request_timeout_secs", 60_i64)?
            .set_default("storage.endpoint", "http://localhost:9000")?
            .set_default("storage.region", "us-east-1")?
            .set_default("storage.bucket", "recordings")?
            .set_default("backend.base_url", "http://localhost:3000/api/")?
            .set_default("transcription.api_base", "https://api.openai.com/v1")?
            .set_default("transcription.api_key", "")?
            .set_default("transcription.transcription_model", "whisper-1")?
            .set_default("transcription.completion_model", "gpt-3.5-turbo")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CLIPFLOW").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
