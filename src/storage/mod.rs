//! Object storage upload
//!
//! The storage client proper is an external collaborator; this module holds
//! the trait the pipeline uploads through and a reqwest implementation for
//! S3-compatible endpoints that accept a static bearer token (request
//! signing belongs to the gateway, not this service).

use crate::config::StorageConfig;
use crate::error::{Error, Result};
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Destination for finished recordings.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `body` under `key` with the given content type.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

/// `PUT {endpoint}/{bucket}/{key}` against an S3-compatible gateway.
pub struct S3CompatibleStorage {
    client: reqwest::Client,
    endpoint: String,
    region: String,
    bucket: String,
    access_token: Option<String>,
}

impl S3CompatibleStorage {
    pub fn new(config: &StorageConfig, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build object storage HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            region: config.region.clone(),
            bucket: config.bucket.clone(),
            access_token: config.access_token.clone(),
        })
    }
}

#[async_trait]
impl ObjectStorage for S3CompatibleStorage {
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);
        let bytes = body.len();

        let mut request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-amz-region", &self.region)
            .body(body);

        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::upstream_transport("storage-put", e))?;

        if !resp.status().is_success() {
            return Err(Error::upstream_status("storage-put", resp.status()));
        }

        info!(
            "Uploaded {} to bucket {} ({} bytes)",
            key, self.bucket, bytes
        );

        Ok(())
    }
}
