//! # ri-storage-s3
//! rusty-illust/crates/ri-storage-s3/src/lib.rs
//! S3-compatible implementation of `BlobStore`.
//!
//! Content addressing gives us dedup for free: a PUT of identical bytes
//! under the same key is an idempotent overwrite, so neither the pipeline
//! nor this adapter needs an existence check before writing.

use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use ri_core::traits::BlobStore;

pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Builds a client from the ambient AWS environment. `S3_ENDPOINT`
    /// switches to a custom endpoint with path-style addressing, which is
    /// what MinIO-style deployments expect.
    pub async fn from_env(bucket: impl Into<String>) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .load()
            .await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Ok(endpoint) = std::env::var("S3_ENDPOINT") {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        Self::new(Client::from_conf(builder.build()), bucket)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<()> {
        let content_length = bytes.len() as i64;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(content_length)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .with_context(|| format!("s3 put of '{key}' ({content_length} bytes)"))?;
        log::debug!("stored {key} ({content_length} bytes) in {}", self.bucket);
        Ok(())
    }
}
