//! Artifact persistence for captured screenshots.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::infrastructure::BoxError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to upload artifact '{key}': {source}")]
    Upload {
        key: String,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    pub fn upload(key: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Upload {
            key: key.into(),
            source: source.into(),
        }
    }
}

/// Write-only artifact store; returns the storage locator of the object.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put_png(&self, key: &str, bytes: Vec<u8>) -> Result<String, StoreError>;
}

/// Generate a fresh artifact key under the worker prefix.
pub fn artifact_key(prefix: &str) -> String {
    format!(
        "{}/{}/{}.png",
        prefix.trim_matches('/'),
        Utc::now().format("%Y%m%d"),
        Uuid::new_v4()
    )
}

pub struct S3ArtifactStore {
    client: Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(sdk_config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn put_png(&self, key: &str, bytes: Vec<u8>) -> Result<String, StoreError> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("image/png")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|source| StoreError::upload(key, source))?;

        info!(bucket = %self.bucket, key, size, "artifact uploaded");
        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_key_has_prefix_date_and_png_suffix() {
        let key = artifact_key("digital-worker/screens");
        let mut parts = key.splitn(3, '/');
        assert_eq!(parts.next(), Some("digital-worker"));
        assert_eq!(parts.next(), Some("screens"));

        let tail = parts.next().expect("date and file segments");
        let (date, file) = tail.split_once('/').expect("date separator");
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));
        assert!(file.ends_with(".png"));
    }

    #[test]
    fn artifact_key_normalizes_prefix_slashes() {
        let key = artifact_key("/screens/");
        assert!(key.starts_with("screens/"));
        assert!(!key.contains("//"));
    }
}
