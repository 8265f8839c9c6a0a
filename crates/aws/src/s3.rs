//! Roster objects in S3.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use tracing::debug;

use lab_access_core::error::{LabAccessError, Result};
use lab_access_core::services::ObjectStore;

#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::from_client(Client::new(sdk_config))
    }

    /// Create from a pre-built client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                LabAccessError::Storage(format!(
                    "GetObject s3://{bucket}/{key} failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| {
                LabAccessError::Storage(format!("reading s3://{bucket}/{key} failed: {e}"))
            })?
            .into_bytes();

        debug!(bucket, key, size = bytes.len(), "object fetched");
        Ok(bytes.to_vec())
    }
}
