use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use serde_json::Value;
use tracing::{debug, info};

use super::{DataKind, StoreError};

/// Object storage behind the remote tier of [`super::TieredStore`].
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the object's URI.
    async fn put_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError>;

    /// `Ok(None)` when the key does not exist.
    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    async fn put_json(&self, key: &str, value: &Value) -> Result<String, StoreError> {
        let body = serde_json::to_vec(value)?;
        self.put_bytes(key, body, "application/json").await
    }

    async fn get_json(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self.get_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

/// Thin wrapper over an S3 bucket holding session records under `sessions/<id>/`.
#[derive(Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Store {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn record_key(session_id: &str, kind: &DataKind) -> String {
        format!("sessions/{}/{}.json", session_id, kind.key())
    }

    pub fn blob_key(session_id: &str, name: &str) -> String {
        format!("sessions/{session_id}/{name}")
    }

    pub fn uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }

    pub async fn put_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StoreError::S3(format!("upload of {key} failed: {e}")))?;

        let uri = self.uri(key);
        info!("Uploaded {uri}");
        Ok(uri)
    }

    /// `Ok(None)` when the key does not exist.
    pub async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    debug!("S3 key {key} not found");
                    return Ok(None);
                }
                return Err(StoreError::S3(format!("download of {key} failed: {e}")));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::S3(format!("reading body of {key} failed: {e}")))?;
        Ok(Some(data.into_bytes().to_vec()))
    }

    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::S3(format!("delete of {key} failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        S3Store::put_bytes(self, key, bytes, content_type).await
    }

    async fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        S3Store::get_bytes(self, key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        S3Store::delete(self, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key_layout() {
        assert_eq!(
            S3Store::record_key("abc", &DataKind::Questions),
            "sessions/abc/questions.json"
        );
        assert_eq!(
            S3Store::record_key("abc", &DataKind::Analysis(4)),
            "sessions/abc/analysis_4.json"
        );
    }

    #[test]
    fn test_blob_key_layout() {
        assert_eq!(
            S3Store::blob_key("abc", "posture/p1.jpg"),
            "sessions/abc/posture/p1.jpg"
        );
    }
}
