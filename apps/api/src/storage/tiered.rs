use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use super::s3::{ObjectStore, S3Store};
use super::{local::LocalStore, validate_blob_name, validate_session_id};
use super::{DataKind, SessionStore, StoreError};

/// Local directory first on write, S3 first on read.
///
/// Writes always land locally; the S3 copy is a best-effort backup. Reads prefer S3 so a
/// restarted instance sees records written elsewhere, then fall back to the local file and
/// finally the legacy paths.
///
/// A remote copy must never be older than the local one: when a backup put fails the remote
/// key is deleted, and if that fails too the save is reported as failed.
#[derive(Clone)]
pub struct TieredStore {
    local: LocalStore,
    remote: Option<Arc<dyn ObjectStore>>,
}

impl TieredStore {
    pub fn new(local: LocalStore, remote: Option<Arc<dyn ObjectStore>>) -> Self {
        Self { local, remote }
    }

    pub fn local_only(local: LocalStore) -> Self {
        Self::new(local, None)
    }
}

#[async_trait]
impl SessionStore for TieredStore {
    async fn save(
        &self,
        session_id: &str,
        kind: &DataKind,
        value: &Value,
    ) -> Result<String, StoreError> {
        let path = self.local.write(session_id, kind, value).await?;

        if let Some(remote) = &self.remote {
            let key = S3Store::record_key(session_id, kind);
            if let Err(e) = remote.put_json(&key, value).await {
                warn!("S3 backup of {kind} for session {session_id} failed: {e}");
                remote.delete(&key).await.map_err(|de| {
                    StoreError::S3(format!(
                        "stale remote copy of {kind} for session {session_id} left behind: {de}"
                    ))
                })?;
            }
        }

        Ok(path.display().to_string())
    }

    async fn delete(&self, session_id: &str, kind: &DataKind) -> Result<(), StoreError> {
        self.local.remove(session_id, kind).await?;
        if let Some(remote) = &self.remote {
            remote.delete(&S3Store::record_key(session_id, kind)).await?;
        }
        Ok(())
    }

    async fn load(&self, session_id: &str, kind: &DataKind) -> Value {
        if validate_session_id(session_id).is_err() {
            return json!({});
        }

        if let Some(remote) = &self.remote {
            match remote.get_json(&S3Store::record_key(session_id, kind)).await {
                Ok(Some(value)) => return value,
                Ok(None) => {}
                Err(e) => warn!("S3 load of {kind} for session {session_id} failed: {e}"),
            }
        }

        self.local
            .read(session_id, kind)
            .await
            .unwrap_or_else(|| json!({}))
    }

    async fn save_blob(
        &self,
        session_id: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError> {
        validate_session_id(session_id)?;
        validate_blob_name(name)?;

        let path = self.local.write_blob(session_id, name, &bytes).await?;

        if let Some(remote) = &self.remote {
            let key = S3Store::blob_key(session_id, name);
            match remote.put_bytes(&key, bytes, content_type).await {
                Ok(uri) => return Ok(uri),
                Err(e) => warn!("S3 upload of blob {name} for session {session_id} failed: {e}"),
            }
        }

        Ok(path.display().to_string())
    }

    async fn load_blob(&self, session_id: &str, name: &str) -> Option<Vec<u8>> {
        if validate_session_id(session_id).is_err() || validate_blob_name(name).is_err() {
            return None;
        }

        if let Some(remote) = &self.remote {
            match remote.get_bytes(&S3Store::blob_key(session_id, name)).await {
                Ok(Some(bytes)) => return Some(bytes),
                Ok(None) => {}
                Err(e) => warn!("S3 load of blob {name} for session {session_id} failed: {e}"),
            }
        }

        self.local.read_blob(session_id, name).await
    }
}
