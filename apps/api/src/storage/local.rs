use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};

use super::{validate_blob_name, validate_session_id, DataKind, StoreError};

/// Flat-file store rooted at the data directory.
///
/// Records live at `<root>/<kind>_<session_id>.json`; blobs under `<root>/blobs/<session_id>/`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, session_id: &str, kind: &DataKind) -> PathBuf {
        self.root.join(format!("{}_{}.json", kind.key(), session_id))
    }

    /// Pre-session paths written by older deployments, checked after the session-scoped file.
    pub fn legacy_paths(&self, kind: &DataKind) -> Vec<PathBuf> {
        let key = kind.key();
        vec![
            self.root.join(format!("extracted_{key}_text.json")),
            self.root.join(format!("structured_{key}.json")),
            self.root.join(format!("{key}.json")),
        ]
    }

    fn blob_path(&self, session_id: &str, name: &str) -> PathBuf {
        self.root.join("blobs").join(session_id).join(name)
    }

    pub async fn write(
        &self,
        session_id: &str,
        kind: &DataKind,
        value: &Value,
    ) -> Result<PathBuf, StoreError> {
        validate_session_id(session_id)?;
        fs::create_dir_all(&self.root).await?;
        let path = self.record_path(session_id, kind);
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(&path, bytes).await?;
        debug!("Saved {} for session {} to {}", kind, session_id, path.display());
        Ok(path)
    }

    /// Reads the session-scoped record, then the legacy paths.
    pub async fn read(&self, session_id: &str, kind: &DataKind) -> Option<Value> {
        if validate_session_id(session_id).is_err() {
            return None;
        }
        if let Some(value) = read_json(&self.record_path(session_id, kind)).await {
            return Some(value);
        }
        for path in self.legacy_paths(kind) {
            if let Some(value) = read_json(&path).await {
                debug!("Loaded {} from legacy path {}", kind, path.display());
                return Some(value);
            }
        }
        None
    }

    /// `Ok(false)` when there was nothing to remove. Legacy paths are never touched.
    pub async fn remove(&self, session_id: &str, kind: &DataKind) -> Result<bool, StoreError> {
        validate_session_id(session_id)?;
        match fs::remove_file(self.record_path(session_id, kind)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write_blob(
        &self,
        session_id: &str,
        name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StoreError> {
        validate_session_id(session_id)?;
        validate_blob_name(name)?;
        let path = self.blob_path(session_id, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        Ok(path)
    }

    pub async fn read_blob(&self, session_id: &str, name: &str) -> Option<Vec<u8>> {
        if validate_session_id(session_id).is_err() || validate_blob_name(name).is_err() {
            return None;
        }
        fs::read(self.blob_path(session_id, name)).await.ok()
    }

    /// Deletes session records and blob directories not modified within `max_age`.
    /// Legacy files (no session suffix) are left alone. Returns the number of entries removed.
    pub async fn purge_older_than(&self, max_age: Duration) -> Result<usize, StoreError> {
        let cutoff = match SystemTime::now().checked_sub(max_age) {
            Some(t) => t,
            None => return Ok(0),
        };
        let mut removed = 0;

        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let metadata = entry.metadata().await?;
            if !metadata.is_file() || !is_session_record(&path) {
                continue;
            }
            if metadata.modified()? < cutoff {
                fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        let blobs_root = self.root.join("blobs");
        if let Ok(mut sessions) = fs::read_dir(&blobs_root).await {
            while let Some(entry) = sessions.next_entry().await? {
                let metadata = entry.metadata().await?;
                if metadata.is_dir() && metadata.modified()? < cutoff {
                    fs::remove_dir_all(entry.path()).await?;
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            info!("Retention sweep removed {removed} expired session entries");
        }
        Ok(removed)
    }
}

async fn read_json(path: &Path) -> Option<Value> {
    let bytes = fs::read(path).await.ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse {}: {e}", path.display());
            None
        }
    }
}

/// Session records are `<kind>_<uuid>.json`; the suffix after the last `_` must look like an id.
fn is_session_record(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return false;
    }
    match stem.rsplit_once('_') {
        Some((_, suffix)) => suffix.len() >= 32 && suffix.chars().all(|c| c.is_ascii_hexdigit() || c == '-'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SID: &str = "0b8f9d5e-4a57-4d4e-9f3c-2f1f6f0d7a11";

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let path = store
            .write(SID, &DataKind::Resume, &json!({"text": "Rust"}))
            .await
            .unwrap();
        assert!(path.ends_with(format!("resume_{SID}.json")));
        let loaded = store.read(SID, &DataKind::Resume).await.unwrap();
        assert_eq!(loaded["text"], "Rust");
    }

    #[tokio::test]
    async fn test_read_falls_back_to_legacy_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        std::fs::write(
            dir.path().join("extracted_resume_text.json"),
            r#"{"text": "legacy resume"}"#,
        )
        .unwrap();
        let loaded = store.read(SID, &DataKind::Resume).await.unwrap();
        assert_eq!(loaded["text"], "legacy resume");
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert!(store.read(SID, &DataKind::Questions).await.is_none());
    }

    #[tokio::test]
    async fn test_blob_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store
            .write_blob(SID, "posture/p1.png", &[1, 2, 3])
            .await
            .unwrap();
        assert_eq!(store.read_blob(SID, "posture/p1.png").await, Some(vec![1, 2, 3]));
        assert_eq!(store.read_blob(SID, "posture/missing.png").await, None);
    }

    #[tokio::test]
    async fn test_purge_keeps_fresh_records_and_legacy_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store
            .write(SID, &DataKind::Session, &json!({"questions": []}))
            .await
            .unwrap();
        std::fs::write(dir.path().join("resume.json"), "{}").unwrap();

        let removed = store.purge_older_than(Duration::from_secs(3600)).await.unwrap();
        assert_eq!(removed, 0);

        let removed = store.purge_older_than(Duration::ZERO).await.unwrap();
        assert_eq!(removed, 1);
        assert!(dir.path().join("resume.json").exists());
    }

    #[tokio::test]
    async fn test_remove_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store
            .write(SID, &DataKind::Analysis(1), &json!({"score": 7}))
            .await
            .unwrap();

        assert!(store.remove(SID, &DataKind::Analysis(1)).await.unwrap());
        assert!(store.read(SID, &DataKind::Analysis(1)).await.is_none());
        assert!(!store.remove(SID, &DataKind::Analysis(1)).await.unwrap());
    }

    #[test]
    fn test_is_session_record() {
        assert!(is_session_record(Path::new(&format!("analysis_2_{SID}.json"))));
        assert!(!is_session_record(Path::new("extracted_resume_text.json")));
        assert!(!is_session_record(Path::new("resume.json")));
    }
}
