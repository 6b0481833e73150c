// Session Store: JSON blobs keyed by (session id, data kind).
// Durable primary (S3) with a local-directory fallback and legacy-path lookups.

pub mod local;
pub mod retention;
pub mod s3;
pub mod tiered;

use std::fmt;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use local::LocalStore;
pub use s3::{ObjectStore, S3Store};
pub use tiered::TieredStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Invalid session id '{0}'")]
    InvalidSessionId(String),
}

/// The kind of record stored for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataKind {
    Resume,
    JobDescription,
    ResumeSections,
    Questions,
    Session,
    Analysis(u32),
    QuestionAudio(u32),
    FinalReport,
    RawAnswers,
    Posture(String),
}

impl DataKind {
    /// Stable storage key fragment, shared by the local file name and the S3 key.
    pub fn key(&self) -> String {
        match self {
            DataKind::Resume => "resume".to_string(),
            DataKind::JobDescription => "jd".to_string(),
            DataKind::ResumeSections => "resume_sections".to_string(),
            DataKind::Questions => "questions".to_string(),
            DataKind::Session => "speech_session".to_string(),
            DataKind::Analysis(id) => format!("analysis_{id}"),
            DataKind::QuestionAudio(id) => format!("audio_{id}"),
            DataKind::FinalReport => "final_report".to_string(),
            DataKind::RawAnswers => "raw_answers".to_string(),
            DataKind::Posture(photo_id) => format!("posture_{photo_id}"),
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Persistence contract consumed by the interview core.
///
/// `load` never fails: a missing or unreadable record is an empty JSON object.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists `value` and returns a location identifier.
    async fn save(&self, session_id: &str, kind: &DataKind, value: &Value)
        -> Result<String, StoreError>;

    async fn load(&self, session_id: &str, kind: &DataKind) -> Value;

    /// Removes a record from every tier. Deleting a missing record is not an error.
    async fn delete(&self, session_id: &str, kind: &DataKind) -> Result<(), StoreError>;

    /// Persists a binary object (photos, audio) under `name` within the session.
    async fn save_blob(
        &self,
        session_id: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StoreError>;

    async fn load_blob(&self, session_id: &str, name: &str) -> Option<Vec<u8>>;
}

/// Session ids end up in file names and object keys, so only `[A-Za-z0-9_-]` is accepted.
pub fn validate_session_id(session_id: &str) -> Result<(), StoreError> {
    let valid = !session_id.is_empty()
        && session_id.len() <= 64
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidSessionId(session_id.to_string()))
    }
}

/// Blob names follow the same rule as session ids plus a single extension dot.
pub fn validate_blob_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name.len() <= 128
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
        && !name.starts_with('/');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidSessionId(name.to_string()))
    }
}

/// True for the "nothing found" value returned by [`SessionStore::load`].
pub fn is_empty_record(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Loads and deserializes a record. `Ok(None)` when nothing is stored.
pub async fn load_as<T: DeserializeOwned>(
    store: &dyn SessionStore,
    session_id: &str,
    kind: &DataKind,
) -> Result<Option<T>, StoreError> {
    let value = store.load(session_id, kind).await;
    if is_empty_record(&value) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

pub async fn save_as<T: Serialize + ?Sized>(
    store: &dyn SessionStore,
    session_id: &str,
    kind: &DataKind,
    value: &T,
) -> Result<String, StoreError> {
    let value = serde_json::to_value(value)?;
    store.save(session_id, kind, &value).await
}
