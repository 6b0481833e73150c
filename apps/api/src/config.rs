use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Every cloud collaborator is optional: without `S3_BUCKET` the session store runs on the
/// local data directory only, and without `ANTHROPIC_API_KEY` question generation, scoring,
/// follow-ups and posture analysis use their local fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub data_dir: PathBuf,
    pub s3_bucket: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: String,
    pub anthropic_api_key: Option<String>,
    pub analysis_timeout: Duration,
    pub analysis_cache_capacity: usize,
    pub session_retention: Duration,
    pub default_voice: String,
    pub enable_speech: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let analysis_timeout_ms: u64 = parse_env("ANALYSIS_TIMEOUT_MS", 3000)?;
        let retention_hours: u64 = parse_env("SESSION_RETENTION_HOURS", 168)?;

        Ok(Config {
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            data_dir: PathBuf::from(
                std::env::var("DATA_DIR").unwrap_or_else(|_| "extracted_files".to_string()),
            ),
            s3_bucket: optional_env("S3_BUCKET"),
            s3_endpoint: optional_env("S3_ENDPOINT"),
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-west-2".to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            analysis_timeout: Duration::from_millis(analysis_timeout_ms),
            analysis_cache_capacity: parse_env("ANALYSIS_CACHE_CAPACITY", 100)?,
            session_retention: Duration::from_secs(retention_hours * 3600),
            default_voice: std::env::var("DEFAULT_VOICE").unwrap_or_else(|_| "Joanna".to_string()),
            enable_speech: parse_env("ENABLE_SPEECH", true)?,
        })
    }
}

/// Returns `None` for unset or blank variables.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
