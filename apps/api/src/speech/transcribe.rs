use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_transcribe::types::{LanguageCode, Media, MediaFormat, TranscriptionJobStatus};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{AudioFormat, SpeechError, SpeechRecognizer, Transcription, TranscriptionStatus};
use crate::storage::S3Store;

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const MAX_WAIT: Duration = Duration::from_secs(30);
/// Transcribe reports no usable utterance-level confidence; successful jobs get a fixed value.
const SUCCESS_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Deserialize)]
struct TranscriptDocument {
    results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
struct TranscriptResults {
    #[serde(default)]
    transcripts: Vec<TranscriptText>,
}

#[derive(Debug, Deserialize)]
struct TranscriptText {
    transcript: String,
}

enum JobOutcome {
    Completed(String),
    Failed(String),
    TimedOut,
}

/// Amazon Transcribe batch jobs over audio staged in S3.
pub struct TranscribeRecognizer {
    client: aws_sdk_transcribe::Client,
    staging: S3Store,
    http: reqwest::Client,
}

impl TranscribeRecognizer {
    pub fn new(client: aws_sdk_transcribe::Client, staging: S3Store) -> Self {
        Self {
            client,
            staging,
            http: reqwest::Client::new(),
        }
    }

    async fn run_job(
        &self,
        job_name: &str,
        media_uri: &str,
        format: AudioFormat,
    ) -> Result<JobOutcome, SpeechError> {
        self.client
            .start_transcription_job()
            .transcription_job_name(job_name)
            .media(Media::builder().media_file_uri(media_uri).build())
            .media_format(media_format(format))
            .language_code(LanguageCode::EnUs)
            .send()
            .await
            .map_err(|e| SpeechError::Recognition(e.to_string()))?;

        let mut waited = Duration::ZERO;
        while waited < MAX_WAIT {
            let output = self
                .client
                .get_transcription_job()
                .transcription_job_name(job_name)
                .send()
                .await
                .map_err(|e| SpeechError::Recognition(e.to_string()))?;

            if let Some(job) = output.transcription_job() {
                match job.transcription_job_status() {
                    Some(TranscriptionJobStatus::Completed) => {
                        let uri = job
                            .transcript()
                            .and_then(|t| t.transcript_file_uri())
                            .ok_or_else(|| {
                                SpeechError::Recognition("completed job has no transcript".into())
                            })?;
                        return Ok(JobOutcome::Completed(self.fetch_transcript(uri).await?));
                    }
                    Some(TranscriptionJobStatus::Failed) => {
                        let reason = job.failure_reason().unwrap_or("unknown").to_string();
                        return Ok(JobOutcome::Failed(reason));
                    }
                    _ => {}
                }
            }

            tokio::time::sleep(POLL_INTERVAL).await;
            waited += POLL_INTERVAL;
        }

        Ok(JobOutcome::TimedOut)
    }

    async fn fetch_transcript(&self, uri: &str) -> Result<String, SpeechError> {
        let document: TranscriptDocument = self
            .http
            .get(uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SpeechError::Recognition(e.to_string()))?
            .json()
            .await
            .map_err(|e| SpeechError::Recognition(e.to_string()))?;

        Ok(document
            .results
            .transcripts
            .first()
            .map(|t| t.transcript.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "No speech detected in audio.".to_string()))
    }

    async fn cleanup(&self, job_name: &str, key: &str) {
        if let Err(e) = self
            .client
            .delete_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
        {
            warn!("Failed to delete transcription job {job_name}: {e}");
        }
        if let Err(e) = self.staging.delete(key).await {
            warn!("Failed to delete staged audio {key}: {e}");
        }
    }
}

#[async_trait]
impl SpeechRecognizer for TranscribeRecognizer {
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        format: AudioFormat,
        session_id: &str,
    ) -> Transcription {
        let suffix = Uuid::new_v4().simple().to_string();
        let job_name = format!("interview-{session_id}-{}", &suffix[..8]);
        let key = format!("audio/{job_name}.{}", format.extension());

        let media_uri = match self.staging.put_bytes(&key, audio, format.content_type()).await {
            Ok(uri) => uri,
            Err(e) => {
                warn!("Audio upload for transcription failed: {e}");
                return Transcription::failed(TranscriptionStatus::UploadFailed);
            }
        };

        let outcome = self.run_job(&job_name, &media_uri, format).await;
        self.cleanup(&job_name, &key).await;

        match outcome {
            Ok(JobOutcome::Completed(text)) => {
                info!("Transcription job {job_name} completed ({} chars)", text.len());
                Transcription::success(text, SUCCESS_CONFIDENCE)
            }
            Ok(JobOutcome::Failed(reason)) => {
                error!("Transcription job {job_name} failed: {reason}");
                Transcription::failed(TranscriptionStatus::TranscriptionFailed)
            }
            Ok(JobOutcome::TimedOut) => {
                warn!("Transcription job {job_name} timed out");
                Transcription::failed(TranscriptionStatus::Timeout)
            }
            Err(e) => {
                error!("Transcription error: {e}");
                Transcription::failed(TranscriptionStatus::Error)
            }
        }
    }
}

fn media_format(format: AudioFormat) -> MediaFormat {
    match format {
        AudioFormat::Wav => MediaFormat::Wav,
        AudioFormat::Mp3 => MediaFormat::Mp3,
        AudioFormat::M4a => MediaFormat::Mp4,
        AudioFormat::Webm => MediaFormat::Webm,
    }
}
