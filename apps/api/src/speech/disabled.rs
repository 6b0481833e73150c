use async_trait::async_trait;

use super::{
    AudioFormat, SpeechRecognizer, SpeechSynthesizer, Transcription, TranscriptionStatus,
    VoiceInfo,
};

/// Used when `ENABLE_SPEECH=false`: every question is text-only.
pub struct DisabledSynthesizer {
    default_voice: String,
}

impl DisabledSynthesizer {
    pub fn new(default_voice: impl Into<String>) -> Self {
        Self {
            default_voice: default_voice.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for DisabledSynthesizer {
    async fn speak(&self, _text: &str, _voice_id: &str) -> Option<String> {
        None
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    async fn interview_voice(&self) -> String {
        self.default_voice.clone()
    }
}

/// Used when speech is disabled or no S3 bucket is configured for Transcribe uploads.
pub struct DisabledRecognizer;

#[async_trait]
impl SpeechRecognizer for DisabledRecognizer {
    async fn transcribe(
        &self,
        _audio: Vec<u8>,
        _format: AudioFormat,
        _session_id: &str,
    ) -> Transcription {
        Transcription::failed(TranscriptionStatus::ServiceUnavailable)
    }
}
