//! Speech adapters: text-to-speech for questions and speech-to-text for answers.
//!
//! `AppState` carries `Arc<dyn SpeechSynthesizer>` and `Arc<dyn SpeechRecognizer>`.
//! Both contracts absorb upstream failures: synthesis yields `None`, recognition yields a
//! [`Transcription`] with a non-success status and a user-facing message.

pub mod disabled;
pub mod handlers;
pub mod polly;
pub mod transcribe;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use disabled::{DisabledRecognizer, DisabledSynthesizer};
pub use polly::PollySynthesizer;
pub use transcribe::TranscribeRecognizer;

pub const PREFERRED_VOICES: [&str; 4] = ["Joanna", "Matthew", "Amy", "Brian"];
pub const MIN_AUDIO_BYTES: usize = 1000;
pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Speech recognition failed: {0}")]
    Recognition(String),

    #[error("Nothing to synthesize")]
    EmptyText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    pub gender: String,
    pub language: String,
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Base64-encoded MP3, or `None` on any failure.
    async fn speak(&self, text: &str, voice_id: &str) -> Option<String>;

    /// English neural voices available to the synthesizer.
    async fn voices(&self) -> Vec<VoiceInfo>;

    /// The voice used for interview questions.
    async fn interview_voice(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Mp3,
    M4a,
    Webm,
}

impl AudioFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "wav" => Some(AudioFormat::Wav),
            "mp3" => Some(AudioFormat::Mp3),
            "m4a" => Some(AudioFormat::M4a),
            "webm" => Some(AudioFormat::Webm),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Webm => "webm",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::M4a => "audio/mp4",
            AudioFormat::Webm => "audio/webm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionStatus {
    Success,
    ShortAudio,
    FileTooLarge,
    InvalidFormat,
    ServiceUnavailable,
    UploadFailed,
    TranscriptionFailed,
    Timeout,
    Error,
}

impl TranscriptionStatus {
    /// Text shown to the candidate in place of a transcript.
    pub fn user_message(&self) -> &'static str {
        match self {
            TranscriptionStatus::Success => "",
            TranscriptionStatus::ShortAudio => {
                "Audio recording too short. Please record for at least 2 seconds or type your answer."
            }
            TranscriptionStatus::FileTooLarge => {
                "Audio file too large. Please keep recordings under 10MB or type your answer."
            }
            TranscriptionStatus::InvalidFormat => {
                "Please upload a valid audio file (WAV, MP3, M4A, WebM)."
            }
            TranscriptionStatus::ServiceUnavailable => {
                "Speech-to-text service unavailable. Please type your answer."
            }
            TranscriptionStatus::UploadFailed => "Audio upload failed. Please type your answer.",
            TranscriptionStatus::TranscriptionFailed => {
                "Audio transcription failed. Please type your answer."
            }
            TranscriptionStatus::Timeout => "Audio processing timed out. Please type your answer.",
            TranscriptionStatus::Error => "Audio processing error. Please type your answer.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub transcription: String,
    pub confidence: f64,
    pub status: TranscriptionStatus,
}

impl Transcription {
    pub fn success(text: String, confidence: f64) -> Self {
        Self {
            transcription: text,
            confidence,
            status: TranscriptionStatus::Success,
        }
    }

    pub fn failed(status: TranscriptionStatus) -> Self {
        Self {
            transcription: status.user_message().to_string(),
            confidence: 0.0,
            status,
        }
    }
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, format: AudioFormat, session_id: &str)
        -> Transcription;
}

/// Rejects uploads before they reach the recognizer: unknown extension, too short, too large.
pub fn screen_audio_upload(filename: &str, size: usize) -> Result<AudioFormat, Transcription> {
    let format = AudioFormat::from_filename(filename)
        .ok_or_else(|| Transcription::failed(TranscriptionStatus::InvalidFormat))?;
    if size < MIN_AUDIO_BYTES {
        return Err(Transcription::failed(TranscriptionStatus::ShortAudio));
    }
    if size > MAX_AUDIO_BYTES {
        return Err(Transcription::failed(TranscriptionStatus::FileTooLarge));
    }
    Ok(format)
}

/// First preferred voice that is available, else the first available voice, else `default`.
pub fn pick_interview_voice(available: &[VoiceInfo], default: &str) -> String {
    PREFERRED_VOICES
        .iter()
        .find(|p| available.iter().any(|v| v.id == **p))
        .map(|p| p.to_string())
        .or_else(|| available.first().map(|v| v.id.clone()))
        .unwrap_or_else(|| default.to_string())
}

/// Quotes trip up the neural engine's prosody; drop them.
pub fn clean_text_for_speech(text: &str) -> String {
    text.trim().replace(['"', '\''], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str) -> VoiceInfo {
        VoiceInfo {
            id: id.to_string(),
            name: id.to_string(),
            gender: "Female".to_string(),
            language: "en-US".to_string(),
        }
    }

    #[test]
    fn test_screen_rejects_unknown_extension() {
        let err = screen_audio_upload("answer.ogg", 5000).unwrap_err();
        assert_eq!(err.status, TranscriptionStatus::InvalidFormat);
        assert_eq!(err.confidence, 0.0);
    }

    #[test]
    fn test_screen_size_limits() {
        assert_eq!(
            screen_audio_upload("a.wav", 999).unwrap_err().status,
            TranscriptionStatus::ShortAudio
        );
        assert_eq!(
            screen_audio_upload("a.WEBM", MAX_AUDIO_BYTES + 1).unwrap_err().status,
            TranscriptionStatus::FileTooLarge
        );
        assert_eq!(screen_audio_upload("a.m4a", 1000).unwrap(), AudioFormat::M4a);
    }

    #[test]
    fn test_pick_interview_voice_order() {
        let voices = vec![voice("Ruth"), voice("Matthew"), voice("Amy")];
        assert_eq!(pick_interview_voice(&voices, "Joanna"), "Matthew");
        assert_eq!(pick_interview_voice(&[voice("Ruth")], "Joanna"), "Ruth");
        assert_eq!(pick_interview_voice(&[], "Joanna"), "Joanna");
    }

    #[test]
    fn test_clean_text_strips_quotes() {
        assert_eq!(
            clean_text_for_speech("  What's your \"favourite\" project? "),
            "Whats your favourite project?"
        );
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let value = serde_json::to_value(Transcription::failed(TranscriptionStatus::FileTooLarge))
            .unwrap();
        assert_eq!(value["status"], "file_too_large");
    }
}
