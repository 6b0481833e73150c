use async_trait::async_trait;
use aws_sdk_polly::types::{Engine, OutputFormat, VoiceId};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::{
    clean_text_for_speech, pick_interview_voice, SpeechError, SpeechSynthesizer, VoiceInfo,
};

/// Amazon Polly, neural engine, MP3 output.
pub struct PollySynthesizer {
    client: aws_sdk_polly::Client,
    default_voice: String,
    interview_voice: OnceCell<String>,
}

impl PollySynthesizer {
    pub fn new(client: aws_sdk_polly::Client, default_voice: impl Into<String>) -> Self {
        Self {
            client,
            default_voice: default_voice.into(),
            interview_voice: OnceCell::new(),
        }
    }

    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, SpeechError> {
        let clean = clean_text_for_speech(text);
        if clean.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let output = self
            .client
            .synthesize_speech()
            .text(clean)
            .output_format(OutputFormat::Mp3)
            .voice_id(VoiceId::from(voice_id))
            .engine(Engine::Neural)
            .send()
            .await
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;

        let audio = output
            .audio_stream
            .collect()
            .await
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        Ok(audio.into_bytes().to_vec())
    }

    async fn describe_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        let output = self
            .client
            .describe_voices()
            .engine(Engine::Neural)
            .send()
            .await
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;

        Ok(output
            .voices()
            .iter()
            .filter_map(|v| {
                let language = v.language_code()?.as_str().to_string();
                if !language.starts_with("en") {
                    return None;
                }
                Some(VoiceInfo {
                    id: v.id()?.as_str().to_string(),
                    name: v.name().unwrap_or_default().to_string(),
                    gender: v.gender().map(|g| g.as_str().to_string()).unwrap_or_default(),
                    language,
                })
            })
            .collect())
    }
}

#[async_trait]
impl SpeechSynthesizer for PollySynthesizer {
    async fn speak(&self, text: &str, voice_id: &str) -> Option<String> {
        match self.synthesize(text, voice_id).await {
            Ok(bytes) => {
                info!(
                    "Synthesized {} bytes of speech with voice {voice_id}",
                    bytes.len()
                );
                Some(STANDARD.encode(bytes))
            }
            Err(e) => {
                warn!("Polly synthesis failed: {e}");
                None
            }
        }
    }

    async fn voices(&self) -> Vec<VoiceInfo> {
        self.describe_voices().await.unwrap_or_else(|e| {
            warn!("Failed to list Polly voices: {e}");
            Vec::new()
        })
    }

    async fn interview_voice(&self) -> String {
        self.interview_voice
            .get_or_init(|| async {
                let voices = self.voices().await;
                let voice = pick_interview_voice(&voices, &self.default_voice);
                info!("Using interview voice '{voice}'");
                voice
            })
            .await
            .clone()
    }
}
