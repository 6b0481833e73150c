use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::prompts::{posture_prompt, POSTURE_SYSTEM};
use super::validation::ImageFormat;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{extract_json_object, strip_json_fences, ImageInput, LlmClient, LlmError};

const MAX_POSTURE_SCORE: u8 = 10;
const NEUTRAL_POSTURE_SCORE: u8 = 7;
const MAX_NOTES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureSource {
    Vision,
    Fallback,
}

/// Persisted under kind `posture_<photo_id>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureAssessment {
    pub posture_score: u8,
    pub observations: Vec<String>,
    pub recommendations: Vec<String>,
    pub source: PostureSource,
}

impl PostureAssessment {
    pub fn neutral() -> Self {
        Self {
            posture_score: NEUTRAL_POSTURE_SCORE,
            observations: vec!["Automatic posture analysis is not available right now".to_string()],
            recommendations: vec![
                "Sit upright with your shoulders relaxed".to_string(),
                "Keep the camera at eye level and your face well lit".to_string(),
                "Look at the camera when you speak".to_string(),
            ],
            source: PostureSource::Fallback,
        }
    }
}

#[async_trait]
pub trait PostureAnalyzer: Send + Sync {
    /// Never fails; degrades to [`PostureAssessment::neutral`].
    async fn analyze(&self, image: &[u8], format: ImageFormat) -> PostureAssessment;
}

/// Used when no LLM key is configured.
pub struct CannedPostureAnalyzer;

#[async_trait]
impl PostureAnalyzer for CannedPostureAnalyzer {
    async fn analyze(&self, _image: &[u8], _format: ImageFormat) -> PostureAssessment {
        PostureAssessment::neutral()
    }
}

pub struct LlmPostureAnalyzer {
    llm: LlmClient,
    timeout: Duration,
}

impl LlmPostureAnalyzer {
    pub fn new(llm: LlmClient, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    async fn ask(&self, image: &[u8], format: ImageFormat) -> Result<PostureAssessment, LlmError> {
        let data = STANDARD.encode(image);
        let system = format!("{POSTURE_SYSTEM} {JSON_ONLY_SYSTEM}");
        let response = self
            .llm
            .call_with_image(
                posture_prompt(),
                &system,
                ImageInput {
                    media_type: format.media_type(),
                    base64_data: &data,
                },
            )
            .await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        let object =
            extract_json_object(strip_json_fences(text)).ok_or(LlmError::NoJson("object"))?;
        let reply: VisionReply = serde_json::from_str(object)?;
        Ok(reply.into_assessment())
    }
}

#[async_trait]
impl PostureAnalyzer for LlmPostureAnalyzer {
    async fn analyze(&self, image: &[u8], format: ImageFormat) -> PostureAssessment {
        match tokio::time::timeout(self.timeout, self.ask(image, format)).await {
            Ok(Ok(assessment)) => assessment,
            Ok(Err(e)) => {
                warn!("Posture analysis failed, using neutral assessment: {e}");
                PostureAssessment::neutral()
            }
            Err(_) => {
                warn!("Posture analysis timed out, using neutral assessment");
                PostureAssessment::neutral()
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct VisionReply {
    posture_score: f64,
    #[serde(default)]
    observations: Vec<String>,
    #[serde(default)]
    recommendations: Vec<String>,
}

impl VisionReply {
    fn into_assessment(self) -> PostureAssessment {
        let score = if self.posture_score.is_finite() {
            self.posture_score.round().clamp(0.0, f64::from(MAX_POSTURE_SCORE)) as u8
        } else {
            NEUTRAL_POSTURE_SCORE
        };
        PostureAssessment {
            posture_score: score,
            observations: tidy(self.observations),
            recommendations: tidy(self.recommendations),
            source: PostureSource::Vision,
        }
    }
}

fn tidy(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_NOTES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_reply_is_clamped_and_trimmed() {
        let reply: VisionReply = serde_json::from_str(
            r#"{"posture_score": 14.2, "observations": [" Upright ", "", "a", "b", "c"]}"#,
        )
        .unwrap();
        let assessment = reply.into_assessment();
        assert_eq!(assessment.posture_score, 10);
        assert_eq!(assessment.observations, vec!["Upright", "a", "b"]);
        assert!(assessment.recommendations.is_empty());
        assert_eq!(assessment.source, PostureSource::Vision);
    }

    #[tokio::test]
    async fn test_canned_analyzer_is_neutral() {
        let assessment = CannedPostureAnalyzer.analyze(&[0xFF, 0xD8, 0xFF], ImageFormat::Jpeg).await;
        assert_eq!(assessment, PostureAssessment::neutral());
        assert_eq!(assessment.source, PostureSource::Fallback);
    }
}
