//! Cloud answer scoring: the remote half of the analysis engine.
//!
//! `AnswerAnalyzer` holds an `Option<Arc<dyn AnswerScorer>>`; with none configured every
//! answer goes straight to the heuristics.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::prompts::scoring_prompt;
use super::ScoreBreakdown;
use crate::llm_client::prompts::interviewer_system;
use crate::llm_client::{extract_json_object, strip_json_fences, LlmClient, LlmError};

const MAX_FEEDBACK_ITEMS: usize = 3;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Scoring response is missing '{0}'")]
    MissingField(&'static str),

    #[error("Scoring response has an invalid '{0}'")]
    InvalidField(&'static str),
}

/// A validated remote score, already clamped into range.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAnswer {
    pub score: u8,
    pub breakdown: Option<ScoreBreakdown>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[async_trait]
pub trait AnswerScorer: Send + Sync {
    async fn score(&self, question: &str, answer: &str) -> Result<ScoredAnswer, ScoringError>;
}

pub struct LlmAnswerScorer {
    llm: LlmClient,
}

impl LlmAnswerScorer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AnswerScorer for LlmAnswerScorer {
    async fn score(&self, question: &str, answer: &str) -> Result<ScoredAnswer, ScoringError> {
        let prompt = scoring_prompt(question, answer);
        let response = self.llm.call(&prompt, &interviewer_system()).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        let object =
            extract_json_object(strip_json_fences(text)).ok_or(LlmError::NoJson("object"))?;
        let value: Value = serde_json::from_str(object).map_err(LlmError::Parse)?;
        parse_score_response(&value)
    }
}

/// Validates a scoring reply. `score`, `strengths` and `improvements` are required; the
/// breakdown is optional. Scores are clamped and lists truncated rather than rejected.
pub fn parse_score_response(value: &Value) -> Result<ScoredAnswer, ScoringError> {
    let score = value
        .get("score")
        .ok_or(ScoringError::MissingField("score"))?
        .as_f64()
        .ok_or(ScoringError::InvalidField("score"))?;
    if !score.is_finite() {
        return Err(ScoringError::InvalidField("score"));
    }

    let strengths = string_list(value, "strengths")?;
    let improvements = string_list(value, "improvements")?;

    let breakdown = value.get("breakdown").and_then(|b| {
        Some(ScoreBreakdown {
            relevance: bounded(b.get("relevance")?.as_f64()?, 4),
            clarity: bounded(b.get("clarity")?.as_f64()?, 3),
            specificity: bounded(b.get("specificity")?.as_f64()?, 3),
        })
    });

    Ok(ScoredAnswer {
        score: bounded(score, 10),
        breakdown,
        strengths,
        improvements,
    })
}

fn bounded(value: f64, max: u8) -> u8 {
    value.round().clamp(0.0, f64::from(max)) as u8
}

fn string_list(value: &Value, field: &'static str) -> Result<Vec<String>, ScoringError> {
    let items = value
        .get(field)
        .ok_or(ScoringError::MissingField(field))?
        .as_array()
        .ok_or(ScoringError::InvalidField(field))?;

    Ok(items
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_FEEDBACK_ITEMS)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_response_parses() {
        let value = json!({
            "score": 8,
            "breakdown": {"relevance": 4, "clarity": 2, "specificity": 2},
            "strengths": ["Clear structure"],
            "improvements": ["Add numbers"]
        });
        let scored = parse_score_response(&value).unwrap();
        assert_eq!(scored.score, 8);
        assert_eq!(
            scored.breakdown,
            Some(ScoreBreakdown {
                relevance: 4,
                clarity: 2,
                specificity: 2
            })
        );
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let value = json!({
            "score": 14.6,
            "breakdown": {"relevance": 9, "clarity": -1, "specificity": 3},
            "strengths": ["a", "b", "c", "d", "e"],
            "improvements": []
        });
        let scored = parse_score_response(&value).unwrap();
        assert_eq!(scored.score, 10);
        let breakdown = scored.breakdown.unwrap();
        assert_eq!(breakdown.relevance, 4);
        assert_eq!(breakdown.clarity, 0);
        assert_eq!(scored.strengths.len(), 3);
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let err = parse_score_response(&json!({"strengths": [], "improvements": []})).unwrap_err();
        assert!(matches!(err, ScoringError::MissingField("score")));

        let err = parse_score_response(&json!({"score": 5, "improvements": []})).unwrap_err();
        assert!(matches!(err, ScoringError::MissingField("strengths")));

        let err = parse_score_response(&json!({"score": "high", "strengths": [], "improvements": []}))
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidField("score")));
    }

    #[test]
    fn test_partial_breakdown_is_dropped() {
        let value = json!({
            "score": 6,
            "breakdown": {"relevance": 3},
            "strengths": ["ok"],
            "improvements": ["more"]
        });
        assert_eq!(parse_score_response(&value).unwrap().breakdown, None);
    }
}
