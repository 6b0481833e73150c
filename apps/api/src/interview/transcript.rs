//! Whole-transcript analysis: every turn through the engine, then aggregated.

use serde::{Deserialize, Serialize};

use crate::analysis::{AnswerAnalyzer, TurnAnalysis};
use crate::models::{Question, QuestionKind};

const MAX_MERGED_FEEDBACK: usize = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptTurn {
    #[serde(default)]
    pub question_id: Option<u32>,
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub question_id: u32,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub analysis: TurnAnalysis,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptReport {
    /// Mean over scored (non-introduction) turns; 0 when there are none.
    pub overall_score: f64,
    pub average_filler_percentage: f64,
    pub relevant_answers: usize,
    pub total_answers: usize,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub turns: Vec<TurnReport>,
}

pub async fn analyze_transcript(
    analyzer: &AnswerAnalyzer,
    turns: &[TranscriptTurn],
) -> TranscriptReport {
    let mut reports = Vec::with_capacity(turns.len());
    for (i, turn) in turns.iter().enumerate() {
        let id = turn.question_id.unwrap_or(i as u32 + 1);
        let question = Question::new(id, turn.question.clone(), turn.kind);
        let analysis = analyzer.analyze_turn(&question, &turn.answer).await;
        reports.push(TurnReport {
            question_id: id,
            question: turn.question.clone(),
            kind: turn.kind,
            analysis,
        });
    }
    aggregate(reports)
}

fn aggregate(turns: Vec<TurnReport>) -> TranscriptReport {
    let overall_score = mean(
        turns
            .iter()
            .filter(|t| t.kind.is_scored())
            .map(|t| f64::from(t.analysis.overall_score)),
    );
    let average_filler_percentage =
        mean(turns.iter().map(|t| t.analysis.delivery.filler_percentage));

    TranscriptReport {
        overall_score,
        average_filler_percentage,
        relevant_answers: turns.iter().filter(|t| t.analysis.is_relevant).count(),
        total_answers: turns.len(),
        strengths: merge(turns.iter().map(|t| t.analysis.strengths.as_slice())),
        improvements: merge(turns.iter().map(|t| t.analysis.improvements.as_slice())),
        turns,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        (sum / n as f64 * 10.0).round() / 10.0
    }
}

/// First-seen order, case-insensitive dedup, capped.
fn merge<'a>(lists: impl Iterator<Item = &'a [String]>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for item in lists.flatten() {
        if merged.len() == MAX_MERGED_FEEDBACK {
            break;
        }
        if !merged.iter().any(|m| m.eq_ignore_ascii_case(item)) {
            merged.push(item.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn turn(question: &str, answer: &str, kind: QuestionKind) -> TranscriptTurn {
        TranscriptTurn {
            question_id: None,
            question: question.to_string(),
            answer: answer.to_string(),
            kind,
        }
    }

    fn analyzer() -> AnswerAnalyzer {
        AnswerAnalyzer::new(None, 100, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_empty_transcript() {
        let report = analyze_transcript(&analyzer(), &[]).await;
        assert_eq!(report.total_answers, 0);
        assert_eq!(report.overall_score, 0.0);
        assert!(report.strengths.is_empty());
    }

    #[tokio::test]
    async fn test_introduction_is_not_averaged_and_gibberish_is_flagged() {
        let turns = vec![
            turn(
                "Tell me about yourself.",
                "I am a software engineer with 5 years experience building backend services",
                QuestionKind::Introduction,
            ),
            turn(
                "How do you design a database schema?",
                "asdkj qpwo",
                QuestionKind::Technical,
            ),
        ];
        let report = analyze_transcript(&analyzer(), &turns).await;

        assert_eq!(report.total_answers, 2);
        assert_eq!(report.relevant_answers, 1);
        assert_eq!(report.turns[1].question_id, 2);
        assert!(!report.turns[1].analysis.is_relevant);
        assert_eq!(
            report.overall_score,
            f64::from(report.turns[1].analysis.overall_score)
        );
        assert!(report.overall_score <= 3.0);
    }

    #[test]
    fn test_merge_dedups_and_caps() {
        let a = vec!["Clear".to_string(), "Specific".to_string()];
        let b = vec!["clear".to_string(), "Concise".to_string(), "Warm".to_string()];
        let merged = merge([a.as_slice(), b.as_slice()].into_iter());
        assert_eq!(merged, vec!["Clear", "Specific", "Concise"]);
    }
}
