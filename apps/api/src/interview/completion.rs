//! One-shot interview completion.
//!
//! Scores a batch of externally tracked answers without touching the turn-by-turn session.
//! The policy is intentionally independent of the analysis engine and the two are not
//! reconciled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::text::{contains_any, tokenize};

pub const BASE_ANSWER_SCORE: u8 = 5;
pub const EMPTY_INTERVIEW_SCORE: f64 = 5.0;
const MAX_ANSWER_SCORE: u8 = 10;

const EXPERIENCE_KEYWORDS: &[&str] = &[
    "experience",
    "project",
    "team",
    "developed",
    "implemented",
    "managed",
    "led",
];

const OUTCOME_KEYWORDS: &[&str] = &[
    "result",
    "results",
    "outcome",
    "success",
    "successful",
    "achieved",
    "improved",
    "increased",
    "reduced",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSubmission {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerScore {
    pub question: String,
    pub score: u8,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordStats {
    pub total_words: usize,
    pub average_words: f64,
    pub shortest: usize,
    pub longest: usize,
}

/// Report persisted under `final_report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub session_id: String,
    pub overall_score: f64,
    pub answer_scores: Vec<AnswerScore>,
    pub word_stats: WordStats,
    pub duration_seconds: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

/// base 5, +1 over 50 words, +1 over 100 words, +1 for experience language,
/// +1 for outcome language, capped at 10.
pub fn score_submission(answer: &str) -> (u8, usize) {
    let tokens = tokenize(answer);
    let words = tokens.len();

    let mut score = BASE_ANSWER_SCORE;
    if words > 50 {
        score += 1;
    }
    if words > 100 {
        score += 1;
    }
    if contains_any(&tokens, EXPERIENCE_KEYWORDS) {
        score += 1;
    }
    if contains_any(&tokens, OUTCOME_KEYWORDS) {
        score += 1;
    }
    (score.min(MAX_ANSWER_SCORE), words)
}

pub fn build_report(
    session_id: &str,
    answers: &[AnswerSubmission],
    duration_seconds: f64,
) -> FinalReport {
    let answer_scores: Vec<AnswerScore> = answers
        .iter()
        .map(|a| {
            let (score, word_count) = score_submission(&a.answer);
            AnswerScore {
                question: a.question.clone(),
                score,
                word_count,
            }
        })
        .collect();

    let overall_score = if answer_scores.is_empty() {
        EMPTY_INTERVIEW_SCORE
    } else {
        let total: u32 = answer_scores.iter().map(|a| u32::from(a.score)).sum();
        round1(f64::from(total) / answer_scores.len() as f64)
    };

    let word_stats = word_stats(&answer_scores);
    let (strengths, improvements) = feedback(word_stats.average_words, overall_score, answers.len());

    FinalReport {
        session_id: session_id.to_string(),
        overall_score,
        answer_scores,
        word_stats,
        duration_seconds: duration_seconds.max(0.0),
        strengths,
        improvements,
        completed_at: Utc::now(),
    }
}

fn word_stats(scores: &[AnswerScore]) -> WordStats {
    let total_words: usize = scores.iter().map(|a| a.word_count).sum();
    let average_words = if scores.is_empty() {
        0.0
    } else {
        round1(total_words as f64 / scores.len() as f64)
    };
    WordStats {
        total_words,
        average_words,
        shortest: scores.iter().map(|a| a.word_count).min().unwrap_or(0),
        longest: scores.iter().map(|a| a.word_count).max().unwrap_or(0),
    }
}

fn feedback(average_words: f64, overall: f64, answered: usize) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut improvements = Vec::new();

    if average_words > 75.0 {
        strengths.push("Provided comprehensive responses".to_string());
    } else if average_words < 30.0 && answered > 0 {
        improvements.push("Expand your answers with more detail and examples".to_string());
    }

    if overall >= 7.0 {
        strengths.push("Demonstrated relevant experience and results".to_string());
    } else if overall < 6.0 {
        improvements.push("Focus on demonstrating specific skills and achievements".to_string());
    }

    if strengths.is_empty() {
        strengths.push("Completed the interview".to_string());
    }
    if improvements.is_empty() {
        improvements.push("Quantify the impact of your work where you can".to_string());
    }
    (strengths, improvements)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(answer: &str) -> AnswerSubmission {
        AnswerSubmission {
            question: "Q".to_string(),
            answer: answer.to_string(),
        }
    }

    #[test]
    fn test_empty_interview_scores_baseline() {
        let report = build_report("s1", &[], 0.0);
        assert_eq!(report.overall_score, 5.0);
        assert!(report.answer_scores.is_empty());
        assert!(!report.strengths.is_empty());
        assert!(!report.improvements.is_empty());
    }

    #[test]
    fn test_keyword_bonuses() {
        assert_eq!(score_submission("I fixed it").0, 5);
        assert_eq!(score_submission("My team shipped it").0, 6);
        assert_eq!(score_submission("The project was a success").0, 7);
    }

    #[test]
    fn test_length_bonuses_and_cap() {
        let long = format!("{} project success", "word ".repeat(120));
        let (score, words) = score_submission(&long);
        assert_eq!(words, 122);
        assert_eq!(score, 9);
    }

    #[test]
    fn test_long_answers_earn_comprehensive_strength() {
        let answer = format!("{} project", "detail ".repeat(80));
        let report = build_report("s1", &[submission(&answer)], 300.0);
        assert!(report
            .strengths
            .contains(&"Provided comprehensive responses".to_string()));
        assert_eq!(report.word_stats.longest, 81);
    }

    #[test]
    fn test_low_scores_get_focus_improvement() {
        let report = build_report("s1", &[submission("Not much to say"), submission("No")], 60.0);
        assert_eq!(report.overall_score, 5.0);
        assert!(report
            .improvements
            .contains(&"Focus on demonstrating specific skills and achievements".to_string()));
        assert_eq!(report.strengths, vec!["Completed the interview".to_string()]);
    }
}
