use serde::{Deserialize, Serialize};

use super::heuristics::FILLER_WORDS;
use super::text::{count_phrases, tokenize};
use crate::models::QuestionKind;

const MIN_DELIVERY_SCORE: u8 = 6;
const MAX_DELIVERY_SCORE: u8 = 10;
/// Word-count bands; each one reached adds a point.
const INTRODUCTION_BANDS: [usize; 3] = [10, 20, 35];
const STANDARD_BANDS: [usize; 3] = [25, 50, 80];
const LOW_FILLER_PERCENT: f64 = 5.0;

/// Speech delivery estimate. Feeds the communication sub-score, never the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAssessment {
    pub score: u8,
    pub word_count: usize,
    pub filler_count: usize,
    pub filler_percentage: f64,
}

pub fn assess_delivery(answer: &str, kind: QuestionKind) -> DeliveryAssessment {
    let tokens = tokenize(answer);
    let word_count = tokens.len();
    let filler_count = count_phrases(&tokens, FILLER_WORDS);
    let filler_percentage = if word_count == 0 {
        0.0
    } else {
        (filler_count as f64 / word_count as f64 * 1000.0).round() / 10.0
    };

    let bands = if kind == QuestionKind::Introduction {
        &INTRODUCTION_BANDS
    } else {
        &STANDARD_BANDS
    };

    let mut score = MIN_DELIVERY_SCORE;
    score += bands.iter().filter(|&&b| word_count >= b).count() as u8;
    if word_count > 0 && filler_percentage < LOW_FILLER_PERCENT {
        score += 1;
    }

    DeliveryAssessment {
        score: score.clamp(MIN_DELIVERY_SCORE, MAX_DELIVERY_SCORE),
        word_count,
        filler_count,
        filler_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["engineering"; n].join(" ")
    }

    #[test]
    fn test_introduction_reaches_max_sooner() {
        let answer = words(35);
        assert_eq!(assess_delivery(&answer, QuestionKind::Introduction).score, 10);
        assert_eq!(assess_delivery(&answer, QuestionKind::Technical).score, 8);
    }

    #[test]
    fn test_empty_answer_scores_floor() {
        let d = assess_delivery("", QuestionKind::Behavioral);
        assert_eq!(d.score, 6);
        assert_eq!(d.filler_percentage, 0.0);
    }

    #[test]
    fn test_filler_percentage() {
        let d = assess_delivery("um so uh the design was like fine", QuestionKind::Technical);
        assert_eq!(d.word_count, 8);
        assert_eq!(d.filler_count, 3);
        assert_eq!(d.filler_percentage, 37.5);
        assert_eq!(d.score, 6);
    }
}
