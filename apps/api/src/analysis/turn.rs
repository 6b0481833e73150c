use serde::{Deserialize, Serialize};

use super::delivery::{assess_delivery, DeliveryAssessment};
use super::heuristics::AnswerFeatures;
use super::relevance::{assess_relevance, RelevanceAssessment};
use super::{Analysis, AnalysisSource};
use crate::models::Question;

/// Overall score ceiling for nonsensical or off-topic answers.
pub const IRRELEVANT_SCORE_CAP: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScore {
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceAssessment {
    pub level: ConfidenceLevel,
}

/// Analysis recorded for one turn of a speech interview.
///
/// `overall_score` is the engine's `content_score` unless the answer was judged irrelevant,
/// in which case it is capped at [`IRRELEVANT_SCORE_CAP`] and `relevance_capped` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnAnalysis {
    pub overall_score: u8,
    /// Score produced by the analysis engine, before the relevance cap.
    #[serde(default)]
    pub content_score: u8,
    #[serde(default)]
    pub relevance_capped: bool,
    pub technical_accuracy: SubScore,
    pub communication_skills: SubScore,
    pub confidence_assessment: ConfidenceAssessment,
    pub job_relevance: SubScore,
    pub is_relevant: bool,
    pub relevance: RelevanceAssessment,
    pub delivery: DeliveryAssessment,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub source: AnalysisSource,
}

impl TurnAnalysis {
    pub fn build(question: &Question, answer: &str, analysis: Analysis) -> Self {
        let relevance = assess_relevance(&question.question, question.kind, answer);
        let delivery = assess_delivery(answer, question.kind);
        let features = AnswerFeatures::from_answer(answer);
        let is_relevant = relevance.verdict.is_relevant();

        let mut improvements = analysis.improvements;
        let overall_score = if is_relevant {
            analysis.score
        } else {
            improvements.insert(0, "Answer the question that was asked".to_string());
            improvements.truncate(3);
            analysis.score.min(IRRELEVANT_SCORE_CAP)
        };

        let technical_accuracy = match analysis.breakdown {
            Some(b) => scale(b.relevance + b.specificity, 7),
            None => overall_score,
        };
        let communication_skills = match analysis.breakdown {
            Some(b) => ((u16::from(scale(b.clarity, 3)) + u16::from(delivery.score) + 1) / 2) as u8,
            None => delivery.score,
        };
        let job_relevance = if is_relevant {
            (5.0 + 5.0 * relevance.keyword_overlap).round().min(10.0) as u8
        } else {
            overall_score
        };
        let level = match features.hedge_count {
            0 => ConfidenceLevel::High,
            1 | 2 => ConfidenceLevel::Moderate,
            _ => ConfidenceLevel::Low,
        };

        Self {
            overall_score,
            content_score: analysis.score,
            relevance_capped: overall_score < analysis.score,
            technical_accuracy: SubScore {
                score: technical_accuracy,
            },
            communication_skills: SubScore {
                score: communication_skills,
            },
            confidence_assessment: ConfidenceAssessment { level },
            job_relevance: SubScore {
                score: job_relevance,
            },
            is_relevant,
            relevance,
            delivery,
            strengths: analysis.strengths,
            improvements,
            source: analysis.source,
        }
    }
}

/// Rescales `value` out of `max` onto 0–10.
fn scale(value: u8, max: u8) -> u8 {
    if max == 0 {
        return 0;
    }
    ((f64::from(value) / f64::from(max)) * 10.0).round().min(10.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::relevance::RelevanceVerdict;
    use crate::analysis::ScoreBreakdown;
    use crate::models::QuestionKind;

    fn analysis(score: u8, breakdown: Option<ScoreBreakdown>) -> Analysis {
        Analysis {
            score,
            strengths: vec!["Clear".to_string()],
            improvements: vec!["More detail".to_string()],
            source: AnalysisSource::Cloud,
            breakdown,
        }
    }

    #[test]
    fn test_introduction_scenario_is_relevant() {
        let q = Question::new(1, "Tell me about yourself.", QuestionKind::Introduction);
        let turn = TurnAnalysis::build(
            &q,
            "I am a software engineer with 5 years experience in Python and AWS",
            analysis(8, None),
        );
        assert!(turn.is_relevant);
        assert_eq!(turn.overall_score, 8);
        assert_eq!(turn.content_score, 8);
        assert!(!turn.relevance_capped);
        assert_eq!(turn.confidence_assessment.level, ConfidenceLevel::High);
    }

    #[test]
    fn test_gibberish_is_capped_and_flagged() {
        let q = Question::new(2, "Describe a challenging project.", QuestionKind::Behavioral);
        let turn = TurnAnalysis::build(&q, "asdkj qpwo", analysis(7, None));
        assert!(!turn.is_relevant);
        assert_eq!(turn.relevance.verdict, RelevanceVerdict::Nonsensical);
        assert_eq!(turn.overall_score, IRRELEVANT_SCORE_CAP);
        assert_eq!(turn.content_score, 7);
        assert!(turn.relevance_capped);
        assert_eq!(turn.improvements[0], "Answer the question that was asked");
    }

    #[test]
    fn test_low_irrelevant_score_is_not_marked_capped() {
        let q = Question::new(2, "Describe a challenging project.", QuestionKind::Behavioral);
        let turn = TurnAnalysis::build(&q, "asdkj qpwo", analysis(2, None));
        assert!(!turn.is_relevant);
        assert_eq!(turn.overall_score, 2);
        assert!(!turn.relevance_capped);
    }

    #[test]
    fn test_breakdown_drives_sub_scores() {
        let q = Question::new(3, "Explain how you would design a cache.", QuestionKind::Technical);
        let breakdown = ScoreBreakdown {
            relevance: 4,
            clarity: 3,
            specificity: 3,
        };
        let turn = TurnAnalysis::build(
            &q,
            "I would design the cache with a bounded map and evict the oldest entries first.",
            analysis(10, Some(breakdown)),
        );
        assert_eq!(turn.technical_accuracy.score, 10);
        assert!(turn.communication_skills.score >= 8);
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale(7, 7), 10);
        assert_eq!(scale(0, 3), 0);
        assert_eq!(scale(2, 4), 5);
    }
}
