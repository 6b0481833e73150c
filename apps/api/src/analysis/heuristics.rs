//! Local answer scoring used when the cloud scorer is unavailable, slow or returns garbage.
//!
//! Every heuristic is a row in a rule table: a name, a predicate over [`AnswerFeatures`], and
//! either a score delta or a feedback line. Tables are evaluated top to bottom.

use serde::Serialize;

use super::text::{contains_any, count_phrases, tokenize};

pub const BASELINE_SCORE: i32 = 7;
pub const MIN_HEURISTIC_SCORE: i32 = 3;
pub const MAX_SCORE: i32 = 10;
const MAX_FEEDBACK_ITEMS: usize = 3;

pub const HEDGE_PHRASES: &[&str] = &["i think", "maybe", "not sure", "probably", "i guess"];

pub const FILLER_WORDS: &[&str] = &["um", "uh", "like", "you know"];

pub const DOMAIN_TERMS: &[&str] = &[
    "experience",
    "project",
    "team",
    "developed",
    "implemented",
    "designed",
    "built",
    "led",
    "managed",
    "architecture",
    "system",
    "customer",
    "stakeholder",
    "deadline",
    "python",
    "java",
    "aws",
    "cloud",
    "database",
    "api",
];

pub const OUTCOME_TERMS: &[&str] = &[
    "result",
    "results",
    "outcome",
    "success",
    "successfully",
    "improved",
    "reduced",
    "increased",
    "delivered",
    "achieved",
    "impact",
    "percent",
];

/// Measurements taken once per answer and shared by every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerFeatures {
    pub word_count: usize,
    pub hedge_count: usize,
    pub filler_count: usize,
    pub filler_ratio: f64,
    pub has_domain_terms: bool,
    pub has_outcome_terms: bool,
}

impl AnswerFeatures {
    pub fn from_answer(answer: &str) -> Self {
        let tokens = tokenize(answer);
        let word_count = tokens.len();
        let filler_count = count_phrases(&tokens, FILLER_WORDS);
        let filler_ratio = if word_count == 0 {
            0.0
        } else {
            filler_count as f64 / word_count as f64
        };

        Self {
            word_count,
            hedge_count: count_phrases(&tokens, HEDGE_PHRASES),
            filler_count,
            filler_ratio,
            has_domain_terms: contains_any(&tokens, DOMAIN_TERMS),
            has_outcome_terms: contains_any(&tokens, OUTCOME_TERMS),
        }
    }
}

pub struct ScoreRule {
    pub name: &'static str,
    pub applies: fn(&AnswerFeatures) -> bool,
    pub delta: i32,
}

pub struct FeedbackRule {
    pub name: &'static str,
    pub applies: fn(&AnswerFeatures) -> bool,
    pub text: &'static str,
}

fn very_short(f: &AnswerFeatures) -> bool {
    f.word_count < 10
}

fn short(f: &AnswerFeatures) -> bool {
    (10..20).contains(&f.word_count)
}

fn long_and_developed(f: &AnswerFeatures) -> bool {
    f.word_count >= 80
}

fn heavy_hedging(f: &AnswerFeatures) -> bool {
    f.hedge_count > 2
}

fn filler_heavy(f: &AnswerFeatures) -> bool {
    f.filler_ratio > 0.10
}

pub const SCORE_RULES: &[ScoreRule] = &[
    ScoreRule { name: "very_short", applies: very_short, delta: -2 },
    ScoreRule { name: "short", applies: short, delta: -1 },
    ScoreRule { name: "long_and_developed", applies: long_and_developed, delta: 1 },
    ScoreRule { name: "heavy_hedging", applies: heavy_hedging, delta: -1 },
    ScoreRule { name: "filler_heavy", applies: filler_heavy, delta: -1 },
];

fn detailed(f: &AnswerFeatures) -> bool {
    f.word_count >= 25
}

fn confident(f: &AnswerFeatures) -> bool {
    f.hedge_count <= 1 && f.word_count >= 10
}

fn grounded_in_experience(f: &AnswerFeatures) -> bool {
    f.has_domain_terms
}

fn results_oriented(f: &AnswerFeatures) -> bool {
    f.has_outcome_terms
}

pub const STRENGTH_RULES: &[FeedbackRule] = &[
    FeedbackRule {
        name: "detailed",
        applies: detailed,
        text: "Gave a detailed, well-developed response",
    },
    FeedbackRule {
        name: "confident",
        applies: confident,
        text: "Communicated with confidence and little hedging",
    },
    FeedbackRule {
        name: "grounded_in_experience",
        applies: grounded_in_experience,
        text: "Referenced concrete experience and domain knowledge",
    },
    FeedbackRule {
        name: "results_oriented",
        applies: results_oriented,
        text: "Connected the answer to concrete results",
    },
];

fn needs_detail(f: &AnswerFeatures) -> bool {
    f.word_count < 20
}

fn hedges(f: &AnswerFeatures) -> bool {
    f.hedge_count > 1
}

fn lacks_experience(f: &AnswerFeatures) -> bool {
    !f.has_domain_terms
}

fn lacks_outcome(f: &AnswerFeatures) -> bool {
    !f.has_outcome_terms && f.word_count >= 20
}

pub const IMPROVEMENT_RULES: &[FeedbackRule] = &[
    FeedbackRule {
        name: "needs_detail",
        applies: needs_detail,
        text: "Expand the answer with more detail and a specific example",
    },
    FeedbackRule {
        name: "hedges",
        applies: hedges,
        text: "Reduce hedging phrases such as \"I think\" or \"maybe\"",
    },
    FeedbackRule {
        name: "filler_heavy",
        applies: filler_heavy,
        text: "Cut down on filler words like \"um\" and \"uh\"",
    },
    FeedbackRule {
        name: "lacks_experience",
        applies: lacks_experience,
        text: "Tie the answer to a specific project or experience",
    },
    FeedbackRule {
        name: "lacks_outcome",
        applies: lacks_outcome,
        text: "Quantify the outcome or impact of your work",
    },
];

pub const FALLBACK_STRENGTH: &str = "Answered the question directly";
pub const FALLBACK_IMPROVEMENT: &str =
    "Structure answers with the STAR method (Situation, Task, Action, Result)";

#[derive(Debug, Clone, Serialize)]
pub struct HeuristicOutcome {
    pub score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// Names of the score rules that fired, in table order.
    pub fired: Vec<&'static str>,
}

/// Scores an answer from the rule tables. Always returns at least one strength and one
/// improvement, and a score within `[MIN_HEURISTIC_SCORE, MAX_SCORE]`.
pub fn score_answer(answer: &str) -> HeuristicOutcome {
    let features = AnswerFeatures::from_answer(answer);

    let mut score = BASELINE_SCORE;
    let mut fired = Vec::new();
    for rule in SCORE_RULES {
        if (rule.applies)(&features) {
            score += rule.delta;
            fired.push(rule.name);
        }
    }
    let score = score.clamp(MIN_HEURISTIC_SCORE, MAX_SCORE) as u8;

    HeuristicOutcome {
        score,
        strengths: collect_feedback(STRENGTH_RULES, &features, FALLBACK_STRENGTH),
        improvements: collect_feedback(IMPROVEMENT_RULES, &features, FALLBACK_IMPROVEMENT),
        fired,
    }
}

fn collect_feedback(
    rules: &[FeedbackRule],
    features: &AnswerFeatures,
    fallback: &str,
) -> Vec<String> {
    let mut items: Vec<String> = rules
        .iter()
        .filter(|r| (r.applies)(features))
        .take(MAX_FEEDBACK_ITEMS)
        .map(|r| r.text.to_string())
        .collect();
    if items.is_empty() {
        items.push(fallback.to_string());
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG_ANSWER: &str = "In my last role I led a team of four engineers to rebuild our \
        billing system on AWS. We designed an event driven architecture, implemented it in \
        Python, and delivered it two weeks early. The result was a forty percent reduction in \
        failed payments and far fewer support tickets for the customer success team.";

    #[test]
    fn test_very_short_answer_penalized() {
        let outcome = score_answer("I would fix the bug.");
        assert_eq!(outcome.score, 5);
        assert_eq!(outcome.fired, vec!["very_short"]);
    }

    #[test]
    fn test_strong_answer_keeps_baseline() {
        let outcome = score_answer(STRONG_ANSWER);
        assert_eq!(outcome.score, 7);
        assert!(outcome.fired.is_empty());
        assert!(outcome
            .strengths
            .iter()
            .any(|s| s.contains("concrete experience")));
    }

    #[test]
    fn test_hedging_and_filler_stack() {
        let answer = "um I think maybe um I guess probably uh like you know";
        let outcome = score_answer(answer);
        assert_eq!(outcome.fired, vec!["short", "heavy_hedging", "filler_heavy"]);
        assert_eq!(outcome.score, 4);
    }

    #[test]
    fn test_worst_case_hits_floor() {
        let outcome = score_answer("um maybe maybe probably uh");
        assert_eq!(outcome.score, MIN_HEURISTIC_SCORE as u8);
    }

    #[test]
    fn test_always_yields_feedback() {
        let outcome = score_answer("ok");
        assert!(!outcome.strengths.is_empty());
        assert!(!outcome.improvements.is_empty());
        assert_eq!(outcome.strengths, vec![FALLBACK_STRENGTH.to_string()]);
    }

    #[test]
    fn test_feedback_lists_are_capped() {
        let outcome = score_answer("um um um maybe maybe maybe fine");
        assert!(outcome.improvements.len() <= 3);
    }

    #[test]
    fn test_filler_ratio_counts_multi_word_fillers() {
        let features = AnswerFeatures::from_answer("you know it was like fine");
        assert_eq!(features.filler_count, 2);
        assert_eq!(features.word_count, 6);
    }
}
