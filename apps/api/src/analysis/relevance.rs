use serde::{Deserialize, Serialize};

use super::text::{content_words, contains_any, tokenize};
use crate::models::QuestionKind;

const MIN_INTRODUCTION_WORDS: usize = 3;
const OFF_TOPIC_OVERLAP: f64 = 0.15;
/// Answers at least this long are never called off-topic.
const LONG_ANSWER_WORDS: usize = 50;
const MAX_PLAUSIBLE_WORD_LEN: usize = 20;

pub const PERSONAL_BACKGROUND_WORDS: &[&str] = &[
    "i am",
    "i'm",
    "my name",
    "my background",
    "experience",
    "years",
    "worked",
    "working",
    "studied",
    "graduated",
    "degree",
    "university",
    "college",
    "engineer",
    "developer",
    "currently",
    "passionate",
    "career",
    "role",
];

const TECHNICAL_KEYWORDS: &[&str] = &[
    "code", "system", "design", "algorithm", "data", "performance", "architecture", "api",
    "database", "test", "testing", "debug", "implement", "scale", "deploy",
];

const BEHAVIORAL_KEYWORDS: &[&str] = &[
    "team", "project", "challenge", "conflict", "situation", "learned", "led", "worked",
    "colleague", "deadline", "manager", "feedback",
];

const SITUATIONAL_KEYWORDS: &[&str] = &[
    "would", "handle", "approach", "prioritize", "pressure", "plan", "communicate",
    "stakeholder", "calm", "organize",
];

const GENERAL_KEYWORDS: &[&str] = &[
    "role", "company", "interest", "interested", "career", "goal", "goals", "passion",
    "experience", "skills", "motivated", "grow", "opportunity",
];

fn category_keywords(kind: QuestionKind) -> &'static [&'static str] {
    match kind {
        QuestionKind::Technical => TECHNICAL_KEYWORDS,
        QuestionKind::Behavioral => BEHAVIORAL_KEYWORDS,
        QuestionKind::Situational => SITUATIONAL_KEYWORDS,
        QuestionKind::Introduction | QuestionKind::General | QuestionKind::Custom => {
            GENERAL_KEYWORDS
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceVerdict {
    Acceptable,
    Nonsensical,
    OffTopic,
}

impl RelevanceVerdict {
    pub fn is_relevant(&self) -> bool {
        matches!(self, RelevanceVerdict::Acceptable)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceAssessment {
    pub verdict: RelevanceVerdict,
    /// Share of the question's content words that appear in the answer.
    pub keyword_overlap: f64,
}

/// Classifies an answer as acceptable, nonsensical or off-topic.
///
/// Order: the introduction leniency rule, then gibberish detection, then the off-topic check
/// (skipped for introductions and long answers).
pub fn assess_relevance(question: &str, kind: QuestionKind, answer: &str) -> RelevanceAssessment {
    let tokens = tokenize(answer);
    let keyword_overlap = keyword_overlap(question, &tokens);

    let verdict = if kind == QuestionKind::Introduction
        && tokens.len() >= MIN_INTRODUCTION_WORDS
        && contains_any(&tokens, PERSONAL_BACKGROUND_WORDS)
    {
        RelevanceVerdict::Acceptable
    } else if is_nonsensical(&tokens) {
        RelevanceVerdict::Nonsensical
    } else if kind != QuestionKind::Introduction
        && keyword_overlap < OFF_TOPIC_OVERLAP
        && !contains_any(&tokens, category_keywords(kind))
        && tokens.len() < LONG_ANSWER_WORDS
    {
        RelevanceVerdict::OffTopic
    } else {
        RelevanceVerdict::Acceptable
    };

    RelevanceAssessment {
        verdict,
        keyword_overlap,
    }
}

fn keyword_overlap(question: &str, answer_tokens: &[String]) -> f64 {
    let question_words = content_words(question);
    if question_words.is_empty() {
        return 0.0;
    }
    let hits = question_words
        .iter()
        .filter(|w| answer_tokens.contains(w))
        .count();
    hits as f64 / question_words.len() as f64
}

/// More than half of the alphabetic tokens fail [`looks_like_word`]. Answers with no
/// alphabetic tokens at all are nonsensical too.
fn is_nonsensical(tokens: &[String]) -> bool {
    let alpha: Vec<&String> = tokens
        .iter()
        .filter(|t| t.chars().all(|c| c.is_alphabetic() || c == '\''))
        .collect();
    if alpha.is_empty() {
        return true;
    }
    let failing = alpha.iter().filter(|t| !looks_like_word(t)).count();
    failing * 2 > alpha.len()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Crude plausibility check for an English word.
pub fn looks_like_word(token: &str) -> bool {
    let chars: Vec<char> = token.chars().filter(|c| *c != '\'').collect();
    if chars.is_empty() || chars.len() > MAX_PLAUSIBLE_WORD_LEN {
        return false;
    }

    let vowels = chars.iter().filter(|c| is_vowel(**c)).count();
    if vowels == 0 {
        return false;
    }

    for (i, c) in chars.iter().enumerate() {
        if *c == 'q' && i + 1 < chars.len() && chars[i + 1] != 'u' {
            return false;
        }
        if i >= 2 && chars[i - 1] == *c && chars[i - 2] == *c {
            return false;
        }
    }

    let mut run = 0;
    let mut longest_run = 0;
    for c in &chars {
        if is_vowel(*c) {
            run = 0;
        } else {
            run += 1;
            longest_run = longest_run.max(run);
        }
    }
    let vowel_ratio = vowels as f64 / chars.len() as f64;
    !(longest_run >= 4 && vowel_ratio < 0.25)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gibberish_is_nonsensical() {
        let r = assess_relevance(
            "Describe a challenging project you worked on recently.",
            QuestionKind::Behavioral,
            "asdkj qpwo",
        );
        assert_eq!(r.verdict, RelevanceVerdict::Nonsensical);
        assert!(!r.verdict.is_relevant());
    }

    #[test]
    fn test_long_gibberish_still_nonsensical() {
        let answer = vec!["xkcdq zzzzt bfrrq"; 30].join(" ");
        let r = assess_relevance("Explain caching.", QuestionKind::Technical, &answer);
        assert_eq!(r.verdict, RelevanceVerdict::Nonsensical);
    }

    #[test]
    fn test_introduction_leniency() {
        let r = assess_relevance(
            "Tell me about yourself.",
            QuestionKind::Introduction,
            "I am a software engineer with 5 years experience",
        );
        assert_eq!(r.verdict, RelevanceVerdict::Acceptable);

        let r = assess_relevance("Tell me about yourself.", QuestionKind::Introduction, "I'm a developer");
        assert!(r.verdict.is_relevant());
    }

    #[test]
    fn test_off_topic_answer() {
        let r = assess_relevance(
            "How would you design a caching layer for a database?",
            QuestionKind::Technical,
            "My favourite food is pizza and I enjoy hiking on weekends.",
        );
        assert_eq!(r.verdict, RelevanceVerdict::OffTopic);
    }

    #[test]
    fn test_category_keyword_rescues_low_overlap() {
        let r = assess_relevance(
            "Describe a challenging project you worked on recently.",
            QuestionKind::Behavioral,
            "Our team missed a deadline once and I learned to plan better.",
        );
        assert_eq!(r.verdict, RelevanceVerdict::Acceptable);
    }

    #[test]
    fn test_looks_like_word() {
        assert!(looks_like_word("engineer"));
        assert!(looks_like_word("queue"));
        assert!(looks_like_word("rhythm"));
        assert!(!looks_like_word("qpwo"));
        assert!(!looks_like_word("asdkj"));
        assert!(!looks_like_word("zzzzt"));
        assert!(!looks_like_word("brrr"));
    }
}
