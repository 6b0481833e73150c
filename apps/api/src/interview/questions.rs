//! Question Provider: pluggable source of interview questions.
//!
//! Default without an API key: `KeywordQuestionProvider` (resume-aware, deterministic).
//! With `ANTHROPIC_API_KEY`: `LlmQuestionProvider`, which yields an empty list on any failure
//! so the state machine's fixed fallback applies.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use super::prompts::question_generation_prompt;
use crate::analysis::text::{contains_any, tokenize};
use crate::llm_client::prompts::interviewer_system;
use crate::llm_client::LlmClient;
use crate::models::{DifficultyLevel, Question, QuestionKind};

pub const MAX_GENERATED_QUESTIONS: usize = 8;

pub const INTRODUCTION_QUESTION: &str = "Tell me about yourself and your professional journey.";

#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Backend label, reported to clients for transparency.
    fn name(&self) -> &'static str;

    /// Ordered questions for the candidate. May be empty.
    async fn generate(&self, resume: &str, jd: &str) -> Vec<Question>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmQuestionProvider
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    #[serde(default)]
    question: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    difficulty: String,
}

pub struct LlmQuestionProvider {
    llm: LlmClient,
}

impl LlmQuestionProvider {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QuestionProvider for LlmQuestionProvider {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn generate(&self, resume: &str, jd: &str) -> Vec<Question> {
        let prompt = question_generation_prompt(resume, jd, MAX_GENERATED_QUESTIONS);
        match self
            .llm
            .call_json_array::<GeneratedQuestion>(&prompt, &interviewer_system())
            .await
        {
            Ok(generated) => {
                let questions = from_generated(generated);
                info!("LLM generated {} interview questions", questions.len());
                questions
            }
            Err(e) => {
                warn!("LLM question generation failed: {e}");
                Vec::new()
            }
        }
    }
}

fn from_generated(generated: Vec<GeneratedQuestion>) -> Vec<Question> {
    generated
        .into_iter()
        .filter(|g| !g.question.trim().is_empty())
        .take(MAX_GENERATED_QUESTIONS)
        .enumerate()
        .map(|(i, g)| {
            let kind = if g.category.trim().eq_ignore_ascii_case("introduction") {
                QuestionKind::Introduction
            } else {
                QuestionKind::parse_lenient(&g.kind)
            };
            Question::new(i as u32 + 1, g.question.trim(), kind)
                .with_difficulty(DifficultyLevel::parse_lenient(&g.difficulty))
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordQuestionProvider
// ────────────────────────────────────────────────────────────────────────────

struct TopicQuestion {
    triggers: &'static [&'static str],
    question: &'static str,
    difficulty: DifficultyLevel,
}

const TOPIC_QUESTIONS: &[TopicQuestion] = &[
    TopicQuestion {
        triggers: &["python", "java", "javascript", "programming", "software"],
        question: "Walk me through your approach to debugging a complex software issue.",
        difficulty: DifficultyLevel::Medium,
    },
    TopicQuestion {
        triggers: &["aws", "cloud", "azure", "gcp"],
        question: "Explain your experience with cloud technologies and their benefits.",
        difficulty: DifficultyLevel::Medium,
    },
    TopicQuestion {
        triggers: &["machine learning", "ai", "data science", "ml"],
        question: "Describe a machine learning project you've worked on from start to finish.",
        difficulty: DifficultyLevel::Hard,
    },
    TopicQuestion {
        triggers: &["react", "frontend", "ui", "web development"],
        question: "How do you ensure good user experience in your frontend applications?",
        difficulty: DifficultyLevel::Medium,
    },
];

/// Resume-aware question list that needs no network access.
pub struct KeywordQuestionProvider;

#[async_trait]
impl QuestionProvider for KeywordQuestionProvider {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn generate(&self, resume: &str, _jd: &str) -> Vec<Question> {
        keyword_questions(resume)
    }
}

pub fn keyword_questions(resume: &str) -> Vec<Question> {
    let tokens = tokenize(resume);

    let mut drafts: Vec<(&str, QuestionKind, DifficultyLevel)> = vec![
        (INTRODUCTION_QUESTION, QuestionKind::Introduction, DifficultyLevel::Easy),
        (
            "Describe a challenging project you worked on and how you overcame obstacles.",
            QuestionKind::Behavioral,
            DifficultyLevel::Medium,
        ),
        (
            "How do you stay updated with the latest technologies and industry trends?",
            QuestionKind::General,
            DifficultyLevel::Easy,
        ),
        (
            "Tell me about a time when you had to learn a new technology quickly.",
            QuestionKind::Behavioral,
            DifficultyLevel::Medium,
        ),
    ];

    for topic in TOPIC_QUESTIONS {
        if contains_any(&tokens, topic.triggers) {
            drafts.push((topic.question, QuestionKind::Technical, topic.difficulty));
        }
    }

    drafts.push((
        "Describe a situation where you had to work under tight deadlines.",
        QuestionKind::Behavioral,
        DifficultyLevel::Medium,
    ));
    drafts.push((
        "Tell me about a time when you disagreed with your manager or team lead.",
        QuestionKind::Behavioral,
        DifficultyLevel::Hard,
    ));

    drafts
        .into_iter()
        .take(MAX_GENERATED_QUESTIONS)
        .enumerate()
        .map(|(i, (text, kind, difficulty))| {
            Question::new(i as u32 + 1, text, kind).with_difficulty(difficulty)
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback + normalization
// ────────────────────────────────────────────────────────────────────────────

/// Fixed list used when a provider yields nothing. Opens with its own introduction, so
/// [`prepare_questions`] keeps it at four questions.
pub fn fallback_questions() -> Vec<Question> {
    vec![
        Question::new(
            1,
            "Tell me about yourself and your technical background.",
            QuestionKind::Introduction,
        )
        .with_difficulty(DifficultyLevel::Easy),
        Question::new(
            2,
            "Describe a challenging project you worked on recently.",
            QuestionKind::Behavioral,
        ),
        Question::new(3, "How do you handle working under pressure?", QuestionKind::Situational),
        Question::new(4, "What interests you most about this role?", QuestionKind::Custom),
    ]
}

/// Final question list for a session: fallback when empty, an introduction question at
/// index 0, contiguous 1-based ids, `is_scored` derived from the category.
pub fn prepare_questions(questions: Vec<Question>) -> Vec<Question> {
    let mut questions = if questions.is_empty() {
        fallback_questions()
    } else {
        questions
    };

    match questions
        .iter()
        .position(|q| q.kind == QuestionKind::Introduction)
    {
        Some(0) => {}
        Some(idx) => {
            let intro = questions.remove(idx);
            questions.insert(0, intro);
        }
        None => questions.insert(
            0,
            Question::new(0, INTRODUCTION_QUESTION, QuestionKind::Introduction)
                .with_difficulty(DifficultyLevel::Easy),
        ),
    }

    for (i, q) in questions.iter_mut().enumerate() {
        q.id = i as u32 + 1;
        q.is_scored = q.kind.is_scored();
    }
    questions
}
