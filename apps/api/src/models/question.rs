use serde::{Deserialize, Serialize};

/// Category tag of an interview question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Introduction,
    Technical,
    Behavioral,
    Situational,
    #[default]
    General,
    Custom,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 6] = [
        QuestionKind::Introduction,
        QuestionKind::Technical,
        QuestionKind::Behavioral,
        QuestionKind::Situational,
        QuestionKind::General,
        QuestionKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Introduction => "introduction",
            QuestionKind::Technical => "technical",
            QuestionKind::Behavioral => "behavioral",
            QuestionKind::Situational => "situational",
            QuestionKind::General => "general",
            QuestionKind::Custom => "custom",
        }
    }

    /// Maps free-form labels (as returned by the LLM) onto a category. Unknown labels are `General`.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "introduction" | "intro" => QuestionKind::Introduction,
            "technical" | "tech" | "problem_solving" | "problem-solving" => QuestionKind::Technical,
            "behavioral" | "behavioural" => QuestionKind::Behavioral,
            "situational" | "scenario" => QuestionKind::Situational,
            "custom" | "motivation" | "cultural_fit" | "culture" => QuestionKind::Custom,
            _ => QuestionKind::General,
        }
    }

    /// Introduction questions are conversational and never scored.
    pub fn is_scored(&self) -> bool {
        !matches!(self, QuestionKind::Introduction)
    }
}

/// Requested interview difficulty. Only `Baseline` is actually varied today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    #[default]
    Baseline,
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    /// Unknown labels fall back to `Baseline`.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "easy" => DifficultyLevel::Easy,
            "medium" => DifficultyLevel::Medium,
            "hard" => DifficultyLevel::Hard,
            _ => DifficultyLevel::Baseline,
        }
    }
}

/// A single interview question. Immutable once generated, except for the lazily
/// populated audio fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: QuestionKind,
    pub is_scored: bool,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default)]
    pub has_audio: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

impl Question {
    pub fn new(id: u32, text: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id,
            question: text.into(),
            kind,
            is_scored: kind.is_scored(),
            difficulty: DifficultyLevel::Baseline,
            audio: None,
            has_audio: false,
            voice_id: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: DifficultyLevel) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn attach_audio(&mut self, audio: String, voice_id: String) {
        self.audio = Some(audio);
        self.has_audio = true;
        self.voice_id = Some(voice_id);
    }
}
