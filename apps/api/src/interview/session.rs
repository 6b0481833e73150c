use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::InterviewError;
use crate::analysis::TurnAnalysis;
use crate::models::{DifficultyLevel, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    InProgress,
    Complete,
}

/// One recorded question → answer → analysis exchange. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub question_id: u32,
    pub question: String,
    pub answer: String,
    /// Client-reported seconds; untrusted.
    pub response_time: f64,
    /// False for introduction turns, which stay out of every average.
    pub scored: bool,
    pub analysis: TurnAnalysis,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_questions: usize,
    pub completed: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTrend {
    Improving,
    Stable,
}

/// Result of recording a turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Advance {
    pub next_question: Option<Question>,
    pub is_complete: bool,
}

/// Persisted interview session (kind `speech_session`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub questions: Vec<Question>,
    pub current_question_index: usize,
    pub difficulty_level: DifficultyLevel,
    pub state: SessionState,
    pub question_history: Vec<Turn>,
    pub session_stats: SessionStats,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        session_id: impl Into<String>,
        questions: Vec<Question>,
        difficulty_level: DifficultyLevel,
    ) -> Self {
        let total_questions = questions.len();
        Self {
            session_id: session_id.into(),
            questions,
            current_question_index: 0,
            difficulty_level,
            state: SessionState::Created,
            question_history: Vec::new(),
            session_stats: SessionStats {
                total_questions,
                ..SessionStats::default()
            },
            created_at: Utc::now(),
        }
    }

    /// `Created` → `InProgress`. A session without questions is complete immediately.
    pub fn begin(&mut self) {
        if self.state == SessionState::Created {
            self.state = if self.questions.is_empty() {
                SessionState::Complete
            } else {
                SessionState::InProgress
            };
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::InProgress => self.questions.get(self.current_question_index),
            _ => None,
        }
    }

    /// The question an answer for `question_id` would be recorded against.
    /// Out-of-order and duplicate submissions are rejected.
    pub fn check_submission(&self, question_id: u32) -> Result<&Question, InterviewError> {
        if self.state == SessionState::Complete {
            return Err(InterviewError::SessionComplete(self.session_id.clone()));
        }
        let current = self
            .questions
            .get(self.current_question_index)
            .ok_or_else(|| InterviewError::SessionComplete(self.session_id.clone()))?;
        if current.id != question_id {
            return Err(InterviewError::QuestionMismatch {
                expected: current.id,
                received: question_id,
            });
        }
        Ok(current)
    }

    /// Appends a turn for the current question and advances. The caller must have passed
    /// [`Session::check_submission`] for `turn.question_id`.
    pub fn record_turn(&mut self, turn: Turn) -> Advance {
        self.question_history.push(turn);
        self.session_stats.completed = self.question_history.len();
        self.session_stats.average_score = self.average_score();

        if self.current_question_index + 1 < self.questions.len() {
            self.current_question_index += 1;
            self.state = SessionState::InProgress;
            Advance {
                next_question: self.questions.get(self.current_question_index).cloned(),
                is_complete: false,
            }
        } else {
            self.state = SessionState::Complete;
            Advance {
                next_question: None,
                is_complete: true,
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    fn scored_scores(&self) -> impl Iterator<Item = u8> + '_ {
        self.question_history
            .iter()
            .filter(|t| t.scored)
            .map(|t| t.analysis.overall_score)
    }

    /// Mean overall score of the scored turns recorded so far; 0 when there are none.
    pub fn average_score(&self) -> f64 {
        let scores: Vec<u8> = self.scored_scores().collect();
        if scores.is_empty() {
            return 0.0;
        }
        let total: u32 = scores.iter().map(|s| u32::from(*s)).sum();
        f64::from(total) / scores.len() as f64
    }

    /// `Improving` only when the latest scored turn beats the one before it.
    pub fn performance_trend(&self) -> PerformanceTrend {
        let scores: Vec<u8> = self.scored_scores().collect();
        match scores.as_slice() {
            [.., previous, latest] if latest > previous => PerformanceTrend::Improving,
            _ => PerformanceTrend::Stable,
        }
    }

    /// Difficulty for the next question. Not adapted yet; the requested level is kept.
    pub fn next_difficulty(&self) -> DifficultyLevel {
        self.difficulty_level
    }
}
