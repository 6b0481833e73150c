// Interview Session State Machine and the operations built around it.
// Start → SubmitAnswer* → Complete, plus summary, one-shot completion, follow-ups and
// transcript analysis.

pub mod audio;
pub mod completion;
pub mod followup;
pub mod handlers;
pub mod locks;
pub mod prompts;
pub mod questions;
pub mod service;
pub mod session;
pub mod transcript;

use thiserror::Error;

use crate::storage::StoreError;

pub use service::InterviewService;
pub use session::Session;

#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("No resume data found; upload a resume first")]
    MissingResume,

    #[error("No interview session found for '{0}'")]
    SessionNotFound(String),

    #[error("No interview data found for '{0}'")]
    NoData(String),

    #[error("Question {question_id} not found in session '{session_id}'")]
    QuestionNotFound { session_id: String, question_id: u32 },

    #[error("Question ID mismatch: expected {expected}, received {received}")]
    QuestionMismatch { expected: u32, received: u32 },

    #[error("Interview session '{0}' is already complete")]
    SessionComplete(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
