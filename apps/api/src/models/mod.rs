pub mod document;
pub mod question;

pub use question::{DifficultyLevel, Question, QuestionKind};
