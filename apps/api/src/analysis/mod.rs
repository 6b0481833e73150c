// Answer Analysis Engine: scores free-text answers.
// Short-circuit → cache → cloud scorer under timeout → local heuristics. Never fails.

pub mod cache;
pub mod delivery;
pub mod engine;
pub mod heuristics;
pub mod prompts;
pub mod relevance;
pub mod scorer;
pub mod text;
pub mod turn;

use serde::{Deserialize, Serialize};

pub use engine::AnswerAnalyzer;
pub use turn::TurnAnalysis;

/// Which path of the engine produced an [`Analysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    ShortCircuit,
    Cache,
    Cloud,
    Heuristic,
}

/// Rubric components returned by the cloud scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 0–4
    pub relevance: u8,
    /// 0–3
    pub clarity: u8,
    /// 0–3
    pub specificity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Always within 0–10.
    pub score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub source: AnalysisSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
}
