use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::cache::{fingerprint, BoundedCache};
use super::heuristics::{self, FALLBACK_IMPROVEMENT, FALLBACK_STRENGTH};
use super::scorer::AnswerScorer;
use super::text::normalize;
use super::turn::TurnAnalysis;
use super::{Analysis, AnalysisSource};
use crate::models::Question;

/// Answers shorter than this (after normalization) are not worth scoring.
pub const MIN_ANSWER_CHARS: usize = 5;
pub const SHORT_ANSWER_SCORE: u8 = 2;

/// Process-wide analysis service. Owned by `AppState` behind an `Arc`.
pub struct AnswerAnalyzer {
    cache: BoundedCache<Analysis>,
    scorer: Option<Arc<dyn AnswerScorer>>,
    timeout: Duration,
}

impl AnswerAnalyzer {
    pub fn new(scorer: Option<Arc<dyn AnswerScorer>>, capacity: usize, timeout: Duration) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
            scorer,
            timeout,
        }
    }

    pub fn cache(&self) -> &BoundedCache<Analysis> {
        &self.cache
    }

    /// Scores `answer` against `question`. Upstream failures degrade to the heuristics.
    pub async fn analyze(&self, question: &Question, answer: &str) -> Analysis {
        let normalized = normalize(answer);
        if normalized.chars().count() < MIN_ANSWER_CHARS {
            return short_answer();
        }

        let key = fingerprint(question.id, &normalized);
        if let Some(mut cached) = self.cache.get(&key) {
            debug!("Analysis cache hit for question {}", question.id);
            cached.source = AnalysisSource::Cache;
            return cached;
        }

        let analysis = match self.score_remotely(&question.question, answer).await {
            Some(analysis) => analysis,
            None => heuristic_analysis(answer),
        };

        self.cache.insert(key, analysis.clone());
        analysis
    }

    /// Full per-turn analysis: score plus relevance, delivery and sub-scores.
    pub async fn analyze_turn(&self, question: &Question, answer: &str) -> TurnAnalysis {
        let analysis = self.analyze(question, answer).await;
        TurnAnalysis::build(question, answer, analysis)
    }

    async fn score_remotely(&self, question: &str, answer: &str) -> Option<Analysis> {
        let scorer = self.scorer.as_ref()?;

        match tokio::time::timeout(self.timeout, scorer.score(question, answer)).await {
            Ok(Ok(scored)) => Some(Analysis {
                score: scored.score.min(heuristics::MAX_SCORE as u8),
                strengths: non_empty(scored.strengths, FALLBACK_STRENGTH),
                improvements: non_empty(scored.improvements, FALLBACK_IMPROVEMENT),
                source: AnalysisSource::Cloud,
                breakdown: scored.breakdown,
            }),
            Ok(Err(e)) => {
                warn!("Cloud scoring failed, using heuristics: {e}");
                None
            }
            Err(_) => {
                warn!(
                    "Cloud scoring timed out after {}ms, using heuristics",
                    self.timeout.as_millis()
                );
                None
            }
        }
    }
}

fn short_answer() -> Analysis {
    Analysis {
        score: SHORT_ANSWER_SCORE,
        strengths: vec!["Responded to the question".to_string()],
        improvements: vec![
            "Give a complete answer with context and a specific example".to_string(),
        ],
        source: AnalysisSource::ShortCircuit,
        breakdown: None,
    }
}

fn heuristic_analysis(answer: &str) -> Analysis {
    let outcome = heuristics::score_answer(answer);
    Analysis {
        score: outcome.score,
        strengths: outcome.strengths,
        improvements: outcome.improvements,
        source: AnalysisSource::Heuristic,
        breakdown: None,
    }
}

fn non_empty(items: Vec<String>, fallback: &str) -> Vec<String> {
    if items.is_empty() {
        vec![fallback.to_string()]
    } else {
        items
    }
}
