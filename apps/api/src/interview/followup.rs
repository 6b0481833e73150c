use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::prompts::followup_prompt;
use crate::analysis::heuristics::OUTCOME_TERMS;
use crate::analysis::text::{contains_any, tokenize};
use crate::llm_client::prompts::interviewer_system;
use crate::llm_client::LlmClient;

/// Answers shorter than this get an elaboration prompt from the rules.
const ELABORATE_BELOW_WORDS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowupSource {
    Llm,
    Rules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Followup {
    pub followup_question: String,
    pub source: FollowupSource,
}

#[derive(Debug, Deserialize)]
struct FollowupReply {
    #[serde(default)]
    followup_question: String,
}

/// Follow-up questions: LLM under a timeout when configured, rules otherwise.
pub struct FollowupGenerator {
    llm: Option<LlmClient>,
    timeout: Duration,
}

impl FollowupGenerator {
    pub fn new(llm: Option<LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub async fn followup(&self, question: &str, answer: &str) -> Followup {
        if let Some(text) = self.ask_llm(question, answer).await {
            return Followup {
                followup_question: text,
                source: FollowupSource::Llm,
            };
        }
        Followup {
            followup_question: rule_based_followup(answer).to_string(),
            source: FollowupSource::Rules,
        }
    }

    async fn ask_llm(&self, question: &str, answer: &str) -> Option<String> {
        let llm = self.llm.as_ref()?;
        let prompt = followup_prompt(question, answer);
        let system = interviewer_system();

        match tokio::time::timeout(
            self.timeout,
            llm.call_json::<FollowupReply>(&prompt, &system),
        )
        .await
        {
            Ok(Ok(reply)) => {
                let text = reply.followup_question.trim();
                if text.is_empty() {
                    warn!("LLM returned an empty follow-up question");
                    None
                } else {
                    Some(text.to_string())
                }
            }
            Ok(Err(e)) => {
                warn!("Follow-up generation failed, using rules: {e}");
                None
            }
            Err(_) => {
                warn!("Follow-up generation timed out, using rules");
                None
            }
        }
    }
}

pub fn rule_based_followup(answer: &str) -> &'static str {
    let tokens = tokenize(answer);
    if tokens.len() < ELABORATE_BELOW_WORDS {
        "Could you elaborate on that with a specific example from your experience?"
    } else if !contains_any(&tokens, OUTCOME_TERMS) {
        "What was the result of that, and how did you measure success?"
    } else {
        "Looking back, what would you do differently if you faced the same situation again?"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_answer_asks_for_elaboration() {
        assert!(rule_based_followup("I used Rust.").contains("elaborate"));
    }

    #[test]
    fn test_answer_without_outcome_asks_for_results() {
        let answer = "I was responsible for migrating the billing service to a new queue and \
                      coordinating the work with two other teams over several weeks";
        assert!(rule_based_followup(answer).contains("result"));
    }

    #[test]
    fn test_complete_answer_asks_for_reflection() {
        let answer = "I led the migration of the billing service to a new queue and we \
                      reduced latency by forty percent which improved checkout conversion";
        assert!(rule_based_followup(answer).contains("differently"));
    }

    #[tokio::test]
    async fn test_without_llm_uses_rules() {
        let generator = FollowupGenerator::new(None, Duration::from_secs(1));
        let followup = generator.followup("Tell me about a project.", "It went fine").await;
        assert_eq!(followup.source, FollowupSource::Rules);
        assert!(followup.followup_question.contains("elaborate"));
    }
}
