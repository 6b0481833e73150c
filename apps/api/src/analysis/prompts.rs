// Prompts for cloud answer scoring.

/// Scoring prompt. The reply must be a single JSON object:
/// `{"score", "breakdown": {"relevance", "clarity", "specificity"}, "strengths", "improvements"}`.
pub fn scoring_prompt(question: &str, answer: &str) -> String {
    format!(
        r#"Score the candidate's answer to the interview question below.

QUESTION:
{question}

ANSWER:
{answer}

Scoring rubric (total 0-10):
- relevance: 0-4, does the answer address the question that was asked
- clarity: 0-3, is the answer structured and easy to follow
- specificity: 0-3, does it use concrete examples, numbers or outcomes

Return ONLY this JSON object:
{{
  "score": <integer 0-10, the sum of the breakdown>,
  "breakdown": {{"relevance": <0-4>, "clarity": <0-3>, "specificity": <0-3>}},
  "strengths": ["<up to 3 short statements>"],
  "improvements": ["<up to 3 short, actionable statements>"]
}}"#
    )
}
