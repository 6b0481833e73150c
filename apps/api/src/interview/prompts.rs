// Prompts for question generation and follow-ups.

const RESUME_PROMPT_CHARS: usize = 2000;
const JD_PROMPT_CHARS: usize = 1000;

/// Char-boundary-safe prefix.
fn prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn question_generation_prompt(resume: &str, jd: &str, count: usize) -> String {
    let jd = jd.trim();
    let jd_section = if jd.is_empty() {
        String::new()
    } else {
        format!("JOB DESCRIPTION:\n{}", prefix(jd, JD_PROMPT_CHARS))
    };
    let and_jd = if jd.is_empty() { "" } else { " and job description" };

    format!(
        r#"Based on the following resume{and_jd}, generate {count} diverse interview questions that would effectively evaluate this candidate.

RESUME:
{resume}

{jd_section}

Start with one short introduction question, then cover:
1. Technical skills and experience (2-3 questions)
2. Behavioral/situational scenarios (2-3 questions)
3. Problem-solving and critical thinking (1-2 questions)
4. Cultural fit and motivation (1-2 questions)

Return ONLY a JSON array in this exact format:
[
  {{
    "question": "Tell me about yourself and your background.",
    "type": "introduction",
    "category": "introduction",
    "difficulty": "easy"
  }},
  {{
    "question": "Tell me about a challenging technical problem you solved recently.",
    "type": "technical",
    "category": "problem_solving",
    "difficulty": "medium"
  }}
]

Allowed types: introduction, technical, behavioral, situational, general, custom.
Make questions specific to the candidate's background and the role requirements."#,
        resume = prefix(resume.trim(), RESUME_PROMPT_CHARS),
    )
}

pub fn followup_prompt(question: &str, answer: &str) -> String {
    format!(
        r#"The candidate was asked:
{question}

They answered:
{answer}

Ask ONE natural follow-up question that digs deeper into their answer, for example asking
for a concrete example, the outcome, or a trade-off they made.

Return ONLY this JSON object:
{{"followup_question": "<one question>"}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_respects_char_boundaries() {
        assert_eq!(prefix("héllo", 2), "hé");
        assert_eq!(prefix("abc", 10), "abc");
    }

    #[test]
    fn test_prompt_truncates_resume_and_omits_empty_jd() {
        let resume = "x".repeat(5000);
        let prompt = question_generation_prompt(&resume, "  ", 8);
        assert!(!prompt.contains("JOB DESCRIPTION"));
        assert!(prompt.contains(&"x".repeat(2000)));
        assert!(!prompt.contains(&"x".repeat(2001)));
    }

    #[test]
    fn test_prompt_includes_jd() {
        let prompt = question_generation_prompt("Rust engineer", "Backend role", 8);
        assert!(prompt.contains("resume and job description"));
        assert!(prompt.contains("JOB DESCRIPTION:\nBackend role"));
    }
}
