// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Persona shared by every interviewer-facing prompt.
pub const INTERVIEWER_PERSONA: &str = "You are an expert HR interviewer running a realistic \
    mock job interview. You are fair, specific and encouraging, and you never invent facts \
    about the candidate that are not in the provided material.";

/// Builds a system prompt from the interviewer persona plus the JSON-only rule.
pub fn interviewer_system() -> String {
    format!("{INTERVIEWER_PERSONA} {JSON_ONLY_SYSTEM}")
}
