pub const POSTURE_SYSTEM: &str = "You are an interview coach reviewing a candidate's on-camera \
    presence. Comment only on posture, framing, eye line and body language. Never comment on \
    appearance, clothing, age, gender or ethnicity.";

pub fn posture_prompt() -> &'static str {
    r#"Assess the candidate's interview posture in this photo.

Return ONLY this JSON object:
{
  "posture_score": <integer 0-10>,
  "observations": ["<up to 3 short observations>"],
  "recommendations": ["<up to 3 short, actionable recommendations>"]
}"#
}
