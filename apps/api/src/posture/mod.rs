// Posture check: photo upload with format validation, then a vision-model assessment
// with a neutral canned fallback.

pub mod analysis;
pub mod handlers;
pub mod prompts;
pub mod validation;

pub use analysis::{CannedPostureAnalyzer, LlmPostureAnalyzer, PostureAnalyzer, PostureAssessment};
pub use validation::{validate_photo, ImageFormat, PhotoError};

/// Blob name for an uploaded photo, relative to the session.
pub fn photo_blob_name(photo_id: &str, format: ImageFormat) -> String {
    format!("posture/{photo_id}.{}", format.extension())
}
