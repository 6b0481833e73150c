pub mod health;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::documents::handlers as documents;
use crate::interview::handlers as interview;
use crate::posture::handlers as posture;
use crate::speech::handlers as speech;
use crate::state::AppState;

/// Largest accepted request body: a 10MB audio upload plus multipart overhead.
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Documents
        .route("/api/v1/upload", post(documents::handle_upload))
        // Questions
        .route(
            "/api/v1/questions/generate",
            post(interview::handle_generate_questions),
        )
        // Interview session
        .route("/api/v1/interview/start", post(interview::handle_start))
        .route(
            "/api/v1/interview/answer",
            post(interview::handle_submit_answer),
        )
        .route(
            "/api/v1/interview/analyze-answer",
            post(interview::handle_analyze_answer),
        )
        .route(
            "/api/v1/interview/complete",
            post(interview::handle_complete),
        )
        .route(
            "/api/v1/interview/followup",
            post(interview::handle_followup),
        )
        .route(
            "/api/v1/interview/transcript-analysis",
            post(interview::handle_transcript_analysis),
        )
        .route(
            "/api/v1/interview/:session_id/summary",
            get(interview::handle_summary),
        )
        .route(
            "/api/v1/interview/:session_id/questions/:question_id/audio",
            get(interview::handle_question_audio),
        )
        // Speech
        .route("/api/v1/transcribe", post(speech::handle_transcribe))
        .route("/api/v1/voices", get(speech::handle_voices))
        .route(
            "/api/v1/replay-question",
            post(speech::handle_replay_question),
        )
        // Posture
        .route("/api/v1/posture/upload", post(posture::handle_upload_photo))
        .route(
            "/api/v1/posture/analyze",
            post(posture::handle_analyze_posture),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
