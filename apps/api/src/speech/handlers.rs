//! Axum route handlers for the Speech API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{screen_audio_upload, Transcription, VoiceInfo};
use crate::errors::AppError;
use crate::routes::upload::UploadForm;
use crate::state::AppState;
use crate::storage::validate_session_id;

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceInfo>,
    pub current_voice: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplayRequest {
    pub question_text: String,
    #[serde(default)]
    pub voice_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplayResponse {
    pub question_text: String,
    pub voice_id: String,
    pub audio: Option<String>,
    pub has_audio: bool,
}

/// POST /api/v1/transcribe
///
/// Multipart `file` + `session_id`. Rejected uploads come back as 200 bodies with a
/// non-success status so the client can show the message and fall back to typing.
pub async fn handle_transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Transcription>, AppError> {
    let mut form = UploadForm::read(multipart).await?;
    let session_id = form.require_text("session_id")?.to_string();
    validate_session_id(&session_id)?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::Validation("'file' is required".to_string()))?;

    let format = match screen_audio_upload(&file.filename, file.bytes.len()) {
        Ok(format) => format,
        Err(rejected) => {
            info!(
                "Rejected audio upload {} ({} bytes): {:?}",
                file.filename,
                file.bytes.len(),
                rejected.status
            );
            return Ok(Json(rejected));
        }
    };

    let transcription = state
        .recognizer
        .transcribe(file.bytes.to_vec(), format, &session_id)
        .await;
    info!(
        "Transcription for session {session_id}: {:?}",
        transcription.status
    );
    Ok(Json(transcription))
}

/// GET /api/v1/voices
pub async fn handle_voices(State(state): State<AppState>) -> Json<VoicesResponse> {
    let voices = state.synthesizer.voices().await;
    let current_voice = state.synthesizer.interview_voice().await;
    Json(VoicesResponse {
        message: format!("Found {} available voices", voices.len()),
        voices,
        current_voice,
    })
}

/// POST /api/v1/replay-question
pub async fn handle_replay_question(
    State(state): State<AppState>,
    Json(request): Json<ReplayRequest>,
) -> Result<Json<ReplayResponse>, AppError> {
    if request.question_text.trim().is_empty() {
        return Err(AppError::Validation(
            "question_text is required".to_string(),
        ));
    }

    let voice_id = match request.voice_id.filter(|v| !v.trim().is_empty()) {
        Some(voice) => voice,
        None => state.synthesizer.interview_voice().await,
    };
    let audio = state
        .synthesizer
        .speak(&request.question_text, &voice_id)
        .await;

    Ok(Json(ReplayResponse {
        question_text: request.question_text,
        voice_id,
        has_audio: audio.is_some(),
        audio,
    }))
}
