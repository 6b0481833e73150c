//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::completion::{AnswerSubmission, FinalReport};
use super::followup::Followup;
use super::service::{AnalysisRecord, InterviewSummary, StartedInterview, SubmitOutcome};
use super::transcript::{analyze_transcript, TranscriptReport, TranscriptTurn};
use crate::errors::AppError;
use crate::models::{DifficultyLevel, Question, QuestionKind};
use crate::state::AppState;
use crate::storage::validate_session_id;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub session_id: String,
    #[serde(default)]
    pub difficulty_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub session_id: String,
    pub question_id: u32,
    pub answer: String,
    #[serde(default)]
    pub response_time: f64,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeAnswerRequest {
    pub session_id: String,
    pub question_id: u32,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    pub session_id: String,
    #[serde(default)]
    pub answers: Vec<AnswerSubmission>,
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
pub struct FollowupRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    pub turns: Vec<TranscriptTurn>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateQuestionsRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateQuestionsResponse {
    pub session_id: String,
    pub question_source: &'static str,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct QuestionAudioResponse {
    pub question_id: u32,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub has_audio: bool,
    pub audio: Option<String>,
    pub voice_id: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interview/start
///
/// Generates the question list from the session's uploaded documents and opens the session.
pub async fn handle_start(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<StartedInterview>, AppError> {
    validate_session_id(&request.session_id)?;
    let difficulty = request
        .difficulty_level
        .as_deref()
        .map(DifficultyLevel::parse_lenient)
        .unwrap_or_default();

    let started = state.interview.start(&request.session_id, difficulty).await?;
    Ok(Json(started))
}

/// POST /api/v1/interview/answer
///
/// Scores the answer to the current question and advances the session.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitOutcome>, AppError> {
    validate_session_id(&request.session_id)?;

    let outcome = state
        .interview
        .submit_answer(
            &request.session_id,
            request.question_id,
            &request.answer,
            request.response_time,
        )
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/interview/analyze-answer
///
/// Analyses an answer to any stored question without advancing the session.
pub async fn handle_analyze_answer(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeAnswerRequest>,
) -> Result<Json<AnalysisRecord>, AppError> {
    validate_session_id(&request.session_id)?;

    let record = state
        .interview
        .analyze_answer(&request.session_id, request.question_id, &request.answer)
        .await?;
    Ok(Json(record))
}

/// GET /api/v1/interview/:session_id/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<InterviewSummary>, AppError> {
    validate_session_id(&session_id)?;
    Ok(Json(state.interview.summary(&session_id).await?))
}

/// POST /api/v1/interview/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    Json(request): Json<CompleteRequest>,
) -> Result<Json<FinalReport>, AppError> {
    validate_session_id(&request.session_id)?;

    let report = state
        .interview
        .complete_interview(&request.session_id, &request.answers, request.duration)
        .await;
    Ok(Json(report))
}

/// POST /api/v1/interview/followup
pub async fn handle_followup(
    State(state): State<AppState>,
    Json(request): Json<FollowupRequest>,
) -> Result<Json<Followup>, AppError> {
    if request.question.trim().is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }

    let followup = state
        .followups
        .followup(&request.question, &request.answer)
        .await;
    Ok(Json(followup))
}

/// POST /api/v1/interview/transcript-analysis
pub async fn handle_transcript_analysis(
    State(state): State<AppState>,
    Json(request): Json<TranscriptRequest>,
) -> Result<Json<TranscriptReport>, AppError> {
    if request.turns.iter().any(|t| t.question.trim().is_empty()) {
        return Err(AppError::Validation(
            "every turn needs a question".to_string(),
        ));
    }

    let report = analyze_transcript(&state.analyzer, &request.turns).await;
    Ok(Json(report))
}

/// POST /api/v1/questions/generate
///
/// Regenerates the session's question list with audio attached.
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Json(request): Json<GenerateQuestionsRequest>,
) -> Result<Json<GenerateQuestionsResponse>, AppError> {
    validate_session_id(&request.session_id)?;

    let questions = state
        .interview
        .generate_questions(&request.session_id)
        .await?;
    Ok(Json(GenerateQuestionsResponse {
        session_id: request.session_id,
        question_source: state.interview.question_source(),
        questions,
    }))
}

/// GET /api/v1/interview/:session_id/questions/:question_id/audio
pub async fn handle_question_audio(
    State(state): State<AppState>,
    Path((session_id, question_id)): Path<(String, u32)>,
) -> Result<Json<QuestionAudioResponse>, AppError> {
    validate_session_id(&session_id)?;

    let question = state
        .interview
        .question_audio(&session_id, question_id)
        .await?;
    Ok(Json(QuestionAudioResponse {
        question_id,
        question: question.question,
        kind: question.kind,
        has_audio: question.has_audio,
        audio: question.audio,
        voice_id: question.voice_id,
    }))
}
