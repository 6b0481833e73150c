use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::ExtractError;
use crate::interview::InterviewError;
use crate::storage::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Upstream failures (LLM, speech, storage backends) are normally absorbed into fallbacks
/// before they reach this type; the upstream variants exist for the few paths with no
/// sensible fallback.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Question mismatch: {0}")]
    QuestionMismatch(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<InterviewError> for AppError {
    fn from(err: InterviewError) -> Self {
        match err {
            InterviewError::MissingResume => AppError::Validation(err.to_string()),
            InterviewError::SessionNotFound(_) => AppError::NotFound(err.to_string()),
            InterviewError::NoData(_) => AppError::NotFound(err.to_string()),
            InterviewError::QuestionNotFound { .. } => AppError::NotFound(err.to_string()),
            InterviewError::QuestionMismatch { .. } => {
                AppError::QuestionMismatch(err.to_string())
            }
            InterviewError::SessionComplete(_) => AppError::Validation(err.to_string()),
            InterviewError::Store(e) => AppError::from(e),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::S3(msg) => AppError::S3(msg),
            StoreError::InvalidSessionId(_) => AppError::Validation(err.to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unsupported(_) => AppError::Validation(err.to_string()),
            ExtractError::Pdf(_) | ExtractError::Docx(_) => {
                AppError::UnprocessableEntity(err.to_string())
            }
            ExtractError::Task(e) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::QuestionMismatch(msg) => {
                (StatusCode::BAD_REQUEST, "QUESTION_MISMATCH", msg.clone())
            }
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_resume_maps_to_bad_request() {
        let response = AppError::from(InterviewError::MissingResume).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unknown_session_maps_to_not_found() {
        let err = InterviewError::SessionNotFound("abc".to_string());
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_mismatch_maps_to_bad_request() {
        let err = InterviewError::QuestionMismatch {
            expected: 2,
            received: 3,
        };
        let app_err = AppError::from(err);
        assert!(matches!(app_err, AppError::QuestionMismatch(_)));
        assert_eq!(app_err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_hides_details() {
        let response = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
