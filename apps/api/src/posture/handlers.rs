//! Axum route handlers for the Posture API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{photo_blob_name, validate_photo, ImageFormat, PostureAssessment};
use crate::errors::AppError;
use crate::routes::upload::UploadForm;
use crate::state::AppState;
use crate::storage::{save_as, validate_session_id, DataKind};

#[derive(Debug, Serialize)]
pub struct PhotoUploadResponse {
    pub session_id: String,
    pub photo_id: String,
    pub format: ImageFormat,
    pub size_bytes: usize,
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzePostureRequest {
    pub session_id: String,
    pub photo_id: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzePostureResponse {
    pub session_id: String,
    pub photo_id: String,
    pub assessment: PostureAssessment,
}

/// POST /api/v1/posture/upload
///
/// Multipart `session_id` + `photo`. PNG or JPEG by content, at most 5MB.
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PhotoUploadResponse>, AppError> {
    let mut form = UploadForm::read(multipart).await?;
    let session_id = form.require_text("session_id")?.to_string();
    validate_session_id(&session_id)?;
    let photo = form
        .take_file("photo")
        .ok_or_else(|| AppError::Validation("'photo' is required".to_string()))?;

    let format = validate_photo(&photo.bytes).map_err(|e| AppError::Validation(e.to_string()))?;
    let photo_id = Uuid::new_v4().simple().to_string();
    let size_bytes = photo.bytes.len();

    let location = state
        .store
        .save_blob(
            &session_id,
            &photo_blob_name(&photo_id, format),
            photo.bytes.to_vec(),
            format.media_type(),
        )
        .await?;
    info!("Stored posture photo {photo_id} for session {session_id} at {location}");

    Ok(Json(PhotoUploadResponse {
        session_id,
        photo_id,
        format,
        size_bytes,
        location,
    }))
}

/// POST /api/v1/posture/analyze
pub async fn handle_analyze_posture(
    State(state): State<AppState>,
    Json(request): Json<AnalyzePostureRequest>,
) -> Result<Json<AnalyzePostureResponse>, AppError> {
    validate_session_id(&request.session_id)?;
    if request.photo_id.is_empty() || !request.photo_id.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(AppError::Validation("Invalid photo_id".to_string()));
    }

    let mut found = None;
    for format in ImageFormat::ALL {
        let name = photo_blob_name(&request.photo_id, format);
        if let Some(bytes) = state.store.load_blob(&request.session_id, &name).await {
            found = Some((bytes, format));
            break;
        }
    }
    let (bytes, format) = found.ok_or_else(|| {
        AppError::NotFound(format!(
            "Photo {} not found for session {}",
            request.photo_id, request.session_id
        ))
    })?;

    let assessment = state.posture.analyze(&bytes, format).await;
    save_as(
        state.store.as_ref(),
        &request.session_id,
        &DataKind::Posture(request.photo_id.clone()),
        &assessment,
    )
    .await?;

    Ok(Json(AnalyzePostureResponse {
        session_id: request.session_id,
        photo_id: request.photo_id,
        assessment,
    }))
}
