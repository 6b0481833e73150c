//! Axum route handlers for document upload.

use std::collections::BTreeMap;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{extract_text, parse_resume_sections, DocumentKind};
use crate::errors::AppError;
use crate::models::document::ExtractedDocument;
use crate::routes::upload::UploadForm;
use crate::state::AppState;
use crate::storage::{save_as, DataKind};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub session_id: String,
    pub file_paths: BTreeMap<String, String>,
}

/// POST /api/v1/upload
///
/// Multipart `resumeFile` (PDF or DOCX), optional `jdFile` or `jdText`. Opens a new session
/// id and stores the extracted text under it.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut form = UploadForm::read(multipart).await?;

    let resume = form
        .take_file("resumeFile")
        .ok_or_else(|| AppError::Validation("Resume required".to_string()))?;
    let resume_kind = match DocumentKind::from_filename(&resume.filename) {
        Ok(kind @ (DocumentKind::Pdf | DocumentKind::Docx)) => kind,
        _ => return Err(AppError::Validation("PDF or DOCX only".to_string())),
    };

    let session_id = Uuid::new_v4().to_string();
    info!(
        "Upload for session {session_id}: resume {} ({} bytes)",
        resume.filename,
        resume.bytes.len()
    );

    let resume_text = extract_text(resume.bytes.to_vec(), resume_kind).await?;
    if resume_text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the resume".to_string(),
        ));
    }

    let store = state.store.as_ref();
    let mut file_paths = BTreeMap::new();
    let path = save_as(
        store,
        &session_id,
        &DataKind::Resume,
        &ExtractedDocument {
            text: resume_text.clone(),
        },
    )
    .await?;
    file_paths.insert("extracted_resume_text".to_string(), path);

    let sections = parse_resume_sections(&resume_text);
    match save_as(store, &session_id, &DataKind::ResumeSections, &sections).await {
        Ok(path) => {
            file_paths.insert("resume_sections".to_string(), path);
        }
        Err(e) => warn!("Failed to store resume sections for {session_id}: {e}"),
    }

    let jd_text = match form.take_file("jdFile") {
        Some(jd) => {
            let kind = DocumentKind::from_filename(&jd.filename)?;
            Some(extract_text(jd.bytes.to_vec(), kind).await?)
        }
        None => form.text("jdText").map(str::to_string),
    };
    if let Some(text) = jd_text.filter(|t| !t.trim().is_empty()) {
        let path = save_as(
            store,
            &session_id,
            &DataKind::JobDescription,
            &ExtractedDocument {
                text: text.trim().to_string(),
            },
        )
        .await?;
        file_paths.insert("extracted_jd_text".to_string(), path);
    }

    info!("Upload completed for session {session_id}");
    Ok(Json(UploadResponse {
        message: "Files processed successfully".to_string(),
        session_id,
        file_paths,
    }))
}
