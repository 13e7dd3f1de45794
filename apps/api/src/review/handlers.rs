//! Axum route handlers for the Review API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::extract::extract;
use crate::models::review::{ParsedResume, RefineRequest, ReviewRequest, ReviewResult};
use crate::review::service::{self, ReviewInput};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Multipart helpers
// ────────────────────────────────────────────────────────────────────────────

/// An uploaded file as received, before extraction.
struct Upload {
    file_name: String,
    data: Bytes,
}

/// Fields understood by the upload endpoints. Unknown fields are ignored.
#[derive(Default)]
struct UploadForm {
    file: Option<Upload>,
    job_description: Option<String>,
    target_role: Option<String>,
}

impl UploadForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let data = field.bytes().await.map_err(malformed)?;
                    form.file = Some(Upload { file_name, data });
                }
                "job_description" => {
                    form.job_description = Some(field.text().await.map_err(malformed)?);
                }
                "target_role" => {
                    let role = field.text().await.map_err(malformed)?;
                    form.target_role = Some(role).filter(|r| !r.trim().is_empty());
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn take_file(&mut self) -> Result<Upload, AppError> {
        self.file
            .take()
            .ok_or_else(|| AppError::Validation("Missing multipart field 'file'".to_string()))
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {err}"))
}

/// Runs extraction off the async executor; PDF parsing is CPU-bound.
async fn extract_upload(upload: Upload) -> Result<String, AppError> {
    let Upload { file_name, data } = upload;
    info!(file = %file_name, bytes = data.len(), "Extracting resume text");

    let text = tokio::task::spawn_blocking(move || extract(&file_name, &data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))??;
    Ok(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/review
pub async fn handle_review(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> Json<ReviewResult> {
    Json(service::review(state.provider.as_ref(), ReviewInput::from(&request)).await)
}

/// POST /api/refine
pub async fn handle_refine(
    State(state): State<AppState>,
    Json(request): Json<RefineRequest>,
) -> Json<ReviewResult> {
    Json(service::refine(state.provider.as_ref(), &request).await)
}

/// POST /api/parse_resume
///
/// Extracts plain text from an uploaded resume without calling the model.
pub async fn handle_parse_resume(
    mut multipart: Multipart,
) -> Result<Json<ParsedResume>, AppError> {
    let upload = UploadForm::read(&mut multipart).await?.take_file()?;
    let text = extract_upload(upload).await?;
    Ok(Json(ParsedResume { text }))
}

/// POST /api/review_file
///
/// Same as `/api/review`, with the resume supplied as a file.
pub async fn handle_review_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ReviewResult>, AppError> {
    let mut form = UploadForm::read(&mut multipart).await?;
    let upload = form.take_file()?;
    let job_description = form.job_description.take().ok_or_else(|| {
        AppError::Validation("Missing multipart field 'job_description'".to_string())
    })?;

    let resume_text = extract_upload(upload).await?;

    let input = ReviewInput {
        resume_text: &resume_text,
        job_description: &job_description,
        target_role: form.target_role.as_deref(),
    };
    Ok(Json(service::review(state.provider.as_ref(), input).await))
}
