use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::review::ResumeReview;
use crate::resume::analyzer::{analyze_resume, ResumeAnalysisOutcome};
use crate::resume::extraction::dispatch_extraction;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// POST /api/v1/resumes/analyze (multipart)
///
/// Fields: `user_id`, `target_role`, and one `resume` file part. The upload
/// is stored first so the review can reference it; extraction and analysis
/// follow. An analysis failure leaves the stored file behind with no review
/// row pointing at it.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeAnalysisOutcome>, AppError> {
    let mut user_id: Option<Uuid> = None;
    let mut target_role: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(e.to_string()))?;
                user_id = Some(
                    text.parse()
                        .map_err(|_| AppError::InvalidInput("user_id must be a UUID".to_string()))?,
                );
            }
            Some("target_role") => {
                target_role = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::InvalidInput(e.to_string()))?,
                );
            }
            Some("resume") => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Reading upload: {e}")))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let user_id =
        user_id.ok_or_else(|| AppError::InvalidInput("user_id is required".to_string()))?;
    let target_role =
        target_role.ok_or_else(|| AppError::InvalidInput("Target job role is required".to_string()))?;
    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::InvalidInput("No resume file uploaded".to_string()))?;

    let extracted =
        dispatch_extraction(state.extractor.as_ref(), &file_name, &content_type, &bytes)?;
    let file_ref = state.files.save(&file_name, &bytes).await?;

    let outcome = analyze_resume(
        state.store.as_ref(),
        state.llm.as_ref(),
        user_id,
        &target_role,
        &extracted,
        file_ref,
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /api/v1/resumes/reviews
pub async fn handle_list_reviews(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeReview>>, AppError> {
    let reviews = state.store.list_reviews(params.user_id).await?;
    Ok(Json(reviews))
}

/// GET /api/v1/resumes/reviews/:id
pub async fn handle_get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeReview>, AppError> {
    let review = state
        .store
        .get_review(&id, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume review {id} not found")))?;
    Ok(Json(review))
}

/// DELETE /api/v1/resumes/reviews/:id
///
/// Removes the review record and signals deletion of its stored file.
pub async fn handle_delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    let file_ref = state
        .store
        .delete_review(&id, params.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume review {id} not found")))?;

    state.files.delete(&file_ref).await?;
    Ok(StatusCode::NO_CONTENT)
}
