//! Axum route handlers for the Resume API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRecord;
use crate::resumes::duplicate::{duplicate_resume, DuplicateResponse};
use crate::resumes::loader::load_resume_record;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateRequest {
    pub user_id: Uuid,
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = load_resume_record(&state.db, resume_id, params.user_id).await?;
    Ok(Json(record))
}

/// POST /api/v1/resumes/:id/duplicate
pub async fn handle_duplicate_resume(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(req): Json<DuplicateRequest>,
) -> Result<(StatusCode, Json<DuplicateResponse>), AppError> {
    let response = duplicate_resume(&state.db, resume_id, req.user_id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
