//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::gate::{delete_analysis, list_analyses};
use crate::analysis::markup::{extract_score, sanitize_fragment};
use crate::analysis::pipeline::run_analysis;
use crate::errors::AppError;
use crate::models::analysis::AnalysisResultRow;
use crate::resumes::handlers::UserIdQuery;
use crate::resumes::loader::{load_resume_record, require_owned_resume};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub job_description: Option<String>,
    /// Replacement credential supplied through the recovery flow.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// A stored analysis plus a render-safe copy of its markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisView {
    #[serde(flatten)]
    pub row: AnalysisResultRow,
    pub sanitized_html: String,
    pub score: Option<u8>,
}

impl From<AnalysisResultRow> for AnalysisView {
    fn from(row: AnalysisResultRow) -> Self {
        Self {
            sanitized_html: sanitize_fragment(&row.analysis_result),
            score: extract_score(&row.analysis_result),
            row,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/:id/analyses
///
/// Runs the ATS pipeline. 401 `INVALID_API_KEY` asks the client for a new key;
/// 503 `SERVICE_UNAVAILABLE` is final for this attempt.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<(StatusCode, Json<AnalysisView>), AppError> {
    let record = load_resume_record(&state.db, resume_id, req.user_id).await?;

    let row = run_analysis(
        state.llm.as_ref(),
        state.analyses.as_ref(),
        &record,
        req.job_description.as_deref(),
        req.api_key.as_deref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/resumes/:id/analyses
pub async fn handle_list_analyses(
    State(state): State<AppState>,
    Path(resume_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<AnalysisView>>, AppError> {
    require_owned_resume(&state.db, resume_id, params.user_id).await?;
    let rows = list_analyses(state.analyses.as_ref(), resume_id).await;
    Ok(Json(rows.into_iter().map(AnalysisView::from).collect()))
}

/// DELETE /api/v1/resumes/:id/analyses/:analysis_id
///
/// Idempotent: deleting an analysis that no longer exists still returns 204.
pub async fn handle_delete_analysis(
    State(state): State<AppState>,
    Path((resume_id, analysis_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    require_owned_resume(&state.db, resume_id, params.user_id).await?;
    delete_analysis(state.analyses.as_ref(), resume_id, analysis_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_analyze_request_optional_fields() {
        let json = serde_json::json!({ "user_id": Uuid::new_v4() });
        let req: AnalyzeRequest = serde_json::from_value(json).unwrap();
        assert!(req.job_description.is_none());
        assert!(req.api_key.is_none());
    }

    #[test]
    fn test_view_is_flat_and_sanitized() {
        let row = AnalysisResultRow {
            id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            job_description: String::new(),
            analysis_result: "<h3 style=\"x\">ATS Score: 64/100</h3><script>x</script>".into(),
            job_title: "General Analysis".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(AnalysisView::from(row)).unwrap();
        assert_eq!(value["job_title"], "General Analysis");
        assert_eq!(value["sanitized_html"], "<h3>ATS Score: 64/100</h3>");
        assert_eq!(value["score"], 64);
        assert!(value["analysis_result"].as_str().unwrap().contains("<script>"));
    }
}
