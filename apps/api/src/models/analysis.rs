use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored ATS critique. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisResultRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    /// Verbatim input; empty string when no job description was supplied.
    pub job_description: String,
    /// Raw fragment returned by the generation backend.
    pub analysis_result: String,
    pub job_title: String,
    pub created_at: DateTime<Utc>,
}
