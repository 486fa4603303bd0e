//! Result Persistence Gate: bounded per-resume analysis history.
//!
//! Trim-then-insert: when a resume already holds `MAX_ANALYSES_PER_RESUME` results,
//! everything but the newest `MAX_ANALYSES_PER_RESUME - 1` is deleted before the new
//! row goes in. The read, trim and insert are separate store calls; two saves for
//! the same resume racing each other can leave it briefly over the cap until the
//! next save trims it again.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::reducer::truncate_chars;
use crate::analysis::store::{AnalysisStore, NewAnalysis};
use crate::errors::AppError;
use crate::models::analysis::AnalysisResultRow;

pub const MAX_ANALYSES_PER_RESUME: usize = 3;
pub const DEFAULT_JOB_TITLE: &str = "General Analysis";
pub const JOB_TITLE_MAX_CHARS: usize = 30;

/// Label for a stored analysis: the first line of the job description, cut to
/// 30 characters, or [`DEFAULT_JOB_TITLE`] when there is nothing to show.
pub fn derive_job_title(job_description: &str) -> String {
    let first_line = job_description
        .trim_start()
        .lines()
        .next()
        .unwrap_or_default()
        .trim();

    if first_line.is_empty() {
        return DEFAULT_JOB_TITLE.to_string();
    }
    truncate_chars(first_line, JOB_TITLE_MAX_CHARS)
}

/// Applies the history bound for `resume_id`, then stores the new result.
///
/// Eviction failures are logged and do not block the insert; an insert failure
/// is returned as `AppError::Persistence`.
pub async fn save_analysis(
    store: &dyn AnalysisStore,
    resume_id: Uuid,
    job_description: &str,
    analysis_text: &str,
) -> Result<AnalysisResultRow, AppError> {
    evict_oldest(store, resume_id).await;

    let job_title = derive_job_title(job_description);
    let row = store
        .insert(NewAnalysis {
            resume_id,
            job_description,
            analysis_result: analysis_text,
            job_title: &job_title,
        })
        .await
        .map_err(|e| AppError::Persistence(format!("Failed to store analysis: {e:#}")))?;

    info!(
        "Stored analysis {} ('{}') for resume {}",
        row.id, row.job_title, resume_id
    );
    Ok(row)
}

/// Best-effort: keeps the newest `MAX - 1` results so the insert lands at the cap.
async fn evict_oldest(store: &dyn AnalysisStore, resume_id: Uuid) {
    let existing = match store.list_for_resume(resume_id).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Could not read analysis history for resume {resume_id}, skipping eviction: {e:#}");
            return;
        }
    };

    if existing.len() < MAX_ANALYSES_PER_RESUME {
        return;
    }

    let stale: Vec<Uuid> = existing
        .iter()
        .skip(MAX_ANALYSES_PER_RESUME - 1)
        .map(|r| r.id)
        .collect();

    match store.delete_many(&stale).await {
        Ok(deleted) => info!("Evicted {deleted} old analyses for resume {resume_id}"),
        Err(e) => warn!("Failed to evict old analyses for resume {resume_id}: {e:#}"),
    }
}

/// Newest-first history. A failed read yields an empty list.
pub async fn list_analyses(store: &dyn AnalysisStore, resume_id: Uuid) -> Vec<AnalysisResultRow> {
    store.list_for_resume(resume_id).await.unwrap_or_else(|e| {
        warn!("Failed to list analyses for resume {resume_id}: {e:#}");
        Vec::new()
    })
}

/// Deletes one result. Deleting a result that is already gone is a no-op.
pub async fn delete_analysis(
    store: &dyn AnalysisStore,
    resume_id: Uuid,
    analysis_id: Uuid,
) -> Result<(), AppError> {
    let deleted = store
        .delete_one(resume_id, analysis_id)
        .await
        .map_err(|e| AppError::Persistence(format!("Failed to delete analysis: {e:#}")))?;

    if deleted == 0 {
        debug!("Analysis {analysis_id} of resume {resume_id} already gone");
    }
    Ok(())
}
