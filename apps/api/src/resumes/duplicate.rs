//! Resume duplication. Parent row first, then every child table copied in parallel.
//!
//! Best-effort: a failed child copy is logged and skipped. Nothing is rolled back,
//! not the sibling copies and not the new parent row.

use std::future::Future;

use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::loader::require_owned_resume;

/// Child tables copied on duplication, with the columns carried over.
/// Analyses are deliberately absent: a copy starts with an empty history.
const CHILD_TABLES: &[(&str, &str)] = &[
    (
        "personal_info",
        "full_name, email, phone, location, website, linkedin, github, summary",
    ),
    (
        "work_experience",
        "company, position, location, start_date, end_date, current, description, sort_order",
    ),
    (
        "education",
        "school, degree, field, start_date, end_date, gpa, sort_order",
    ),
    ("skills", "name, category, sort_order"),
    ("languages", "name, proficiency"),
    (
        "certifications",
        "name, issuer, date_acquired, credential_url",
    ),
];

#[derive(Debug, Default, Serialize)]
pub struct CopyReport {
    pub copied: Vec<(&'static str, u64)>,
    pub failed: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DuplicateResponse {
    pub resume: ResumeRow,
    pub copy_report: CopyReport,
}

pub async fn duplicate_resume(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<DuplicateResponse, AppError> {
    let source = require_owned_resume(pool, resume_id, user_id).await?;

    let copy = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (id, user_id, name, target_role, template)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(format!("{} (Copy)", source.name))
    .bind(&source.target_role)
    .bind(&source.template)
    .fetch_one(pool)
    .await?;

    let tasks = CHILD_TABLES
        .iter()
        .map(|&(table, columns)| {
            let pool = pool.clone();
            let target = copy.id;
            (table, async move {
                copy_child_table(&pool, table, columns, resume_id, target).await
            })
        })
        .collect();

    let copy_report = fan_out_best_effort(tasks).await;

    info!(
        "Duplicated resume {} into {} ({} tables copied, {} failed)",
        resume_id,
        copy.id,
        copy_report.copied.len(),
        copy_report.failed.len()
    );

    Ok(DuplicateResponse {
        resume: copy,
        copy_report,
    })
}

async fn copy_child_table(
    pool: &PgPool,
    table: &str,
    columns: &str,
    source: Uuid,
    target: Uuid,
) -> Result<u64> {
    // Table and column names come from CHILD_TABLES, never from input.
    let sql = format!(
        "INSERT INTO {table} (id, resume_id, {columns}) \
         SELECT gen_random_uuid(), $1, {columns} FROM {table} WHERE resume_id = $2"
    );
    let result = sqlx::query(&sql)
        .bind(target)
        .bind(source)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Launches every task at once and waits for all of them. Failures, panics
/// included, are logged per task and collected; they never cancel the others.
pub async fn fan_out_best_effort<F>(tasks: Vec<(&'static str, F)>) -> CopyReport
where
    F: Future<Output = Result<u64>> + Send + 'static,
{
    let handles: Vec<_> = tasks
        .into_iter()
        .map(|(name, task)| (name, tokio::spawn(task)))
        .collect();

    let mut report = CopyReport::default();
    for (name, handle) in handles {
        match handle.await {
            Ok(Ok(rows)) => report.copied.push((name, rows)),
            Ok(Err(e)) => {
                warn!("Copying {name} failed, continuing without it: {e:#}");
                report.failed.push(name);
            }
            Err(e) => {
                warn!("Copy task for {name} aborted, continuing without it: {e}");
                report.failed.push(name);
            }
        }
    }
    report.copied.sort_by_key(|(name, _)| *name);
    report.failed.sort();
    report
}
