//! Storage seam for analysis results.
//!
//! `AppState` holds an `Arc<dyn AnalysisStore>`; production uses `PgAnalysisStore`,
//! tests use the in-memory store below. None of these calls are transactional
//! with each other.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::analysis::AnalysisResultRow;

/// Parameters for inserting one analysis result.
#[derive(Debug, Clone, Copy)]
pub struct NewAnalysis<'a> {
    pub resume_id: Uuid,
    pub job_description: &'a str,
    pub analysis_result: &'a str,
    pub job_title: &'a str,
}

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// All results for a resume, newest first.
    async fn list_for_resume(&self, resume_id: Uuid) -> Result<Vec<AnalysisResultRow>>;

    /// Deletes the given ids; returns how many rows went away.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64>;

    async fn insert(&self, new: NewAnalysis<'_>) -> Result<AnalysisResultRow>;

    /// Deletes one result of `resume_id`; returns how many rows went away (0 or 1).
    async fn delete_one(&self, resume_id: Uuid, id: Uuid) -> Result<u64>;
}

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn list_for_resume(&self, resume_id: Uuid) -> Result<Vec<AnalysisResultRow>> {
        Ok(sqlx::query_as::<_, AnalysisResultRow>(
            "SELECT * FROM resume_analyses WHERE resume_id = $1 ORDER BY created_at DESC",
        )
        .bind(resume_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        let result = sqlx::query("DELETE FROM resume_analyses WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, new: NewAnalysis<'_>) -> Result<AnalysisResultRow> {
        Ok(sqlx::query_as::<_, AnalysisResultRow>(
            r#"
            INSERT INTO resume_analyses (id, resume_id, job_description, analysis_result, job_title)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.resume_id)
        .bind(new.job_description)
        .bind(new.analysis_result)
        .bind(new.job_title)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_one(&self, resume_id: Uuid, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM resume_analyses WHERE id = $1 AND resume_id = $2")
            .bind(id)
            .bind(resume_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::{Duration, Utc};
    use tokio::sync::Barrier;

    use super::*;

    /// In-memory store with switchable failure injection.
    #[derive(Default)]
    pub(crate) struct MemoryAnalysisStore {
        rows: Mutex<Vec<AnalysisResultRow>>,
        pub(crate) fail_list: AtomicBool,
        pub(crate) fail_delete: AtomicBool,
        pub(crate) fail_insert: AtomicBool,
        /// When set, `list_for_resume` waits here after reading, so concurrent
        /// callers all observe the same snapshot.
        pub(crate) list_barrier: Option<Arc<Barrier>>,
    }

    impl MemoryAnalysisStore {
        pub(crate) fn with_barrier(barrier: Arc<Barrier>) -> Self {
            Self {
                list_barrier: Some(barrier),
                ..Default::default()
            }
        }

        /// Seeds `count` rows for `resume_id`, the i-th created `count - i` minutes ago.
        pub(crate) fn seed(&self, resume_id: Uuid, count: usize) -> Vec<AnalysisResultRow> {
            let now = Utc::now();
            let seeded: Vec<_> = (0..count)
                .map(|i| AnalysisResultRow {
                    id: Uuid::new_v4(),
                    resume_id,
                    job_description: format!("seed {i}"),
                    analysis_result: "<p>seed</p>".to_string(),
                    job_title: format!("seed {i}"),
                    created_at: now - Duration::minutes((count - i) as i64),
                })
                .collect();
            self.rows.lock().unwrap().extend(seeded.iter().cloned());
            seeded
        }

        pub(crate) fn rows_for(&self, resume_id: Uuid) -> Vec<AnalysisResultRow> {
            let mut rows: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.resume_id == resume_id)
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            rows
        }
    }

    #[async_trait]
    impl AnalysisStore for MemoryAnalysisStore {
        async fn list_for_resume(&self, resume_id: Uuid) -> Result<Vec<AnalysisResultRow>> {
            if self.fail_list.load(Ordering::SeqCst) {
                anyhow::bail!("list failed");
            }
            let rows = self.rows_for(resume_id);
            if let Some(barrier) = &self.list_barrier {
                barrier.wait().await;
            }
            Ok(rows)
        }

        async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
            if self.fail_delete.load(Ordering::SeqCst) {
                anyhow::bail!("delete failed");
            }
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| !ids.contains(&r.id));
            Ok((before - rows.len()) as u64)
        }

        async fn insert(&self, new: NewAnalysis<'_>) -> Result<AnalysisResultRow> {
            if self.fail_insert.load(Ordering::SeqCst) {
                anyhow::bail!("insert failed");
            }
            let row = AnalysisResultRow {
                id: Uuid::new_v4(),
                resume_id: new.resume_id,
                job_description: new.job_description.to_string(),
                analysis_result: new.analysis_result.to_string(),
                job_title: new.job_title.to_string(),
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn delete_one(&self, resume_id: Uuid, id: Uuid) -> Result<u64> {
            if self.fail_delete.load(Ordering::SeqCst) {
                anyhow::bail!("delete failed");
            }
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| !(r.id == id && r.resume_id == resume_id));
            Ok((before - rows.len()) as u64)
        }
    }
}
