use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{
    CertificationRow, EducationRow, LanguageRow, PersonalInfoRow, ResumeRecord, ResumeRow,
    SkillRow, WorkExperienceRow,
};

/// Returns the resume row if it exists and belongs to `user_id`.
pub async fn find_owned_resume(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(resume_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Like [`find_owned_resume`], but a missing resume is a `NotFound` error.
pub async fn require_owned_resume(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<ResumeRow, AppError> {
    find_owned_resume(pool, resume_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))
}

/// Loads a resume and every child relation.
pub async fn load_resume_record(
    pool: &PgPool,
    resume_id: Uuid,
    user_id: Uuid,
) -> Result<ResumeRecord, AppError> {
    let resume = require_owned_resume(pool, resume_id, user_id).await?;

    let personal_info = sqlx::query_as::<_, PersonalInfoRow>(
        "SELECT * FROM personal_info WHERE resume_id = $1",
    )
    .bind(resume_id)
    .fetch_optional(pool)
    .await?;

    let work_experience = sqlx::query_as::<_, WorkExperienceRow>(
        "SELECT * FROM work_experience WHERE resume_id = $1 ORDER BY sort_order, start_date DESC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?;

    let education = sqlx::query_as::<_, EducationRow>(
        "SELECT * FROM education WHERE resume_id = $1 ORDER BY sort_order, start_date DESC",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?;

    let skills = sqlx::query_as::<_, SkillRow>(
        "SELECT * FROM skills WHERE resume_id = $1 ORDER BY sort_order, name",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?;

    let languages =
        sqlx::query_as::<_, LanguageRow>("SELECT * FROM languages WHERE resume_id = $1 ORDER BY name")
            .bind(resume_id)
            .fetch_all(pool)
            .await?;

    let certifications = sqlx::query_as::<_, CertificationRow>(
        "SELECT * FROM certifications WHERE resume_id = $1 ORDER BY date_acquired DESC NULLS LAST",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?;

    Ok(ResumeRecord {
        resume,
        personal_info,
        work_experience: Some(work_experience),
        education: Some(education),
        skills: Some(skills),
        languages: Some(languages),
        certifications: Some(certifications),
    })
}
