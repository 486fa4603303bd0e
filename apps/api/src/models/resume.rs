use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub target_role: Option<String>,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct PersonalInfoRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct WorkExperienceRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub company: String,
    pub position: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct EducationRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub school: String,
    pub degree: String,
    pub field: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub gpa: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct LanguageRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub name: String,
    pub proficiency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct CertificationRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub name: String,
    pub issuer: Option<String>,
    pub date_acquired: Option<NaiveDate>,
    pub credential_url: Option<String>,
}

/// A resume with every child relation attached.
///
/// Each relation is optional: `None` (never loaded / sent as null) and an empty
/// collection mean the same thing to every consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub resume: ResumeRow,
    pub personal_info: Option<PersonalInfoRow>,
    pub work_experience: Option<Vec<WorkExperienceRow>>,
    pub education: Option<Vec<EducationRow>>,
    pub skills: Option<Vec<SkillRow>>,
    pub languages: Option<Vec<LanguageRow>>,
    pub certifications: Option<Vec<CertificationRow>>,
}
