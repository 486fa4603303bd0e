//! Resume Data Reducer: the token-efficient view of a resume sent to the backend.
//!
//! Drops identifiers, timestamps, ownership and presentation fields. Pure; no I/O.

use serde::{Deserialize, Serialize};

use crate::models::resume::{ResumeRecord, WorkExperienceRow};

/// Work-experience descriptions are cut to this many characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeProjection {
    pub personal: PersonalProjection,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub experience: Vec<ExperienceProjection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub education: Vec<EducationProjection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalProjection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceProjection {
    pub role: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationProjection {
    pub degree: String,
    pub school: String,
}

impl ResumeProjection {
    /// True when nothing ATS-relevant survived the reduction.
    pub fn is_empty(&self) -> bool {
        self.personal.summary.is_none()
            && self.personal.location.is_none()
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.languages.is_empty()
            && self.certifications.is_empty()
    }
}

/// Reduces a full resume record to its ATS projection.
pub fn reduce_resume(record: &ResumeRecord) -> ResumeProjection {
    let personal = record
        .personal_info
        .as_ref()
        .map(|p| PersonalProjection {
            summary: p.summary.clone(),
            location: p.location.clone(),
        })
        .unwrap_or_default();

    ResumeProjection {
        personal,
        experience: each(&record.work_experience, reduce_experience),
        education: each(&record.education, |e| EducationProjection {
            degree: e.degree.clone(),
            school: e.school.clone(),
        }),
        skills: each(&record.skills, |s| s.name.clone()),
        languages: each(&record.languages, |l| l.name.clone()),
        certifications: each(&record.certifications, |c| c.name.clone()),
    }
}

fn reduce_experience(row: &WorkExperienceRow) -> ExperienceProjection {
    ExperienceProjection {
        role: row.position.clone(),
        company: row.company.clone(),
        description: row
            .description
            .as_deref()
            .map(|d| truncate_chars(d, MAX_DESCRIPTION_CHARS)),
        is_current: row.current,
    }
}

/// Maps an optional relation element-wise; a missing relation yields an empty list.
fn each<T, U>(rows: &Option<Vec<T>>, f: impl Fn(&T) -> U) -> Vec<U> {
    rows.as_deref().unwrap_or_default().iter().map(f).collect()
}

/// Keeps the first `max` characters (not bytes) of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::resume::{
        CertificationRow, EducationRow, LanguageRow, PersonalInfoRow, ResumeRow, SkillRow,
    };
    use chrono::Utc;
    use uuid::Uuid;

    pub(crate) fn empty_record() -> ResumeRecord {
        ResumeRecord {
            resume: ResumeRow {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                name: "My Resume".to_string(),
                target_role: None,
                template: "classic".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            personal_info: None,
            work_experience: None,
            education: None,
            skills: None,
            languages: None,
            certifications: None,
        }
    }

    pub(crate) fn experience(description: Option<String>) -> WorkExperienceRow {
        WorkExperienceRow {
            id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            company: "Acme".to_string(),
            position: "Backend Engineer".to_string(),
            current: true,
            description,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_relations_yield_empty_projection() {
        let projection = reduce_resume(&empty_record());
        assert!(projection.is_empty());
        assert_eq!(projection.personal.summary, None);
    }

    #[test]
    fn test_missing_and_empty_relations_are_equivalent() {
        let mut with_empty = empty_record();
        with_empty.work_experience = Some(vec![]);
        with_empty.skills = Some(vec![]);
        assert_eq!(reduce_resume(&with_empty), reduce_resume(&empty_record()));
    }

    #[test]
    fn test_long_description_truncated_to_1000() {
        let mut record = empty_record();
        record.work_experience = Some(vec![experience(Some("x".repeat(1500)))]);
        let projection = reduce_resume(&record);
        let description = projection.experience[0].description.as_ref().unwrap();
        assert_eq!(description.chars().count(), 1000);
    }

    #[test]
    fn test_short_description_unchanged() {
        let text = "y".repeat(500);
        let mut record = empty_record();
        record.work_experience = Some(vec![experience(Some(text.clone()))]);
        let projection = reduce_resume(&record);
        assert_eq!(projection.experience[0].description.as_deref(), Some(text.as_str()));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(1200);
        let truncated = truncate_chars(&text, MAX_DESCRIPTION_CHARS);
        assert_eq!(truncated.chars().count(), 1000);
        assert_eq!(truncated.len(), 2000);
    }

    #[test]
    fn test_no_personal_info_with_long_experience() {
        let mut record = empty_record();
        record.work_experience = Some(vec![experience(Some("z".repeat(1200)))]);
        let projection = reduce_resume(&record);
        assert_eq!(projection.personal.summary, None);
        assert_eq!(
            projection.experience[0]
                .description
                .as_ref()
                .unwrap()
                .chars()
                .count(),
            1000
        );
    }

    #[test]
    fn test_only_names_kept_for_named_collections() {
        let resume_id = Uuid::new_v4();
        let mut record = empty_record();
        record.personal_info = Some(PersonalInfoRow {
            email: Some("jane@example.com".to_string()),
            summary: Some("Backend engineer".to_string()),
            location: Some("Berlin".to_string()),
            ..Default::default()
        });
        record.education = Some(vec![EducationRow {
            resume_id,
            school: "TU Berlin".to_string(),
            degree: "BSc Computer Science".to_string(),
            gpa: Some("1.3".to_string()),
            ..Default::default()
        }]);
        record.skills = Some(vec![SkillRow {
            resume_id,
            name: "Rust".to_string(),
            category: Some("Languages".to_string()),
            ..Default::default()
        }]);
        record.languages = Some(vec![LanguageRow {
            resume_id,
            name: "German".to_string(),
            proficiency: Some("Native".to_string()),
            ..Default::default()
        }]);
        record.certifications = Some(vec![CertificationRow {
            resume_id,
            name: "CKA".to_string(),
            issuer: Some("CNCF".to_string()),
            ..Default::default()
        }]);

        let projection = reduce_resume(&record);
        assert_eq!(projection.personal.summary.as_deref(), Some("Backend engineer"));
        assert_eq!(projection.personal.location.as_deref(), Some("Berlin"));
        assert_eq!(projection.skills, vec!["Rust"]);
        assert_eq!(projection.languages, vec!["German"]);
        assert_eq!(projection.certifications, vec!["CKA"]);
        assert_eq!(projection.education[0].degree, "BSc Computer Science");

        let json = serde_json::to_string(&projection).unwrap();
        assert!(!json.contains(&resume_id.to_string()));
        assert!(!json.contains("jane@example.com"));
        assert!(!json.contains("CNCF"));
        assert!(!json.contains("created_at"));
    }
}
