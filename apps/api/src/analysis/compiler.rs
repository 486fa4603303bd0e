//! Prompt Compiler. Turns a projection and optional job description into the
//! (system instruction, user message) pair sent to the generation backend.
//!
//! Deterministic: the only branch is whether a job description is present.

use serde::Serialize;

use crate::analysis::prompts::{
    ATS_SYSTEM_TEMPLATE, GENERAL_MODE_NOTE, JOB_DESCRIPTION_SECTION_LABEL, KEYWORD_DEDUCTION_GENERAL,
    KEYWORD_DEDUCTION_WITH_JD, KEYWORD_GAPS_HEADING, KEYWORD_RULE_GENERAL, KEYWORD_RULE_WITH_JD,
    MISSING_KEYWORDS_HEADING, RESUME_SECTION_LABEL, ROLE_LINE_GENERAL, ROLE_LINE_WITH_JD,
    SKILLS_DEDUCTION_GENERAL, SKILLS_DEDUCTION_WITH_JD,
};
use crate::analysis::reducer::ResumeProjection;
use crate::llm_client::prompts::{HTML_FRAGMENT_ONLY, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::AnalysisError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledPrompt {
    pub system: String,
    pub user: String,
}

/// Returns the job description if it carries any text.
pub fn effective_job_description(job_description: Option<&str>) -> Option<&str> {
    job_description.map(str::trim).filter(|jd| !jd.is_empty())
}

/// Heading the backend is told to use for the keyword section.
pub fn keyword_heading(job_description: Option<&str>) -> &'static str {
    match effective_job_description(job_description) {
        Some(_) => MISSING_KEYWORDS_HEADING,
        None => KEYWORD_GAPS_HEADING,
    }
}

pub fn compile_prompt(
    projection: &ResumeProjection,
    job_description: Option<&str>,
) -> Result<CompiledPrompt, AnalysisError> {
    let job_description = effective_job_description(job_description);

    let (role_line, keyword_rule, keyword_deduction, skills_deduction) = match job_description {
        Some(_) => (
            ROLE_LINE_WITH_JD,
            KEYWORD_RULE_WITH_JD,
            KEYWORD_DEDUCTION_WITH_JD,
            SKILLS_DEDUCTION_WITH_JD,
        ),
        None => (
            ROLE_LINE_GENERAL,
            KEYWORD_RULE_GENERAL,
            KEYWORD_DEDUCTION_GENERAL,
            SKILLS_DEDUCTION_GENERAL,
        ),
    };

    let system = ATS_SYSTEM_TEMPLATE
        .replace("{role_line}", role_line)
        .replace("{fragment_rule}", HTML_FRAGMENT_ONLY)
        .replace("{keyword_heading}", keyword_heading(job_description))
        .replace("{keyword_rule}", keyword_rule)
        .replace("{keyword_deduction}", keyword_deduction)
        .replace("{skills_deduction}", skills_deduction)
        .replace("{fabrication_rule}", NO_FABRICATION_INSTRUCTION);

    let resume_json = serde_json::to_string_pretty(projection)
        .map_err(|e| AnalysisError::Input(format!("Failed to serialize resume: {e}")))?;

    let mut user = format!("{RESUME_SECTION_LABEL}\n{resume_json}\n\n");
    match job_description {
        Some(jd) => {
            user.push_str(JOB_DESCRIPTION_SECTION_LABEL);
            user.push('\n');
            user.push_str(jd);
        }
        None => user.push_str(GENERAL_MODE_NOTE),
    }

    Ok(CompiledPrompt { system, user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::reducer::tests::{empty_record, experience};
    use crate::analysis::reducer::{reduce_resume, ExperienceProjection};

    fn projection() -> ResumeProjection {
        ResumeProjection {
            experience: vec![ExperienceProjection {
                role: "Backend Engineer".to_string(),
                company: "Acme".to_string(),
                description: Some("Built billing APIs".to_string()),
                is_current: true,
            }],
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let jd = Some("Senior Backend Engineer\nRust, Kafka");
        let a = compile_prompt(&projection(), jd).unwrap();
        let b = compile_prompt(&projection(), jd).unwrap();
        assert_eq!(a, b);

        let a = compile_prompt(&projection(), None).unwrap();
        let b = compile_prompt(&projection(), None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_job_description_selects_missing_keywords_heading() {
        let prompt = compile_prompt(&projection(), Some("Rust, Kafka")).unwrap();
        assert!(prompt.system.contains("<h3>Missing Keywords</h3>"));
        assert!(!prompt.system.contains(KEYWORD_GAPS_HEADING));
        assert!(prompt.system.contains("CLOSED-WORLD"));
        assert!(prompt.user.contains(JOB_DESCRIPTION_SECTION_LABEL));
        assert!(prompt.user.ends_with("Rust, Kafka"));
    }

    #[test]
    fn test_blank_job_description_is_general_review() {
        for jd in [None, Some(""), Some("   \n ")] {
            let prompt = compile_prompt(&projection(), jd).unwrap();
            assert!(prompt.system.contains("<h3>Keyword Gaps</h3>"), "{jd:?}");
            assert!(!prompt.system.contains(MISSING_KEYWORDS_HEADING));
            assert!(!prompt.user.contains(JOB_DESCRIPTION_SECTION_LABEL));
            assert!(prompt.user.contains(GENERAL_MODE_NOTE));
        }
    }

    #[test]
    fn test_no_personal_info_scenario_uses_keyword_gaps() {
        let mut record = empty_record();
        record.work_experience = Some(vec![experience(Some("d".repeat(1200)))]);
        let projection = reduce_resume(&record);
        let prompt = compile_prompt(&projection, Some("")).unwrap();
        assert_eq!(keyword_heading(Some("")), KEYWORD_GAPS_HEADING);
        assert!(prompt.system.contains(KEYWORD_GAPS_HEADING));
        assert!(!prompt.user.contains("summary"));
    }

    #[test]
    fn test_system_instruction_encodes_rubric_caps() {
        let prompt = compile_prompt(&projection(), Some("Rust")).unwrap();
        for cap in [
            "Up to 40 points",
            "Up to 30 points",
            "Up to 20 points",
            "Up to 10 points",
        ] {
            assert!(prompt.system.contains(cap), "missing {cap}");
        }
        assert!(prompt.system.contains("start at 100"));
    }

    #[test]
    fn test_system_instruction_restricts_markup_and_fabrication() {
        let prompt = compile_prompt(&projection(), None).unwrap();
        assert!(prompt.system.contains("<h3>, <p>, <ul>, <li>, <strong>"));
        assert!(prompt.system.contains("no <style> or <script>"));
        assert!(prompt.system.contains("Never suggest fabricating"));
        assert!(prompt.system.contains("Critical Fixes"));
        assert!(!prompt.system.contains('{'), "unfilled placeholder left in template");
    }

    #[test]
    fn test_user_message_carries_serialized_projection() {
        let prompt = compile_prompt(&projection(), None).unwrap();
        assert!(prompt.user.starts_with(RESUME_SECTION_LABEL));
        assert!(prompt.user.contains("\"role\": \"Backend Engineer\""));
        assert!(prompt.user.contains("\"PostgreSQL\""));
    }
}
