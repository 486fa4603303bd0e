//! ATS analysis pipeline.
//!
//! Flow: reduce_resume → compile_prompt → backend.complete → keyword grounding
//!       check → save_analysis (bounded history) → stored row.
//!
//! Credential problems surface as `AnalysisError::Auth` so the caller can ask the
//! user for a replacement key and run the pipeline again.

use tracing::{info, warn};

use crate::analysis::compiler::{compile_prompt, effective_job_description};
use crate::analysis::gate::save_analysis;
use crate::analysis::keywords::ungrounded_keywords;
use crate::analysis::reducer::reduce_resume;
use crate::analysis::store::AnalysisStore;
use crate::errors::AppError;
use crate::llm_client::GenerationBackend;
use crate::models::analysis::AnalysisResultRow;
use crate::models::resume::ResumeRecord;

pub async fn run_analysis(
    backend: &dyn GenerationBackend,
    store: &dyn AnalysisStore,
    resume: &ResumeRecord,
    job_description: Option<&str>,
    credential: Option<&str>,
) -> Result<AnalysisResultRow, AppError> {
    let resume_id = resume.resume.id;
    let effective_jd = effective_job_description(job_description);
    info!(
        "Running ATS analysis for resume {} (job description: {})",
        resume_id,
        if effective_jd.is_some() { "yes" } else { "no" }
    );

    let projection = reduce_resume(resume);
    let prompt = compile_prompt(&projection, effective_jd)?;

    let analysis = backend
        .complete(&prompt.system, &prompt.user, credential)
        .await?;

    if let Some(jd) = effective_jd {
        let ungrounded = ungrounded_keywords(&analysis, jd);
        if !ungrounded.is_empty() {
            warn!(
                "Analysis for resume {} lists keywords absent from the job description: {:?}",
                resume_id, ungrounded
            );
        }
    }

    save_analysis(store, resume_id, job_description.unwrap_or_default(), &analysis).await
}
