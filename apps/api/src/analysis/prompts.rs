// All LLM prompt constants for the ATS analysis module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Heading of the keyword section when a job description was supplied.
pub const MISSING_KEYWORDS_HEADING: &str = "Missing Keywords";
/// Heading of the keyword section for a general review.
pub const KEYWORD_GAPS_HEADING: &str = "Keyword Gaps";
pub const CRITICAL_FIXES_HEADING: &str = "Critical Fixes";

/// System instruction template.
/// Replace: {role_line}, {fragment_rule}, {keyword_heading}, {keyword_rule},
///          {keyword_deduction}, {skills_deduction}, {fabrication_rule}
pub const ATS_SYSTEM_TEMPLATE: &str = r#"You are an Applicant Tracking System (ATS) auditor. {role_line}

{fragment_rule}

Your response MUST contain exactly these three sections, in this order, and nothing else:

<h3>ATS Score: NN/100</h3>
<p>One sentence stating the main reason for the score.</p>

<h3>Critical Fixes</h3>
<ul>
<li>One concrete fix per item, naming the resume section it applies to.</li>
</ul>

<h3>{keyword_heading}</h3>
<ul>
<li><strong>keyword</strong>: where in the resume it belongs.</li>
</ul>

The "Critical Fixes" and "{keyword_heading}" sections MUST be <ul> lists, never paragraphs.
Give at most 5 items per list.

SCORING RUBRIC (deterministic; start at 100 and subtract, never go below 0):
- {keyword_deduction}
- Up to 30 points: experience descriptions that are vague or not quantified (no metrics, scope or outcomes).
- {skills_deduction}
- Up to 10 points: a weak or missing summary, or a summary that does not align with the roles listed.
Apply each deduction independently and never exceed its cap. Report the final integer as NN.

KEYWORD RULES:
{keyword_rule}

{fabrication_rule}"#;

pub const ROLE_LINE_WITH_JD: &str =
    "Audit the candidate resume against the supplied job description.";
pub const ROLE_LINE_GENERAL: &str =
    "Audit the candidate resume for general ATS readiness; no job description was supplied.";

pub const KEYWORD_DEDUCTION_WITH_JD: &str = "Up to 40 points: important keywords from the JOB DESCRIPTION that are missing from the resume or only weakly present. Keywords MUST come from the job description text only; never invent them.";
pub const KEYWORD_DEDUCTION_GENERAL: &str = "Up to 40 points: weak keyword density for the roles the resume itself lists (titles, tools and skills named in the resume).";

pub const SKILLS_DEDUCTION_WITH_JD: &str = "Up to 20 points: skills that appear in the JOB DESCRIPTION and in the resume skills list but are never used in the experience descriptions.";
pub const SKILLS_DEDUCTION_GENERAL: &str = "Up to 20 points: skills listed in the resume that are never used in the experience descriptions.";

pub const KEYWORD_RULE_WITH_JD: &str = "\
- This is a CLOSED-WORLD task. Every keyword you list MUST appear verbatim in the JOB DESCRIPTION text.
- Do NOT infer, generalise, expand abbreviations or add synonyms beyond that text.
- Do NOT list a keyword that already appears in the resume.
- If no keyword qualifies, output a single <li> stating that no keyword gaps were found.";
pub const KEYWORD_RULE_GENERAL: &str = "\
- List only standard terms for the job titles already present in the resume.
- Do NOT suggest keywords for roles, industries or technologies the resume does not mention.
- If no keyword qualifies, output a single <li> stating that no keyword gaps were found.";

/// Label heading the serialized resume in the user message.
pub const RESUME_SECTION_LABEL: &str = "RESUME DATA (JSON):";
/// Label heading the job description in the user message.
pub const JOB_DESCRIPTION_SECTION_LABEL: &str = "JOB DESCRIPTION:";
pub const GENERAL_MODE_NOTE: &str =
    "ANALYSIS MODE: General ATS review. No job description was supplied.";
