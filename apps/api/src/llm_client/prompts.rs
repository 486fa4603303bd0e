// Shared prompt fragments.
// Feature modules define their own prompts.rs alongside them and pull
// cross-cutting fragments from here.

/// Enforces the raw-fragment output contract consumers rely on for safe rendering.
pub const HTML_FRAGMENT_ONLY: &str = "\
    OUTPUT FORMAT: Respond with a raw HTML fragment ONLY. \
    Allowed elements: <h3>, <p>, <ul>, <li>, <strong>. No other elements. \
    No attributes, no inline styles, no <style> or <script> blocks, \
    no <html>, <head> or <body> wrappers, no markdown, no code fences. \
    Do NOT write any text outside these elements. \
    Do NOT add greetings, commentary, explanations or apologies.";

/// Forbids suggestions that would make the candidate misrepresent themselves.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Never suggest fabricating or inflating experience. \
    Never recommend changing employment dates or durations, adding degrees, \
    certifications or credentials the resume does not list, or claiming a number \
    of years of experience to match the job posting. \
    Only recommend clarifying, quantifying or rewording what the resume already contains.";
