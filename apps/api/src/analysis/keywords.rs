//! Closed-world keyword check: every keyword the backend lists as missing must
//! occur in the job description it was given.

use crate::analysis::markup::{list_items_after, strip_tags};
use crate::analysis::prompts::MISSING_KEYWORDS_HEADING;

/// Plain items longer than this are treated as sentences ("No keyword gaps were
/// found."), not keywords.
const MAX_PLAIN_KEYWORD_WORDS: usize = 4;

/// Keyword named by one list item: the bold run if present, else the text
/// before the first separator.
fn keyword_of(item: &str) -> Option<String> {
    let lower = item.to_ascii_lowercase();
    for (open, close) in [("<strong>", "</strong>"), ("<b>", "</b>")] {
        if let Some(start) = lower.find(open) {
            let start = start + open.len();
            if let Some(len) = lower[start..].find(close) {
                return clean(&strip_tags(&item[start..start + len]));
            }
        }
    }

    let text = strip_tags(item);
    let head = [":", " - ", " – ", " — "]
        .iter()
        .filter_map(|sep| text.find(sep))
        .min()
        .map(|idx| &text[..idx]);

    match head {
        Some(head) => clean(head),
        None if text.split_whitespace().count() <= MAX_PLAIN_KEYWORD_WORDS => clean(&text),
        None => None,
    }
}

fn clean(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.' | ','))
        .trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Keywords listed under "Missing Keywords" that do not occur (case-insensitive
/// substring) in `job_description`.
pub fn ungrounded_keywords(analysis: &str, job_description: &str) -> Vec<String> {
    let haystack = job_description.to_lowercase();
    list_items_after(analysis, MISSING_KEYWORDS_HEADING)
        .iter()
        .filter_map(|item| keyword_of(item))
        .filter(|keyword| !haystack.contains(&keyword.to_lowercase()))
        .collect()
}
