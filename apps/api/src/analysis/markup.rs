//! Helpers for the analysis output fragment: safe re-rendering, score extraction
//! and list-section lookup. Operates on the constrained markup the backend is
//! instructed to emit; anything outside that contract is dropped.

const ALLOWED_TAGS: &[&str] = &["h2", "h3", "h4", "p", "ul", "li", "strong", "b"];
/// Elements removed together with everything inside them.
const DROPPED_WITH_CONTENT: &[&str] = &["script", "style"];

struct Tag {
    name: String,
    closing: bool,
}

impl Tag {
    fn parse(inner: &str) -> Option<Tag> {
        let inner = inner.trim();
        let (closing, inner) = match inner.strip_prefix('/') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, inner),
        };
        let name: String = inner
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if name.is_empty() {
            return None;
        }
        Some(Tag { name, closing })
    }
}

/// Re-renders a stored analysis keeping only the allowed elements, with every
/// attribute removed. Text content is kept as-is, except that a `<` which does
/// not open a tag is escaped. The result is balanced: stray closing tags are
/// dropped and anything left open is closed at the end.
pub fn sanitize_fragment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut open: Vec<String> = Vec::new();
    let mut rest = raw;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        if !opens_markup(candidate) {
            out.push_str("&lt;");
            rest = &candidate[1..];
            continue;
        }
        let Some(end) = candidate.find('>') else {
            // Unterminated tag: keep it visible as text.
            out.push_str(&candidate.replace('<', "&lt;"));
            rest = "";
            break;
        };
        let tag = Tag::parse(&candidate[1..end]);
        rest = &candidate[end + 1..];

        match tag {
            Some(tag) if DROPPED_WITH_CONTENT.contains(&tag.name.as_str()) => {
                if !tag.closing {
                    rest = skip_past_closing(rest, &tag.name);
                }
            }
            Some(tag) if ALLOWED_TAGS.contains(&tag.name.as_str()) => {
                if !tag.closing {
                    out.push('<');
                    out.push_str(&tag.name);
                    out.push('>');
                    open.push(tag.name);
                } else if let Some(pos) = open.iter().rposition(|name| *name == tag.name) {
                    // Close everything opened inside it first.
                    for name in open.drain(pos..).rev() {
                        out.push_str("</");
                        out.push_str(&name);
                        out.push('>');
                    }
                }
            }
            _ => {}
        }
    }

    out.push_str(rest);
    for name in open.into_iter().rev() {
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
    }
    out
}

/// Whether `candidate` (starting at `<`) begins a tag, closing tag or comment
/// rather than a literal less-than sign.
fn opens_markup(candidate: &str) -> bool {
    match candidate[1..].chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '!' => true,
        Some('/') => candidate[2..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic()),
        _ => false,
    }
}

fn skip_past_closing<'a>(rest: &'a str, name: &str) -> &'a str {
    // ASCII lowercasing keeps byte offsets aligned with `rest`.
    let lower = rest.to_ascii_lowercase();
    let Some(idx) = lower.find(&format!("</{name}")) else {
        return "";
    };
    match rest[idx..].find('>') {
        Some(end) => &rest[idx + end + 1..],
        None => "",
    }
}

/// Removes every tag, leaving only text.
pub fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Reads the `NN/100` score from the scored header, if the output has one.
pub fn extract_score(text: &str) -> Option<u8> {
    text.match_indices("/100").find_map(|(idx, _)| {
        let before = text[..idx].trim_end();
        let digits_start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit())
            .last()
            .map(|(i, _)| i)?;
        before[digits_start..]
            .parse::<u8>()
            .ok()
            .filter(|score| *score <= 100)
    })
}

/// Inner markup of each `<li>` in the first `<ul>` following `heading`.
/// Heading match is case-insensitive.
pub fn list_items_after(fragment: &str, heading: &str) -> Vec<String> {
    let lower = fragment.to_ascii_lowercase();
    let Some(heading_idx) = lower.find(&heading.to_ascii_lowercase()) else {
        return Vec::new();
    };
    let Some(ul_rel) = lower[heading_idx..].find("<ul") else {
        return Vec::new();
    };
    let ul_start = heading_idx + ul_rel;
    let ul_end = lower[ul_start..]
        .find("</ul>")
        .map(|i| ul_start + i)
        .unwrap_or(lower.len());

    let mut items = Vec::new();
    let mut cursor = ul_start;
    while let Some(li_rel) = lower[cursor..ul_end].find("<li") {
        let li_start = cursor + li_rel;
        let Some(open_end) = lower[li_start..ul_end].find('>') else {
            break;
        };
        let content_start = li_start + open_end + 1;
        let content_end = lower[content_start..ul_end]
            .find("</li>")
            .map(|i| content_start + i)
            .unwrap_or(ul_end);
        items.push(fragment[content_start..content_end].trim().to_string());
        cursor = content_end;
    }
    items
}
