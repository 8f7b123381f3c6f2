//! Reply-body JSON extraction
//!
//! Even with a JSON mime type requested, models sometimes wrap the document
//! in a Markdown fence or surround it with prose. Extraction is best-effort;
//! the typed decode afterwards is what actually validates the shape.

/// Pull the JSON document out of a model reply.
///
/// A leading ``` fence (with or without a language tag) is stripped along
/// with its closing fence; otherwise the span from the first `{` to the last
/// `}` is taken. Returns `None` when no object-like span exists.
pub fn extract_json(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if trimmed.starts_with("```") {
        let mut inner = trimmed;
        if let Some(after_tag) = inner.splitn(2, '\n').nth(1) {
            inner = after_tag;
        }
        if let Some(end) = inner.rfind("```") {
            inner = &inner[..end];
        }
        return Some(inner.trim().to_string());
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(trimmed[start..=end].trim().to_string())
}
