// src/utils/html.rs

use regex::Regex;
use std::sync::OnceLock;

static TAG_RE: OnceLock<Regex> = OnceLock::new();

/// Strips HTML markup from stored answer text.
///
/// Correct answers come out of the question bank wrapped in editor markup
/// (`<p>...</p>` and similar). Reports want the bare text, so every tag is
/// removed and surrounding whitespace trimmed. This is plain stripping, not
/// sanitization: the output goes into a spreadsheet cell, never back into
/// a browser.
pub fn strip_markup(input: &str) -> String {
    let re = TAG_RE.get_or_init(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid tag regex"));
    re.replace_all(input, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_paragraph_tags() {
        assert_eq!(strip_markup("<p>42</p>"), "42");
    }

    #[test]
    fn strips_nested_markup_and_trims() {
        assert_eq!(strip_markup(" <p><b>A and B</b></p> "), "A and B");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(strip_markup("x < y"), "x < y");
        assert_eq!(strip_markup("N/A"), "N/A");
    }
}
