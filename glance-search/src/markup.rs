//! Markup stripping for API text fields.
//!
//! Instant-answer fields may carry inline HTML (anchors, emphasis). Before
//! display we keep only the visible text, with entities decoded.

use scraper::Html;

/// Remove all markup tags from `html`, returning the visible text content.
///
/// Entities are decoded and surrounding whitespace is trimmed. Plain text
/// passes through unchanged apart from trimming.
pub fn strip_markup(html: &str) -> String {
    if !html.contains('<') && !html.contains('&') {
        return html.trim().to_owned();
    }
    let fragment = Html::parse_fragment(html);
    fragment
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_markup("  Rust language  "), "Rust language");
    }

    #[test]
    fn removes_anchor_and_keeps_text() {
        let html = r#"<a href="https://www.rust-lang.org/">Rust</a>Official site"#;
        assert_eq!(strip_markup(html), "RustOfficial site");
    }

    #[test]
    fn removes_nested_inline_formatting() {
        let html = "The <b>Rust</b> <i>programming <em>language</em></i>";
        assert_eq!(strip_markup(html), "The Rust programming language");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(strip_markup("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn empty_input_returns_empty() {
        assert_eq!(strip_markup(""), "");
        assert_eq!(strip_markup("<br/>"), "");
    }
}
