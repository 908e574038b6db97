//! Utility functions for text cleanup, links and logging.
//!
//! This module provides helper functions used throughout the application:
//! - Markup stripping and whitespace collapsing for upstream article text
//! - Markdown escaping for rendered results
//! - Search-link construction for articles without a URL
//! - String truncation for log previews

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Collapse every run of whitespace into a single space and trim the ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(collapse_whitespace("  a \n\t b "), "a b");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Strip HTML tags and decode entities, keeping only the text nodes.
///
/// Text nodes are joined with a space so block elements like `<p>` and
/// `<br>` don't glue words together. Input without `<` or `&` is
/// returned unchanged.
pub fn strip_markup(s: &str) -> String {
    if !s.contains('<') && !s.contains('&') {
        return s.to_string();
    }
    let fragment = Html::parse_fragment(s);
    fragment.root_element().text().collect::<Vec<_>>().join(" ")
}

/// Strip markup, then collapse whitespace.
pub fn clean_text(s: &str) -> String {
    collapse_whitespace(&strip_markup(s))
}

/// Escape characters that would otherwise be read as markdown formatting.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']' | '<' | '>' | '#') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Build a Google search URL for a headline.
///
/// Used as the "read more" link when an article carries no URL of its own.
pub fn google_search_url(query: &str) -> String {
    format!(
        "https://www.google.com/search?q={}",
        urlencoding::encode(query.trim())
    )
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (backing off to a
/// character boundary) with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log_short_string() {
        let s = "Hello, world!";
        assert_eq!(truncate_for_log(s, 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_multibyte_boundary() {
        // "é" is two bytes; cutting at 1 must back off to 0.
        let result = truncate_for_log("éé", 1);
        assert_eq!(result, "…(+4 bytes)");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b "), "a b");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("plain text"), "plain text");
        assert_eq!(clean_text("<b>Bold</b> move"), "Bold move");
        assert_eq!(clean_text("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a*b_c"), "a\\*b\\_c");
        assert_eq!(escape_markdown("[link](x)"), "\\[link\\](x)");
        assert_eq!(escape_markdown("plain"), "plain");
    }

    #[test]
    fn test_google_search_url() {
        assert_eq!(
            google_search_url("Rust 2024 edition"),
            "https://www.google.com/search?q=Rust%202024%20edition"
        );
    }
}
