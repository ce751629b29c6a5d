//! Display cleanup for the annotated text the extraction model returns.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BOLD: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.*?)\*").unwrap();
    static ref HEADING: Regex = Regex::new(r"(?m)^#{1,6}[ \t]").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`(.*?)`").unwrap();
    static ref BLANK_RUN: Regex = Regex::new(r"\n\s*\n").unwrap();
}

/// Strips emphasis, heading and inline-code markers and collapses blank-line
/// runs. Rules run once each, in order, on the previous rule's output.
pub fn format_result(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    if raw.is_empty() {
        return String::new();
    }

    let text = BOLD.replace_all(raw, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
