//! Inline span scanning for bold, italic, code and link tokens.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Typed segment of a single line of inline content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
    Code(String),
    Link { text: String, url: String },
}

impl Span {
    /// Returns the visible text of the span with markup delimiters removed.
    ///
    /// Links display their label; the target URL is not part of the text.
    pub fn display_text(&self) -> &str {
        match self {
            Span::Text(text) | Span::Bold(text) | Span::Italic(text) | Span::Code(text) => text,
            Span::Link { text, .. } => text,
        }
    }

    /// Reconstructs the markup this span was scanned from.
    pub fn to_source(&self) -> String {
        match self {
            Span::Text(text) => text.clone(),
            Span::Bold(text) => format!("**{}**", text),
            Span::Italic(text) => format!("*{}*", text),
            Span::Code(text) => format!("`{}`", text),
            Span::Link { text, url } => format!("[{}]({})", text, url),
        }
    }
}

/// Bold, italic, code and link tokens in priority order.
///
/// Each group captures the shortest non-empty run of non line-break
/// characters up to its closing delimiter.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\*\*([^\n\r\x{2028}\x{2029}]+?)\*\*",
        r"|\*([^\n\r\x{2028}\x{2029}]+?)\*",
        r"|`([^\n\r\x{2028}\x{2029}]+?)`",
        r"|\[([^\n\r\x{2028}\x{2029}]+?)\]\(([^\n\r\x{2028}\x{2029}]+?)\)",
    ))
    .unwrap()
});

/// Scans one line of inline content into spans.
///
/// Tokens are matched left to right. At each position the candidates are
/// tried in the order bold, italic, code, link; the first one that matches
/// wins and the scan resumes after it. Text between tokens is emitted
/// verbatim, so unmatched delimiters fall through as plain text.
///
/// # Arguments
///
/// * `text`: Inline source without line breaks
///
/// # Returns
///
/// Spans in source order. Input without any token yields a single
/// [`Span::Text`] holding the whole input, including the empty string.
pub fn render_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in TOKEN_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if last < whole.start() {
            spans.push(Span::Text(text[last..whole.start()].to_string()));
        }

        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        let span = if let Some(inner) = group(1) {
            Span::Bold(inner)
        } else if let Some(inner) = group(2) {
            Span::Italic(inner)
        } else if let Some(inner) = group(3) {
            Span::Code(inner)
        } else {
            Span::Link {
                text: group(4).unwrap_or_default(),
                url: group(5).unwrap_or_default(),
            }
        };
        spans.push(span);
        last = whole.end();
    }

    if last < text.len() || spans.is_empty() {
        spans.push(Span::Text(text[last..].to_string()));
    }

    spans
}
