//! Line oriented block parsing.

use serde::Serialize;
use std::ops::Range;

use super::inline::{Span, render_inline};

/// Deepest heading level recognized by the block pass.
const MAX_HEADING_LEVEL: usize = 4;

/// Opening and closing marker of a fenced code block.
const FENCE: &str = "```";

/// List item marker flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// One parsed block of content.
///
/// Every source line maps to exactly one block, except fenced code where a
/// single [`Block::CodeBlock`] consumes the fence lines and everything in
/// between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Span>,
    },
    Paragraph(Vec<Span>),
    ListItem {
        kind: ListKind,
        /// Whitespace characters before the marker.
        depth: usize,
        content: Vec<Span>,
    },
    Blockquote(Vec<Span>),
    CodeBlock {
        lang: Option<String>,
        lines: Vec<String>,
    },
    Rule,
    Blank,
}

impl Block {
    /// Returns inline spans for blocks that carry them.
    pub fn spans(&self) -> Option<&[Span]> {
        match self {
            Block::Heading { content, .. }
            | Block::Paragraph(content)
            | Block::ListItem { content, .. }
            | Block::Blockquote(content) => Some(content),
            Block::CodeBlock { .. } | Block::Rule | Block::Blank => None,
        }
    }

    /// Concatenated display text of the block.
    ///
    /// Code blocks join their raw lines with newlines. Rules and blank lines
    /// have no text.
    pub fn plain_text(&self) -> String {
        match self {
            Block::CodeBlock { lines, .. } => lines.join("\n"),
            _ => self
                .spans()
                .map(|spans| spans.iter().map(Span::display_text).collect())
                .unwrap_or_default(),
        }
    }
}

/// Block paired with the range of source lines it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlock {
    pub lines: Range<usize>,
    pub block: Block,
}

/// Parses markdown subset source into blocks.
///
/// Never fails: any input has a defined interpretation, with unknown
/// constructs degrading to paragraphs and unmatched inline delimiters to
/// plain text.
///
/// # Arguments
///
/// * `raw`: Source text, split into lines on `\n`
///
/// # Returns
///
/// Blocks in source order
pub fn render(raw: &str) -> Vec<Block> {
    render_spanned(raw)
        .into_iter()
        .map(|source| source.block)
        .collect()
}

/// Parses source into blocks annotated with their source line ranges.
///
/// The returned ranges are contiguous, start at line zero and together
/// cover every input line.
///
/// # Arguments
///
/// * `raw`: Source text, split into lines on `\n`; a trailing `\r` on each
///   line is dropped
///
/// # Returns
///
/// Blocks with line ranges in source order
pub fn render_spanned(raw: &str) -> Vec<SourceBlock> {
    let lines: Vec<&str> = raw
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let start = i;
        let line = lines[i];

        if let Some(tag) = line.trim().strip_prefix(FENCE) {
            let lang = Some(tag.trim())
                .filter(|t| !t.is_empty())
                .map(String::from);
            let mut code = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim().starts_with(FENCE) {
                code.push(lines[i].to_string());
                i += 1;
            }
            // Closing fence is consumed but not kept
            i = (i + 1).min(lines.len());

            blocks.push(SourceBlock {
                lines: start..i,
                block: Block::CodeBlock { lang, lines: code },
            });
            continue;
        }

        blocks.push(SourceBlock {
            lines: start..start + 1,
            block: parse_line(line),
        });
        i += 1;
    }

    blocks
}

/// Classifies a single non-fence line.
fn parse_line(line: &str) -> Block {
    if let Some((level, rest)) = heading(line) {
        return Block::Heading {
            level,
            content: render_inline(rest),
        };
    }

    if let Some(rest) = line.strip_prefix("> ") {
        return Block::Blockquote(render_inline(rest));
    }

    let trimmed = line.trim();
    if trimmed == "---" || trimmed == "***" {
        return Block::Rule;
    }

    if let Some((kind, depth, rest)) = list_item(line) {
        return Block::ListItem {
            kind,
            depth,
            content: render_inline(rest),
        };
    }

    if trimmed.is_empty() {
        return Block::Blank;
    }

    Block::Paragraph(render_inline(line))
}

/// Matches 1 to 4 `#` followed by a space at the very start of the line.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=MAX_HEADING_LEVEL).contains(&hashes) {
        return None;
    }

    let rest = line[hashes..].strip_prefix(' ')?;
    Some((hashes as u8, rest))
}

/// Matches indentation, a list marker and one whitespace character.
///
/// Unordered markers are `-` and `*`; ordered markers are ASCII digits
/// followed by `.`.
fn list_item(line: &str) -> Option<(ListKind, usize, &str)> {
    let body = line.trim_start();
    let depth = line[..line.len() - body.len()].chars().count();

    let (kind, after_marker) = if let Some(rest) = body.strip_prefix(['-', '*']) {
        (ListKind::Unordered, rest)
    } else {
        let digits = body.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        (ListKind::Ordered, body[digits..].strip_prefix('.')?)
    };

    let separator = after_marker.chars().next().filter(|c| c.is_whitespace())?;
    Some((kind, depth, &after_marker[separator.len_utf8()..]))
}
