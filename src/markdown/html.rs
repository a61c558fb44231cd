//! HTML presentation of parsed markdown blocks.

use anyhow::{Context, Result};
use maud::{Markup, PreEscaped, html};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::block::{Block, ListKind, render};
use super::inline::Span;

/// CSS class prefix for highlighted code tokens.
pub(crate) const HIGHLIGHT_PREFIX: &str = "hljs-";

/// Base indentation of list items in pixels.
const LIST_BASE_INDENT: usize = 16;

/// Extra indentation per leading whitespace character of a list item.
const LIST_INDENT_STEP: usize = 8;

/// Renders parsed markdown blocks to HTML.
///
/// Maps each block variant to its HTML element, groups consecutive list
/// items of the same kind into a single list, and highlights fenced code
/// with syntect using CSS classes when the language tag is recognized.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
}

impl MarkdownRenderer {
    /// Creates renderer with the bundled syntect syntax definitions.
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Parses and renders markdown subset source to HTML markup.
    ///
    /// # Arguments
    ///
    /// * `content`: Markdown subset source
    ///
    /// # Returns
    ///
    /// Markup for the whole document body
    ///
    /// # Errors
    ///
    /// Returns error if syntax highlighting of a code block fails
    pub fn render_html(&self, content: &str) -> Result<Markup> {
        self.render_blocks(&render(content))
    }

    /// Renders already parsed blocks to HTML markup.
    ///
    /// # Errors
    ///
    /// Returns error if syntax highlighting of a code block fails
    pub fn render_blocks(&self, blocks: &[Block]) -> Result<Markup> {
        let mut parts = Vec::with_capacity(blocks.len());
        let mut i = 0;

        while i < blocks.len() {
            if let Block::ListItem { kind, .. } = &blocks[i] {
                let run = blocks[i..]
                    .iter()
                    .take_while(|b| matches!(b, Block::ListItem { kind: k, .. } if k == kind))
                    .count();
                parts.push(list(*kind, &blocks[i..i + run]));
                i += run;
                continue;
            }

            parts.push(self.block(&blocks[i])?);
            i += 1;
        }

        Ok(html! {
            @for part in &parts {
                (part)
            }
        })
    }

    fn block(&self, block: &Block) -> Result<Markup> {
        let markup = match block {
            Block::Heading { level, content } => match *level {
                1 => html! { h1 { (spans(content)) } },
                2 => html! { h2 { (spans(content)) } },
                3 => html! { h3 { (spans(content)) } },
                _ => html! { h4 { (spans(content)) } },
            },
            Block::Paragraph(content) => html! { p { (spans(content)) } },
            Block::Blockquote(content) => html! { blockquote { (spans(content)) } },
            Block::CodeBlock { lang, lines } => self.code_block(lang.as_deref(), lines)?,
            Block::Rule => html! { hr; },
            Block::Blank => html! { div class="spacer" {} },
            Block::ListItem { kind, .. } => list(*kind, std::slice::from_ref(block)),
        };

        Ok(markup)
    }

    fn code_block(&self, lang: Option<&str>, lines: &[String]) -> Result<Markup> {
        let code = lines.join("\n");

        let highlighted = match lang {
            Some(language) => self
                .highlight_code(&code, language)
                .context("Failed to highlight code block")?,
            None => None,
        };

        Ok(html! {
            pre {
                @if let Some(language) = lang {
                    code class=(format!("language-{}", language)) {
                        @if let Some(ref rendered) = highlighted {
                            (PreEscaped(rendered))
                        } @else {
                            (code)
                        }
                    }
                } @else {
                    code { (code) }
                }
            }
        })
    }

    /// Highlights code with syntect using CSS classes.
    ///
    /// # Arguments
    ///
    /// * `code`: Source code to highlight
    /// * `language`: Language token or file extension (rust, js, py)
    ///
    /// # Returns
    ///
    /// Highlighted HTML, or None when the language is unknown
    ///
    /// # Errors
    ///
    /// Returns error if syntect fails to parse a line
    fn highlight_code(&self, code: &str, language: &str) -> Result<Option<String>> {
        if code.is_empty() {
            return Ok(None);
        }

        let syntax = match self
            .syntax_set
            .find_syntax_by_token(language)
            .or_else(|| self.syntax_set.find_syntax_by_extension(language))
        {
            Some(s) => s,
            None => return Ok(None),
        };

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            &self.syntax_set,
            ClassStyle::SpacedPrefixed {
                prefix: HIGHLIGHT_PREFIX,
            },
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .context("Failed to parse line for syntax highlighting")?;
        }

        Ok(Some(generator.finalize()))
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a run of list items of one kind as a single list.
fn list(kind: ListKind, items: &[Block]) -> Markup {
    let item_markup = html! {
        @for item in items {
            @if let Block::ListItem { depth, content, .. } = item {
                li style=(format!("margin-left: {}px", depth * LIST_INDENT_STEP + LIST_BASE_INDENT)) {
                    (spans(content))
                }
            }
        }
    };

    match kind {
        ListKind::Unordered => html! { ul { (item_markup) } },
        ListKind::Ordered => html! { ol { (item_markup) } },
    }
}

/// Renders inline spans. All text is escaped by maud.
fn spans(content: &[Span]) -> Markup {
    html! {
        @for span in content {
            @match span {
                Span::Text(text) => (text),
                Span::Bold(text) => strong { (text) },
                Span::Italic(text) => em { (text) },
                Span::Code(text) => code { (text) },
                Span::Link { text, url } => {
                    @if is_safe_link(url) {
                        a href=(url) target="_blank" rel="noopener noreferrer" { (text) }
                    } @else {
                        (text)
                    }
                },
            }
        }
    }
}

/// Accepts relative targets and `http`, `https` or `mailto` URLs.
///
/// A scheme is whatever precedes the first `:` that appears before any
/// `/`, `?` or `#`.
fn is_safe_link(url: &str) -> bool {
    let url = url.trim();
    let scheme_end = url.find([':', '/', '?', '#']);
    match scheme_end {
        Some(i) if url[i..].starts_with(':') => {
            let scheme = url[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}
