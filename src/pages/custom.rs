//! Custom content page generation

use anyhow::{Context, Result};
use maud::{Markup, html};

use crate::assets::{CUSTOM_CSS, HIGHLIGHT_CSS, MARKDOWN_CSS};
use crate::components::layout::{PageChrome, page_wrapper};
use crate::document::Document;
use crate::markdown::MarkdownRenderer;
use crate::util::format_date;

/// Generates HTML for one custom page
///
/// Renders the document body through the markdown subset renderer and
/// shows the last modification date under the title.
///
/// # Arguments
///
/// * `document`: Document snapshot to render
/// * `renderer`: Shared markdown renderer
/// * `chrome`: Site name, footer content and page depth
///
/// # Errors
///
/// Returns error if highlighting a code block fails
pub fn generate(
    document: &Document,
    renderer: &MarkdownRenderer,
    chrome: &PageChrome<'_>,
) -> Result<Markup> {
    let body = renderer
        .render_blocks(&document.blocks())
        .with_context(|| format!("Failed to render page body: {}", document.slug))?;
    let stylesheets = vec![
        chrome.stylesheet(CUSTOM_CSS),
        chrome.stylesheet(MARKDOWN_CSS),
        chrome.stylesheet(HIGHLIGHT_CSS),
    ];

    Ok(page_wrapper(
        &document.title,
        chrome,
        &stylesheets,
        html! {
            article class="custom-page" {
                h1 class="page-title" { (document.title) }
                p class="meta" { "Updated " (format_date(&document.updated_at)) }
                div class="markdown-body" {
                    (body)
                }
            }
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Footer;

    #[test]
    fn test_custom_page_renders_body() {
        // Arrange
        let mut doc = Document::new("Pricing");
        doc.body = "## Plans\n\n- **Starter**\n- Pro".to_string();
        let footer = Footer::default();
        let chrome = PageChrome {
            site_name: "Studio",
            footer: &footer,
            depth: 1,
        };

        // Act
        let html = generate(&doc, &MarkdownRenderer::new(), &chrome)
            .expect("Should render")
            .into_string();

        // Assert
        assert!(html.contains("<title>Pricing - Studio</title>"));
        assert!(html.contains("<h2>Plans</h2>"));
        assert!(html.contains("<strong>Starter</strong>"));
        assert!(html.contains("../assets/highlight.css"));
        assert!(html.contains(&format_date(&doc.updated_at)));
    }
}
