//! Page layout wrapper component

use maud::{DOCTYPE, Markup, html};

use super::footer::footer;
use super::nav::site_header;
use crate::portfolio::Footer;

/// Shared chrome of every generated page
pub struct PageChrome<'a> {
    pub site_name: &'a str,
    pub footer: &'a Footer,
    /// Directory depth of the page below the output root
    pub depth: usize,
}

impl PageChrome<'_> {
    /// Relative prefix from the page back to the output root.
    pub fn root_prefix(&self) -> String {
        "../".repeat(self.depth)
    }

    /// Path of a bundled stylesheet relative to the page.
    pub fn stylesheet(&self, name: &str) -> String {
        format!("{}assets/{}", self.root_prefix(), name)
    }

    pub fn index_path(&self) -> String {
        format!("{}index.html", self.root_prefix())
    }
}

/// Wraps page content with standard HTML structure
///
/// Provides consistent DOCTYPE, html, head, header and footer across all
/// page types while the caller provides page-specific body content.
///
/// # Arguments
///
/// * `title`: Page title text (without site name suffix)
/// * `chrome`: Site name, footer content and page depth
/// * `stylesheets`: CSS file paths to include
/// * `body`: Page-specific body markup
///
/// # Returns
///
/// Complete HTML document with wrapped content
pub fn page_wrapper(
    title: &str,
    chrome: &PageChrome<'_>,
    stylesheets: &[String],
    body: Markup,
) -> Markup {
    let index_path = chrome.index_path();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if title == chrome.site_name {
                    title { (title) }
                } @else {
                    title { (title) " - " (chrome.site_name) }
                }
                @for stylesheet in stylesheets {
                    link rel="stylesheet" href=(stylesheet);
                }
            }
            body {
                div class="container" {
                    (site_header(chrome.site_name, &index_path, &[]))
                    (body)
                }
                (footer(chrome.footer))
            }
        }
    }
}
