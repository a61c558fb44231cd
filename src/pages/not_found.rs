//! Not found page generation

use maud::{Markup, html};

use crate::assets::RESOURCE_CSS;
use crate::components::layout::{PageChrome, page_wrapper};

/// Generates the 404 page served for unknown or unpublished slugs
pub fn generate(chrome: &PageChrome<'_>) -> Markup {
    let index_path = chrome.index_path();

    page_wrapper(
        "Page not found",
        chrome,
        &[chrome.stylesheet(RESOURCE_CSS)],
        html! {
            section class="not-found" {
                h1 { "404" }
                p { "This page does not exist or is not published yet." }
                a href=(index_path) { "Back to home" }
            }
        },
    )
}
