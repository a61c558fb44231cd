//! Resource download page generation

use maud::{Markup, html};

use crate::assets::RESOURCE_CSS;
use crate::components::layout::{PageChrome, page_wrapper};
use crate::resources::ResourcePage;
use crate::util::format_file_size;

/// Generates HTML for a gated resource page
///
/// Each file gets an email form posting the page slug, file id and
/// address to `download_endpoint`, which runs the download gate.
pub fn generate(page: &ResourcePage, download_endpoint: &str, chrome: &PageChrome<'_>) -> Markup {
    page_wrapper(
        &page.title,
        chrome,
        &[chrome.stylesheet(RESOURCE_CSS)],
        html! {
            article class="resource-page" {
                h1 { (page.title) }
                @if let Some(description) = &page.description {
                    p { (description) }
                }

                @if page.files.is_empty() {
                    p class="empty-state" { "No files available yet" }
                } @else {
                    ul class="resource-files" {
                        @for file in &page.files {
                            li class="card resource-file" {
                                div {
                                    strong { (file.file_name) }
                                    @if let Some(description) = &file.description {
                                        p class="meta" { (description) }
                                    }
                                    @if let Some(size) = file.size {
                                        span class="meta" { (format_file_size(size)) }
                                    }
                                }
                                form class="download-form" method="post" action=(download_endpoint) {
                                    input type="hidden" name="page" value=(page.slug);
                                    input type="hidden" name="file" value=(file.id.to_string());
                                    input type="email" name="email" required placeholder="your@email.com";
                                    button type="submit" { "Download" }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}
