//! Site header navigation component

use maud::{Markup, html};

/// Renders the site header with name and navigation links
///
/// # Arguments
///
/// * `site_name`: Display name linking back to the index
/// * `index_path`: Relative path back to index.html
/// * `links`: Link label and target pairs shown on the right
///
/// # Returns
///
/// Header markup
pub fn site_header(site_name: &str, index_path: &str, links: &[(&str, String)]) -> Markup {
    html! {
        header class="site-header" {
            a href=(index_path) class="site-name" { (site_name) }
            @if !links.is_empty() {
                nav {
                    ul class="site-links" {
                        @for (label, href) in links {
                            li { a href=(href) { (*label) } }
                        }
                    }
                }
            }
        }
    }
}
