//! Site footer component

use maud::{Markup, html};

use crate::portfolio::Footer;

/// Renders the site footer from portfolio footer content
///
/// Empty fields are omitted rather than rendered as blank lines.
pub fn footer(content: &Footer) -> Markup {
    html! {
        footer class="site-footer" {
            @if !content.copyright.is_empty() {
                p class="copyright" { (content.copyright) }
            }
            @if !content.tagline.is_empty() {
                p class="tagline" { (content.tagline) }
            }
        }
    }
}
