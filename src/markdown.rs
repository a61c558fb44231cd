//! Markdown subset parsing and HTML presentation.
//!
//! Parsing is a pure transform from source text to typed blocks and inline
//! spans (see [`render`] and [`render_inline`]). Presentation is a separate
//! step handled by [`MarkdownRenderer`], which maps those blocks to maud
//! markup with syntect highlighted code blocks.

mod block;
mod html;
mod inline;

pub use block::{Block, ListKind, SourceBlock, render, render_spanned};
pub use html::MarkdownRenderer;
pub(crate) use html::HIGHLIGHT_PREFIX;
pub use inline::{Span, render_inline};
