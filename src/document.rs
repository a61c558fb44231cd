//! Content documents keyed by slug.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::draft::Editable;
use crate::markdown::{Block, render};

/// Body given to documents created from the starter template.
pub const TEMPLATE_BODY: &str = "# Title\n\nWrite your content here.\n\n- First point\n- Second point\n";

/// A custom page: slug, title, markdown subset body and publication flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub published: bool,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Creates an unpublished, empty document with slug derived from title.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let slug = title.clone();
        Self::with_slug(&slug, title)
    }

    /// Creates an unpublished, empty document with an explicit slug.
    ///
    /// The slug is normalized with [`slugify`].
    pub fn with_slug(slug: &str, title: impl Into<String>) -> Self {
        Self {
            slug: slugify(slug),
            title: title.into(),
            body: String::new(),
            published: false,
            updated_at: Utc::now(),
        }
    }

    /// Replaces the body with the starter template.
    pub fn templated(mut self) -> Self {
        self.body = TEMPLATE_BODY.to_string();
        self
    }

    /// Parses the body snapshot into render blocks.
    pub fn blocks(&self) -> Vec<Block> {
        render(&self.body)
    }
}

/// Single field change to a [`Document`] draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEdit {
    Title(String),
    /// New slug; normalized with [`slugify`] when applied.
    Slug(String),
    Body(String),
    Published(bool),
}

impl Editable for Document {
    type Edit = DocumentEdit;

    /// Applies the edit and stamps the modification time.
    fn apply(&mut self, edit: DocumentEdit) {
        match edit {
            DocumentEdit::Title(title) => self.title = title,
            DocumentEdit::Slug(slug) => self.slug = slugify(&slug),
            DocumentEdit::Body(body) => self.body = body,
            DocumentEdit::Published(published) => self.published = published,
        }
        self.updated_at = Utc::now();
    }
}

/// Converts free text into a URL safe slug.
///
/// Lowercases the input, collapses every run of characters outside
/// `[a-z0-9]` into a single `-`, and trims leading and trailing dashes.
///
/// # Examples
///
/// ```
/// assert_eq!(folio::slugify("Hello, World!"), "hello-world");
/// assert_eq!(folio::slugify("  n8n Workflows 101 "), "n8n-workflows-101");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Checks that a slug is non-empty and already in slugified form.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("My First Page"), "my-first-page");
        assert_eq!(slugify("AI Automation: 2025!"), "ai-automation-2025");
        assert_eq!(slugify("---edge---"), "edge");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn test_slugify_non_ascii_collapses() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("free-ebook"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Free Ebook"));
        assert!(!is_valid_slug("../etc"));
    }

    #[test]
    fn test_new_document_defaults() {
        // Arrange & Act
        let doc = Document::new("Pricing & Plans");

        // Assert
        assert_eq!(doc.slug, "pricing-plans");
        assert_eq!(doc.title, "Pricing & Plans");
        assert!(doc.body.is_empty());
        assert!(!doc.published, "New documents start unpublished");
    }

    #[test]
    fn test_templated_body_renders() {
        // Arrange
        let doc = Document::with_slug("Guide", "Guide").templated();

        // Act
        let blocks = doc.blocks();

        // Assert
        assert_eq!(doc.slug, "guide");
        assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
        assert!(blocks.len() > 3, "Template should produce several blocks");
    }

    #[test]
    fn test_slug_edit_is_normalized() {
        // Arrange
        let mut doc = Document::new("Page");

        // Act
        doc.apply(DocumentEdit::Slug("New Slug!".to_string()));

        // Assert
        assert_eq!(doc.slug, "new-slug");
    }

    #[test]
    fn test_edit_stamps_updated_at() {
        // Arrange
        let mut doc = Document::new("Page");
        let before = doc.updated_at;

        // Act
        doc.apply(DocumentEdit::Published(true));

        // Assert
        assert!(doc.published);
        assert!(doc.updated_at >= before);
    }

    #[test]
    fn test_document_json_defaults() {
        // Arrange
        let json = r#"{"slug":"a","title":"A","updated_at":"2025-01-02T03:04:05Z"}"#;

        // Act
        let doc: Document = serde_json::from_str(json).expect("Should parse document");

        // Assert
        assert_eq!(doc.body, "");
        assert!(!doc.published);
    }
}
