//! CSS asset bundling

use anyhow::{Context, Result};
use std::{fs, path::Path};
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, css_for_theme_with_class_style};

use crate::markdown::HIGHLIGHT_PREFIX;

const BASE: &str = include_str!("../assets/base.css");
const LAYOUT: &str = include_str!("../assets/components/layout.css");
const NAV: &str = include_str!("../assets/components/nav.css");

const INDEX_PAGE: &str = include_str!("../assets/page-index.css");
const CUSTOM_PAGE: &str = include_str!("../assets/page-custom.css");
const RESOURCE_PAGE: &str = include_str!("../assets/page-resource.css");
const MARKDOWN: &str = include_str!("../assets/markdown.css");

/// Stylesheet file names, relative to the assets directory.
pub const INDEX_CSS: &str = "index.css";
pub const CUSTOM_CSS: &str = "custom.css";
pub const RESOURCE_CSS: &str = "resource.css";
pub const MARKDOWN_CSS: &str = "markdown.css";
pub const HIGHLIGHT_CSS: &str = "highlight.css";

/// Writes all bundled CSS assets to output directory
///
/// # Arguments
///
/// * `assets_dir`: Target directory, must exist
/// * `theme`: syntect theme used for code block token colors
///
/// # Errors
///
/// Returns error if the theme is unknown or a file cannot be written
pub fn write_css_assets(assets_dir: &Path, theme: &str) -> Result<()> {
    write_bundled(assets_dir, INDEX_CSS, &[BASE, LAYOUT, NAV, INDEX_PAGE])?;
    write_bundled(assets_dir, CUSTOM_CSS, &[BASE, LAYOUT, NAV, CUSTOM_PAGE])?;
    write_bundled(assets_dir, RESOURCE_CSS, &[BASE, LAYOUT, NAV, RESOURCE_PAGE])?;
    write_bundled(assets_dir, MARKDOWN_CSS, &[MARKDOWN])?;

    let highlight = highlight_css(theme)?;
    write_bundled(assets_dir, HIGHLIGHT_CSS, &[&highlight])?;
    Ok(())
}

/// Generates token color rules for highlighted code blocks.
///
/// # Errors
///
/// Returns error if the theme is not one of the bundled syntect themes
pub fn highlight_css(theme: &str) -> Result<String> {
    let themes = ThemeSet::load_defaults();
    let selected = themes.themes.get(theme).with_context(|| {
        let mut known: Vec<&str> = themes.themes.keys().map(String::as_str).collect();
        known.sort_unstable();
        format!("Unknown theme '{}', expected one of: {}", theme, known.join(", "))
    })?;

    css_for_theme_with_class_style(
        selected,
        ClassStyle::SpacedPrefixed {
            prefix: HIGHLIGHT_PREFIX,
        },
    )
    .context("Failed to generate highlight CSS")
}

fn write_bundled(dir: &Path, name: &str, parts: &[&str]) -> Result<()> {
    let css = parts.join("\n");
    fs::write(dir.join(name), css)
        .with_context(|| format!("Failed to write CSS asset: {}", name))?;
    Ok(())
}
