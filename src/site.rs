//! Static site generation from stored content.

use anyhow::{Context, Result};
use maud::Markup;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::assets::write_css_assets;
use crate::components::layout::PageChrome;
use crate::markdown::MarkdownRenderer;
use crate::pages;
use crate::store::DocumentStore;

/// Options for one site build
#[derive(Debug, Clone)]
pub struct SiteOptions {
    /// Display name; falls back to the portfolio hero name
    pub site_name: Option<String>,
    /// syntect theme for code block colors
    pub theme: String,
    /// Target of resource page download forms
    pub download_endpoint: String,
}

impl Default for SiteOptions {
    fn default() -> Self {
        Self {
            site_name: None,
            theme: "InspiredGitHub".to_string(),
            download_endpoint: "/api/download".to_string(),
        }
    }
}

/// Counts of generated pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteSummary {
    pub pages: usize,
    pub resources: usize,
    pub projects: usize,
}

/// Builds the static site into `output`
///
/// Writes `assets/*.css`, `index.html`, `projects.html`, `p/<slug>.html`
/// for every published document, `r/<slug>.html` for every published resource page and
/// `404.html`. Unpublished content is never written.
///
/// # Errors
///
/// Returns error if the store cannot be read, a page fails to render, or
/// any output file cannot be written
pub fn build_site(
    store: &dyn DocumentStore,
    output: &Path,
    options: &SiteOptions,
) -> Result<SiteSummary> {
    let portfolio = store
        .portfolio_or_default()
        .context("Failed to load portfolio")?;
    let documents: Vec<_> = store
        .list_documents()
        .context("Failed to list documents")?
        .into_iter()
        .filter(|d| d.published)
        .collect();
    let resources: Vec<_> = store
        .list_resource_pages()
        .context("Failed to list resource pages")?
        .into_iter()
        .filter(|p| p.published)
        .collect();

    let site_name = options
        .site_name
        .clone()
        .unwrap_or_else(|| portfolio.hero.name.clone());
    let chrome = |depth| PageChrome {
        site_name: &site_name,
        footer: &portfolio.footer,
        depth,
    };

    let assets_dir = output.join("assets");
    fs::create_dir_all(&assets_dir).context("Failed to create assets directory")?;
    write_css_assets(&assets_dir, &options.theme)?;

    let index = pages::index::generate(pages::index::IndexPageData {
        chrome: chrome(0),
        portfolio: &portfolio,
        documents: &documents,
        resources: &resources,
    });
    write_page(&output.join("index.html"), index)?;

    let renderer = MarkdownRenderer::new();
    let pages_dir = output.join("p");
    fs::create_dir_all(&pages_dir).context("Failed to create pages directory")?;
    for document in &documents {
        let html = pages::custom::generate(document, &renderer, &chrome(1))?;
        write_page(&pages_dir.join(format!("{}.html", document.slug)), html)?;
    }

    let resources_dir = output.join("r");
    fs::create_dir_all(&resources_dir).context("Failed to create resources directory")?;
    for page in &resources {
        let html = pages::resource::generate(page, &options.download_endpoint, &chrome(1));
        write_page(&resources_dir.join(format!("{}.html", page.slug)), html)?;
    }

    write_page(
        &output.join("projects.html"),
        pages::projects::generate(&portfolio, &chrome(0)),
    )?;

    write_page(
        &output.join("404.html"),
        pages::not_found::generate(&chrome(0)),
    )?;

    let summary = SiteSummary {
        pages: documents.len(),
        resources: resources.len(),
        projects: portfolio.published_projects().len(),
    };
    info!(
        pages = summary.pages,
        resources = summary.resources,
        projects = summary.projects,
        output = %output.display(),
        "site built"
    );
    Ok(summary)
}

fn write_page(path: &Path, html: Markup) -> Result<()> {
    fs::write(path, html.into_string())
        .with_context(|| format!("Failed to write page to {}", path.display()))?;
    debug!(path = %path.display(), "wrote page");
    Ok(())
}
