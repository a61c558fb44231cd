//! Shared test utilities for integration tests.
//!
//! Provides helpers for creating temporary content stores and sample
//! content used across multiple test files.

#![allow(dead_code)]

use anyhow::Result;
use folio::{Document, DocumentStore, FsStore, Portfolio, ProjectStatus, ResourcePage};
use std::path::Path;
use tempfile::TempDir;

/// Creates a temporary content directory with an initialized store.
///
/// # Returns
///
/// Temporary directory guard and a store rooted in it
///
/// # Errors
///
/// Returns error if directory creation fails
pub fn create_content_dir() -> Result<(TempDir, FsStore)> {
    let dir = TempDir::new()?;
    let store = FsStore::new(dir.path());
    store.init()?;
    Ok((dir, store))
}

/// Builds a document with the given publication flag and body.
pub fn document(title: &str, body: &str, published: bool) -> Document {
    let mut doc = Document::new(title);
    doc.body = body.to_string();
    doc.published = published;
    doc
}

/// Saves documents directly, bypassing editing sessions.
///
/// # Errors
///
/// Returns error if any save fails
pub fn seed_documents(store: &dyn DocumentStore, documents: &[Document]) -> Result<()> {
    for doc in documents {
        store.save_document(doc)?;
    }
    Ok(())
}

/// Portfolio with one published and one draft project.
pub fn sample_portfolio() -> Portfolio {
    let mut portfolio = Portfolio::default();
    portfolio.hero.name = "Ada Automations".to_string();
    portfolio.projects = vec![
        folio::Project {
            id: "p-live".to_string(),
            title: "Invoice Pipeline".to_string(),
            description: "Automated invoice intake".to_string(),
            tags: vec!["n8n".to_string()],
            results: vec!["90% less manual entry".to_string()],
            status: ProjectStatus::Published,
            order: 1,
        },
        folio::Project {
            id: "p-draft".to_string(),
            title: "Secret Experiment".to_string(),
            description: "Not ready".to_string(),
            tags: vec![],
            results: vec![],
            status: ProjectStatus::Draft,
            order: 2,
        },
    ];
    portfolio
}

/// Published resource page without files.
pub fn published_resource(title: &str) -> ResourcePage {
    let mut page = ResourcePage::new(title);
    page.published = true;
    page
}

/// Reads a generated file relative to an output directory.
///
/// # Errors
///
/// Returns error if the file is missing
pub fn read_output(output: &Path, relative: &str) -> Result<String> {
    Ok(std::fs::read_to_string(output.join(relative))?)
}
