//! Integration tests for editing, storage, gating and site generation
//! working together over the file-backed store.

mod common;

use anyhow::{Context, Result};
use common::{
    create_content_dir, document, published_resource, read_output, sample_portfolio,
    seed_documents,
};
use folio::{
    DocumentEdit, DocumentStore, DownloadGate, DraftError, EditSession, EditState, GateError,
    LocalObjectStore, ObjectStore, Portfolio, PortfolioEdit, SessionId, SiteOptions, StoreError,
    build_site,
};
use tempfile::TempDir;

#[test]
fn test_workflow_edit_session_over_fs_store() -> Result<()> {
    // Arrange
    let (_dir, store) = create_content_dir()?;
    seed_documents(&store, &[document("A", "x", false)])?;
    let source = store.load_document("a")?;
    let mut session = EditSession::new(SessionId::new());
    session.load(&source)?;

    // Act
    session.mutate(DocumentEdit::Title("B".to_string()))?;
    let state_after_edit = session.state();
    session.save(&store)?;

    // Assert
    assert_eq!(state_after_edit, EditState::Dirty);
    assert_eq!(session.state(), EditState::Clean);
    let stored = store.load_document("a")?;
    assert_eq!(stored.title, "B");
    assert_eq!(Some(&stored), session.last_saved(), "Store holds the exact snapshot");
    Ok(())
}

#[test]
fn test_workflow_rename_moves_file() -> Result<()> {
    // Arrange
    let (dir, store) = create_content_dir()?;
    seed_documents(&store, &[document("Old Name", "body", true)])?;
    let mut session = EditSession::new(SessionId::new());
    session.load(&store.load_document("old-name")?)?;

    // Act
    session.mutate(DocumentEdit::Slug("New Name".to_string()))?;
    session.save(&store)?;

    // Assert
    assert!(dir.path().join("pages/new-name.json").exists());
    assert!(!dir.path().join("pages/old-name.json").exists());
    assert_eq!(store.list_documents()?.len(), 1);
    Ok(())
}

#[test]
fn test_workflow_failed_save_keeps_draft() -> Result<()> {
    // Arrange
    let (_dir, store) = create_content_dir()?;
    seed_documents(&store, &[document("Keep", "x", false)])?;
    let mut session = EditSession::new(SessionId::new());
    session.load(&store.load_document("keep")?)?;
    session.mutate_with(|doc| doc.slug = "../escape".to_string())?;
    let before = session.draft().cloned();

    // Act
    let result = session.save(&store);

    // Assert
    assert!(matches!(
        result,
        Err(DraftError::Persistence(StoreError::InvalidKey(_)))
    ));
    assert_eq!(session.state(), EditState::Dirty);
    assert_eq!(session.draft().cloned(), before, "Draft must be unchanged");
    assert_eq!(store.load_document("keep")?.body, "x", "Store untouched");
    Ok(())
}

#[test]
fn test_workflow_portfolio_export_import_merges_defaults() -> Result<()> {
    // Arrange
    let (_dir, store) = create_content_dir()?;
    let partial = r#"{ "hero": { "name": "Grace", "subtitle": "", "description": "", "tech_stack": [] } }"#;

    // Act
    let snapshot = Portfolio::from_json(partial)?;
    let mut session = EditSession::new(SessionId::new());
    session.load(&store.portfolio_or_default()?)?;
    session.import(snapshot)?;
    session.save(&store)?;

    // Assert
    let stored = store
        .load_portfolio()?
        .context("Portfolio should be stored")?;
    assert_eq!(stored.hero.name, "Grace");
    assert_eq!(stored.footer, Portfolio::default().footer, "Missing sections default");
    let exported = Portfolio::from_json(&stored.to_json()?)?;
    assert_eq!(exported, stored);
    Ok(())
}

#[test]
fn test_workflow_portfolio_projects_through_session() -> Result<()> {
    // Arrange
    let (_dir, store) = create_content_dir()?;
    let mut session = EditSession::new(SessionId::new());
    session.load(&store.portfolio_or_default()?)?;

    // Act
    session.mutate(PortfolioEdit::AddProject {
        title: "CRM Sync".to_string(),
        description: "Two-way sync".to_string(),
    })?;
    session.save(&store)?;

    // Assert
    let stored = store.load_portfolio()?.context("Portfolio should be stored")?;
    assert_eq!(stored.projects.len(), 1);
    assert_eq!(stored.projects[0].order, 1);
    assert!(
        stored.published_projects().is_empty(),
        "New projects start as drafts"
    );
    Ok(())
}

#[test]
fn test_workflow_download_gate() -> Result<()> {
    // Arrange
    let (_dir, store) = create_content_dir()?;
    let objects_dir = TempDir::new()?;
    let objects = LocalObjectStore::new(objects_dir.path(), "https://files.test", b"secret");
    let mut page = published_resource("Automation Checklist");
    let file_id = page
        .attach_file(&objects, "checklist.pdf", b"%PDF-1.7", None)?
        .id;
    store.save_resource_page(&page)?;
    let gate = DownloadGate::new(&store, &objects);

    // Act
    let rejected = gate.request("automation-checklist", file_id, "not-an-email");
    let granted = gate.request("automation-checklist", file_id, "lead@example.com")?;

    // Assert
    assert!(matches!(rejected, Err(GateError::InvalidEmail(_))));
    assert_eq!(objects.fetch(&granted)?, b"%PDF-1.7");
    assert!(
        granted
            .to_url("https://files.test")
            .contains("/resource-files/automation-checklist/checklist.pdf?token=")
    );
    let downloads = store.list_downloads(Some(page.id))?;
    assert_eq!(downloads.len(), 1, "Only the valid request is recorded");
    assert_eq!(
        store.load_resource_page("automation-checklist")?.files[0].download_count,
        1
    );

    // Storage paths resolve back through the public URL
    let second = objects.upload(b"x", "automation-checklist/extra.txt")?;
    assert_eq!(
        folio::extract_storage_path(&second),
        Some("automation-checklist/extra.txt")
    );
    Ok(())
}

#[test]
fn test_workflow_build_site_only_published() -> Result<()> {
    // Arrange
    let (_dir, store) = create_content_dir()?;
    store.save_portfolio(&sample_portfolio())?;
    seed_documents(
        &store,
        &[
            document("Pricing", "# Plans\n\n- **Starter**\n\n```rust\nfn main() {}\n```", true),
            document("Unfinished", "draft body", false),
        ],
    )?;
    store.save_resource_page(&published_resource("Free Guide"))?;
    let output = TempDir::new()?;

    // Act
    let summary = build_site(&store, output.path(), &SiteOptions::default())?;

    // Assert
    assert_eq!(summary.pages, 1);
    assert_eq!(summary.resources, 1);
    assert_eq!(summary.projects, 1);

    let index = read_output(output.path(), "index.html")?;
    assert!(index.contains("Ada Automations"), "Site name from portfolio");
    assert!(index.contains("Invoice Pipeline"));
    assert!(!index.contains("Secret Experiment"), "Draft projects hidden");
    assert!(index.contains("href=\"p/pricing.html\""));
    assert!(index.contains("href=\"r/free-guide.html\""));
    assert!(!index.contains("Unfinished"));

    let page = read_output(output.path(), "p/pricing.html")?;
    assert!(page.contains("<strong>Starter</strong>"));
    assert!(page.contains("language-rust"));
    assert!(page.contains("hljs-"), "Code should be highlighted");
    assert!(!output.path().join("p/unfinished.html").exists());
    assert!(output.path().join("r/free-guide.html").exists());
    Ok(())
}

#[test]
fn test_workflow_conflicting_new_page_rejected() -> Result<()> {
    // Arrange
    let (_dir, store) = create_content_dir()?;
    seed_documents(&store, &[document("Taken", "original", true)])?;
    let mut session = EditSession::new(SessionId::new());
    session.import(document("Taken", "replacement", false))?;

    // Act
    let result = session.save(&store);

    // Assert
    assert!(matches!(
        result,
        Err(DraftError::Persistence(StoreError::Conflict(_)))
    ));
    assert_eq!(store.load_document("taken")?.body, "original");
    Ok(())
}

#[test]
fn test_workflow_missing_object_fails_gate() -> Result<()> {
    // Arrange
    let (_dir, store) = create_content_dir()?;
    let objects_dir = TempDir::new()?;
    let objects = LocalObjectStore::new(objects_dir.path(), "https://files.test", b"secret");
    let mut page = published_resource("Kit");
    let file_id = page.attach_file(&objects, "kit.zip", b"PK", None)?.id;
    store.save_resource_page(&page)?;
    objects.delete("kit/kit.zip")?;
    let gate = DownloadGate::new(&store, &objects);

    // Act
    let result = gate.request("kit", file_id, "a@b.co");

    // Assert
    assert!(matches!(result, Err(GateError::Objects(_))));
    Ok(())
}
