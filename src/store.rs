//! Persistence backends for documents, the portfolio and resource pages.
//!
//! Every write is a full replace of one record keyed by slug; nothing is
//! patched in place. [`MemoryStore`] backs tests and previews, [`FsStore`]
//! keeps pretty printed JSON files under a content directory.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::document::Document;
use crate::draft::Persist;
use crate::portfolio::Portfolio;
use crate::resources::{DownloadRecord, ResourcePage};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Slug already in use: {0}")]
    Conflict(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Persistence collaborator for all site content.
pub trait DocumentStore: Send + Sync {
    /// Loads one document by slug.
    fn load_document(&self, slug: &str) -> StoreResult<Document>;

    /// Stores a document, replacing any document with the same slug.
    fn save_document(&self, document: &Document) -> StoreResult<()>;

    /// Lists all documents, most recently updated first.
    fn list_documents(&self) -> StoreResult<Vec<Document>>;

    fn delete_document(&self, slug: &str) -> StoreResult<()>;

    /// Loads the portfolio aggregate, or `None` if it was never saved.
    fn load_portfolio(&self) -> StoreResult<Option<Portfolio>>;

    fn save_portfolio(&self, portfolio: &Portfolio) -> StoreResult<()>;

    /// Lists resource pages, newest first by creation time.
    fn list_resource_pages(&self) -> StoreResult<Vec<ResourcePage>>;

    fn load_resource_page(&self, slug: &str) -> StoreResult<ResourcePage>;

    fn save_resource_page(&self, page: &ResourcePage) -> StoreResult<()>;

    fn delete_resource_page(&self, slug: &str) -> StoreResult<()>;

    /// Appends a download record and bumps the file's download counter.
    ///
    /// Fails with [`StoreError::NotFound`] if the page or file is unknown.
    fn record_download(&self, record: &DownloadRecord) -> StoreResult<()>;

    /// Lists download records, newest first, optionally for one page.
    fn list_downloads(&self, page_id: Option<Uuid>) -> StoreResult<Vec<DownloadRecord>>;

    /// Loads a document only if it is published.
    fn load_published(&self, slug: &str) -> StoreResult<Document> {
        let document = self.load_document(slug)?;
        if !document.published {
            return Err(StoreError::NotFound(slug.to_string()));
        }
        Ok(document)
    }

    /// Stored portfolio, or the default content when none was saved.
    fn portfolio_or_default(&self) -> StoreResult<Portfolio> {
        Ok(self.load_portfolio()?.unwrap_or_default())
    }
}

/// Orders documents by modification time, newest first.
pub(crate) fn sort_documents(documents: &mut [Document]) {
    documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.slug.cmp(&b.slug)));
}

/// Orders resource pages by creation time, newest first.
pub(crate) fn sort_resource_pages(pages: &mut [ResourcePage]) {
    pages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.slug.cmp(&b.slug)));
}

/// Applies a download to the matching file of a page.
pub(crate) fn count_download(page: &mut ResourcePage, record: &DownloadRecord) -> StoreResult<()> {
    let file = page
        .files
        .iter_mut()
        .find(|f| f.id == record.file_id)
        .ok_or_else(|| StoreError::NotFound(record.file_id.to_string()))?;
    file.download_count += 1;
    Ok(())
}

impl<S: DocumentStore + ?Sized> Persist<Document> for S {
    /// Writes the document under its slug.
    ///
    /// When the slug differs from the one this session last held, the new
    /// slug must be free and the old record is removed after the write. If
    /// removing the old record fails, the new record is removed again so the
    /// store keeps only the previous version. A record left at the new slug
    /// by an earlier failed attempt of the same snapshot is not a conflict.
    fn persist(&self, snapshot: &Document, previous: Option<&Document>) -> StoreResult<()> {
        let renamed_from = match previous {
            Some(prev) if prev.slug == snapshot.slug => None,
            Some(prev) => Some(prev.slug.as_str()),
            None => None,
        };
        let claims_new_slug = previous.is_none() || renamed_from.is_some();

        if claims_new_slug {
            match self.load_document(&snapshot.slug) {
                Ok(existing) if renamed_from.is_some() && existing == *snapshot => {}
                Ok(_) => return Err(StoreError::Conflict(snapshot.slug.clone())),
                Err(StoreError::NotFound(_)) => {}
                Err(err) => return Err(err),
            }
        }

        self.save_document(snapshot)?;

        if let Some(old_slug) = renamed_from {
            match self.delete_document(old_slug) {
                Ok(()) | Err(StoreError::NotFound(_)) => {}
                Err(err) => {
                    if let Err(rollback) = self.delete_document(&snapshot.slug) {
                        warn!(
                            slug = %snapshot.slug,
                            error = %rollback,
                            "failed to roll back renamed document"
                        );
                    }
                    return Err(err);
                }
            }
        }

        Ok(())
    }
}

impl<S: DocumentStore + ?Sized> Persist<Portfolio> for S {
    fn persist(&self, snapshot: &Portfolio, _previous: Option<&Portfolio>) -> StoreResult<()> {
        self.save_portfolio(snapshot)
    }
}
