//! JSON file store
//!
//! Layout under the content root:
//!
//! ```text
//! portfolio.json
//! downloads.json
//! pages/<slug>.json
//! resources/<slug>.json
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{
    DocumentStore, StoreError, StoreResult, count_download, sort_documents, sort_resource_pages,
};
use crate::document::{Document, is_valid_slug};
use crate::portfolio::Portfolio;
use crate::resources::{DownloadRecord, ResourcePage};

const PAGES_DIR: &str = "pages";
const RESOURCES_DIR: &str = "resources";
const PORTFOLIO_FILE: &str = "portfolio.json";
const DOWNLOADS_FILE: &str = "downloads.json";

/// Store persisting content as pretty printed JSON files.
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
    // Serializes read-modify-write cycles on resources and downloads.
    write_lock: Mutex<()>,
}

impl FsStore {
    /// Opens a store rooted at `root`. Directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the content directory layout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if a directory cannot be created
    pub fn init(&self) -> StoreResult<()> {
        for dir in [PAGES_DIR, RESOURCES_DIR] {
            fs::create_dir_all(self.root.join(dir)).map_err(|e| StoreError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn keyed_path(&self, dir: &str, slug: &str) -> StoreResult<PathBuf> {
        if !is_valid_slug(slug) {
            return Err(StoreError::InvalidKey(slug.to_string()));
        }
        Ok(self.root.join(dir).join(format!("{}.json", slug)))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn list_dir<T: DeserializeOwned>(&self, dir: &str) -> StoreResult<Vec<T>> {
        let entries = match fs::read_dir(self.root.join(dir)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        let mut items = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::Io(e.to_string()))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                items.push(read_json(&path)?);
            }
        }
        Ok(items)
    }

    fn read_downloads(&self) -> StoreResult<Vec<DownloadRecord>> {
        match read_json(&self.root.join(DOWNLOADS_FILE)) {
            Ok(records) => Ok(records),
            Err(StoreError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(path.display().to_string())
        } else {
            StoreError::Io(e.to_string())
        }
    })?;
    serde_json::from_str(&content)
        .map_err(|e| StoreError::Serialization(format!("{}: {}", path.display(), e)))
}

/// Writes through a temporary sibling so readers never see partial files.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
    }

    let content =
        serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content).map_err(|e| StoreError::Io(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| StoreError::Io(e.to_string()))?;

    debug!(path = %path.display(), "wrote record");
    Ok(())
}

fn remove(path: &Path, slug: &str) -> StoreResult<()> {
    fs::remove_file(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(slug.to_string())
        } else {
            StoreError::Io(e.to_string())
        }
    })
}

fn not_found_as(slug: &str, err: StoreError) -> StoreError {
    match err {
        StoreError::NotFound(_) => StoreError::NotFound(slug.to_string()),
        other => other,
    }
}

impl DocumentStore for FsStore {
    fn load_document(&self, slug: &str) -> StoreResult<Document> {
        let path = self.keyed_path(PAGES_DIR, slug)?;
        read_json(&path).map_err(|e| not_found_as(slug, e))
    }

    fn save_document(&self, document: &Document) -> StoreResult<()> {
        let path = self.keyed_path(PAGES_DIR, &document.slug)?;
        write_json(&path, document)
    }

    fn list_documents(&self) -> StoreResult<Vec<Document>> {
        let mut documents: Vec<Document> = self.list_dir(PAGES_DIR)?;
        sort_documents(&mut documents);
        Ok(documents)
    }

    fn delete_document(&self, slug: &str) -> StoreResult<()> {
        let path = self.keyed_path(PAGES_DIR, slug)?;
        remove(&path, slug)
    }

    fn load_portfolio(&self) -> StoreResult<Option<Portfolio>> {
        match read_json(&self.root.join(PORTFOLIO_FILE)) {
            Ok(portfolio) => Ok(Some(portfolio)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save_portfolio(&self, portfolio: &Portfolio) -> StoreResult<()> {
        write_json(&self.root.join(PORTFOLIO_FILE), portfolio)
    }

    fn list_resource_pages(&self) -> StoreResult<Vec<ResourcePage>> {
        let mut pages: Vec<ResourcePage> = self.list_dir(RESOURCES_DIR)?;
        sort_resource_pages(&mut pages);
        Ok(pages)
    }

    fn load_resource_page(&self, slug: &str) -> StoreResult<ResourcePage> {
        let path = self.keyed_path(RESOURCES_DIR, slug)?;
        read_json(&path).map_err(|e| not_found_as(slug, e))
    }

    fn save_resource_page(&self, page: &ResourcePage) -> StoreResult<()> {
        let path = self.keyed_path(RESOURCES_DIR, &page.slug)?;
        let _guard = self.lock()?;
        write_json(&path, page)
    }

    fn delete_resource_page(&self, slug: &str) -> StoreResult<()> {
        let path = self.keyed_path(RESOURCES_DIR, slug)?;
        let _guard = self.lock()?;
        remove(&path, slug)
    }

    fn record_download(&self, record: &DownloadRecord) -> StoreResult<()> {
        let _guard = self.lock()?;

        let mut page = self
            .list_dir::<ResourcePage>(RESOURCES_DIR)?
            .into_iter()
            .find(|p| p.id == record.page_id)
            .ok_or_else(|| StoreError::NotFound(record.page_id.to_string()))?;
        let original = page.clone();
        count_download(&mut page, record)?;

        let mut records = self.read_downloads()?;
        records.push(record.clone());

        let page_path = self.keyed_path(RESOURCES_DIR, &page.slug)?;
        write_json(&page_path, &page)?;
        if let Err(err) = write_json(&self.root.join(DOWNLOADS_FILE), &records) {
            if let Err(rollback) = write_json(&page_path, &original) {
                warn!(slug = %page.slug, error = %rollback, "failed to restore download count");
            }
            return Err(err);
        }
        Ok(())
    }

    fn list_downloads(&self, page_id: Option<Uuid>) -> StoreResult<Vec<DownloadRecord>> {
        let mut records: Vec<DownloadRecord> = self
            .read_downloads()?
            .into_iter()
            .filter(|r| page_id.is_none_or(|id| r.page_id == id))
            .collect();
        records.sort_by(|a, b| b.downloaded_at.cmp(&a.downloaded_at));
        Ok(records)
    }
}
