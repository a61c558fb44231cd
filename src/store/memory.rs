//! In-memory store

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{
    DocumentStore, StoreError, StoreResult, count_download, sort_documents, sort_resource_pages,
};
use crate::document::Document;
use crate::portfolio::Portfolio;
use crate::resources::{DownloadRecord, ResourcePage};

/// Store that keeps everything in process memory.
///
/// Writes can be switched to fail with [`MemoryStore::fail_writes`] to
/// exercise save failure handling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<String, Document>>,
    portfolio: RwLock<Option<Portfolio>>,
    resources: RwLock<BTreeMap<String, ResourcePage>>,
    downloads: RwLock<Vec<DownloadRecord>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.failing.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

fn read<T>(lock: &RwLock<T>) -> StoreResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> StoreResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
}

impl DocumentStore for MemoryStore {
    fn load_document(&self, slug: &str) -> StoreResult<Document> {
        read(&self.documents)?
            .get(slug)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    fn save_document(&self, document: &Document) -> StoreResult<()> {
        self.check_writable()?;
        write(&self.documents)?.insert(document.slug.clone(), document.clone());
        Ok(())
    }

    fn list_documents(&self) -> StoreResult<Vec<Document>> {
        let mut documents: Vec<Document> = read(&self.documents)?.values().cloned().collect();
        sort_documents(&mut documents);
        Ok(documents)
    }

    fn delete_document(&self, slug: &str) -> StoreResult<()> {
        self.check_writable()?;
        write(&self.documents)?
            .remove(slug)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    fn load_portfolio(&self) -> StoreResult<Option<Portfolio>> {
        Ok(read(&self.portfolio)?.clone())
    }

    fn save_portfolio(&self, portfolio: &Portfolio) -> StoreResult<()> {
        self.check_writable()?;
        *write(&self.portfolio)? = Some(portfolio.clone());
        Ok(())
    }

    fn list_resource_pages(&self) -> StoreResult<Vec<ResourcePage>> {
        let mut pages: Vec<ResourcePage> = read(&self.resources)?.values().cloned().collect();
        sort_resource_pages(&mut pages);
        Ok(pages)
    }

    fn load_resource_page(&self, slug: &str) -> StoreResult<ResourcePage> {
        read(&self.resources)?
            .get(slug)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    fn save_resource_page(&self, page: &ResourcePage) -> StoreResult<()> {
        self.check_writable()?;
        write(&self.resources)?.insert(page.slug.clone(), page.clone());
        Ok(())
    }

    fn delete_resource_page(&self, slug: &str) -> StoreResult<()> {
        self.check_writable()?;
        write(&self.resources)?
            .remove(slug)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))
    }

    fn record_download(&self, record: &DownloadRecord) -> StoreResult<()> {
        self.check_writable()?;
        let mut resources = write(&self.resources)?;
        let page = resources
            .values_mut()
            .find(|p| p.id == record.page_id)
            .ok_or_else(|| StoreError::NotFound(record.page_id.to_string()))?;
        count_download(page, record)?;
        write(&self.downloads)?.push(record.clone());
        Ok(())
    }

    fn list_downloads(&self, page_id: Option<Uuid>) -> StoreResult<Vec<DownloadRecord>> {
        let mut records: Vec<DownloadRecord> = read(&self.downloads)?
            .iter()
            .filter(|r| page_id.is_none_or(|id| r.page_id == id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.downloaded_at.cmp(&a.downloaded_at));
        Ok(records)
    }
}
