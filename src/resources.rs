//! Gated resource pages.
//!
//! A resource page lists downloadable files. Visitors trade an email address
//! for a short lived signed download URL; every grant is recorded.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::document::slugify;
use crate::objects::{ObjectError, ObjectResult, ObjectStore, SignedUrl, extract_storage_path};
use crate::store::{DocumentStore, StoreError, StoreResult};

/// Lifetime of download URLs issued by the gate.
pub const DOWNLOAD_TTL_SECONDS: u64 = 60;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Loose shape check: something, `@`, something, `.`, something.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// One downloadable file attached to a resource page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFile {
    pub id: Uuid,
    pub file_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Path inside the resource bucket.
    pub storage_path: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub download_count: u64,
}

impl ResourceFile {
    pub fn new(file_name: impl Into<String>, storage_path: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            description: None,
            storage_path: storage_path.into(),
            size: None,
            content_type: None,
            download_count: 0,
        }
    }
}

/// Page of gated downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePage {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<ResourceFile>,
}

impl ResourcePage {
    /// Creates an unpublished page with a slug derived from the title.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&title),
            title,
            description: None,
            published: false,
            created_at: now,
            updated_at: now,
            files: Vec::new(),
        }
    }

    pub fn file(&self, file_id: Uuid) -> Option<&ResourceFile> {
        self.files.iter().find(|f| f.id == file_id)
    }

    /// Uploads bytes to `<slug>/<file_name>` and lists the new file.
    ///
    /// # Errors
    ///
    /// Propagates upload failures, including
    /// [`ObjectError::AlreadyExists`] when the name is taken
    pub fn attach_file(
        &mut self,
        objects: &dyn ObjectStore,
        file_name: &str,
        bytes: &[u8],
        description: Option<String>,
    ) -> ObjectResult<&ResourceFile> {
        let requested = format!("{}/{}", self.slug, file_name);
        let url = objects.upload(bytes, &requested)?;
        let storage_path = extract_storage_path(&url).unwrap_or(&requested).to_string();

        let mut file = ResourceFile::new(file_name, storage_path);
        file.description = description;
        file.size = Some(bytes.len() as u64);
        file.content_type = content_type_for(file_name).map(str::to_string);

        self.files.push(file);
        self.updated_at = Utc::now();
        Ok(&self.files[self.files.len() - 1])
    }

    /// Deletes a file's object and removes it from the page.
    ///
    /// A file whose object is already gone is still removed.
    pub fn remove_file(&mut self, objects: &dyn ObjectStore, file_id: Uuid) -> ObjectResult<()> {
        let index = self
            .files
            .iter()
            .position(|f| f.id == file_id)
            .ok_or_else(|| ObjectError::NotFound(file_id.to_string()))?;

        match objects.delete(&self.files[index].storage_path) {
            Ok(()) | Err(ObjectError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }
        self.files.remove(index);
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn content_type_for(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let content_type = match ext.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "json" => "application/json",
        "csv" => "text/csv",
        "txt" | "md" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => return None,
    };
    Some(content_type)
}

/// Email captured in exchange for a download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub id: Uuid,
    pub page_id: Uuid,
    pub file_id: Uuid,
    pub email: String,
    pub downloaded_at: DateTime<Utc>,
}

impl DownloadRecord {
    pub fn new(page_id: Uuid, file_id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_id,
            file_id,
            email: email.into(),
            downloaded_at: Utc::now(),
        }
    }
}

/// Result type for gate operations
pub type GateResult<T> = Result<T, GateError>;

/// Download gate errors
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Resource page not found: {0}")]
    PageNotFound(String),

    #[error("File not found: {0}")]
    FileNotFound(Uuid),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Object storage error: {0}")]
    Objects(#[from] ObjectError),
}

/// Email-for-download flow over a store and an object store.
pub struct DownloadGate<'a> {
    store: &'a dyn DocumentStore,
    objects: &'a dyn ObjectStore,
}

impl<'a> DownloadGate<'a> {
    pub fn new(store: &'a dyn DocumentStore, objects: &'a dyn ObjectStore) -> Self {
        Self { store, objects }
    }

    /// Grants a download of one file on a published page.
    ///
    /// The download is recorded before the URL is issued.
    ///
    /// # Arguments
    ///
    /// * `page_slug` - Slug of the resource page
    /// * `file_id` - File on that page
    /// * `email` - Visitor email, surrounding whitespace ignored
    ///
    /// # Errors
    ///
    /// - [`GateError::InvalidEmail`] before anything is looked up
    /// - [`GateError::PageNotFound`] for unknown or unpublished pages
    /// - [`GateError::FileNotFound`] if the file is not on the page
    pub fn request(&self, page_slug: &str, file_id: Uuid, email: &str) -> GateResult<SignedUrl> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(GateError::InvalidEmail(email.to_string()));
        }

        let page = match self.store.load_resource_page(page_slug) {
            Ok(page) if page.published => page,
            Ok(_) | Err(StoreError::NotFound(_)) | Err(StoreError::InvalidKey(_)) => {
                return Err(GateError::PageNotFound(page_slug.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let file = page.file(file_id).ok_or(GateError::FileNotFound(file_id))?;

        self.store
            .record_download(&DownloadRecord::new(page.id, file.id, email))?;
        let url = self
            .objects
            .signed_url(&file.storage_path, DOWNLOAD_TTL_SECONDS)?;

        info!(page = page_slug, file = %file.file_name, "download granted");
        Ok(url)
    }
}

/// Deletes a resource page together with the objects of all its files.
///
/// Files are removed one by one. If an object delete fails, the page is
/// saved with the files that remain and the error is returned, so a retry
/// picks up where this one stopped.
///
/// # Returns
///
/// Number of files removed
///
/// # Errors
///
/// - [`GateError::PageNotFound`] if no page has this slug
/// - [`GateError::Objects`] if an object cannot be deleted
/// - [`GateError::Store`] if the page cannot be saved or deleted
pub fn delete_page_with_files(
    store: &dyn DocumentStore,
    objects: &dyn ObjectStore,
    slug: &str,
) -> GateResult<usize> {
    let mut page = match store.load_resource_page(slug) {
        Ok(page) => page,
        Err(StoreError::NotFound(_)) => return Err(GateError::PageNotFound(slug.to_string())),
        Err(err) => return Err(err.into()),
    };

    let file_ids: Vec<Uuid> = page.files.iter().map(|f| f.id).collect();
    for (removed, file_id) in file_ids.iter().enumerate() {
        if let Err(err) = page.remove_file(objects, *file_id) {
            store.save_resource_page(&page)?;
            warn!(page = slug, removed, error = %err, "resource page delete interrupted");
            return Err(err.into());
        }
    }

    store.delete_resource_page(slug)?;
    info!(page = slug, files = file_ids.len(), "resource page deleted");
    Ok(file_ids.len())
}

/// One download joined with the names of its page and file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRow {
    pub email: String,
    /// Page title, `N/A` once the page is gone
    pub page: String,
    /// File name, `N/A` once the file is gone
    pub file: String,
    pub downloaded_at: DateTime<Utc>,
}

/// Lists downloads with page and file names resolved, newest first.
///
/// # Arguments
///
/// * `page_id` - Only downloads of this page
/// * `email_query` - Case-insensitive substring the email must contain
///
/// # Errors
///
/// Returns error if downloads or pages cannot be read
pub fn download_report(
    store: &dyn DocumentStore,
    page_id: Option<Uuid>,
    email_query: Option<&str>,
) -> StoreResult<Vec<DownloadRow>> {
    let pages = store.list_resource_pages()?;
    let query = email_query.map(|q| q.trim().to_lowercase());

    let rows = store
        .list_downloads(page_id)?
        .into_iter()
        .filter(|r| {
            query
                .as_deref()
                .is_none_or(|q| r.email.to_lowercase().contains(q))
        })
        .map(|record| {
            let page = pages.iter().find(|p| p.id == record.page_id);
            let file = page.and_then(|p| p.file(record.file_id));
            DownloadRow {
                page: page.map_or_else(|| NOT_AVAILABLE.to_string(), |p| p.title.clone()),
                file: file.map_or_else(|| NOT_AVAILABLE.to_string(), |f| f.file_name.clone()),
                email: record.email,
                downloaded_at: record.downloaded_at,
            }
        })
        .collect();
    Ok(rows)
}

const NOT_AVAILABLE: &str = "N/A";

/// Writes download rows as CSV with an `Email,Page,File,Downloaded At` header.
///
/// Fields containing a comma, quote or line break are quoted with inner
/// quotes doubled.
///
/// # Errors
///
/// Returns error if writing fails
pub fn write_downloads_csv(rows: &[DownloadRow], out: &mut impl io::Write) -> io::Result<()> {
    writeln!(out, "Email,Page,File,Downloaded At")?;
    for row in rows {
        writeln!(
            out,
            "{},{},{},{}",
            csv_field(&row.email),
            csv_field(&row.page),
            csv_field(&row.file),
            row.downloaded_at.to_rfc3339()
        )?;
    }
    Ok(())
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
