//! Object storage for downloadable resource files.
//!
//! Files live in a single bucket. Public URLs are stable and derived from
//! the bucket path; downloads are handed out as short lived signed URLs.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Bucket holding every resource file.
pub const BUCKET: &str = "resource-files";

/// Result type for object storage operations
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Object storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Invalid signed URL lifetime: {0}s")]
    InvalidTtl(u64),

    #[error("Signed URL has expired")]
    UrlExpired,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("I/O error: {0}")]
    Io(String),
}

/// Storage backend for resource file bytes.
pub trait ObjectStore: Send + Sync {
    /// Stores bytes at `path` and returns the public URL.
    ///
    /// Never overwrites: fails with [`ObjectError::AlreadyExists`].
    fn upload(&self, bytes: &[u8], path: &str) -> ObjectResult<String>;

    /// Issues a download URL for `path` valid for `ttl_seconds`.
    fn signed_url(&self, path: &str, ttl_seconds: u64) -> ObjectResult<SignedUrl>;

    fn delete(&self, path: &str) -> ObjectResult<()>;
}

/// A signed download URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub bucket: String,
    pub path: String,
    pub expires_at: DateTime<Utc>,
    pub signature: String,
}

impl SignedUrl {
    /// Formats the URL against a storage base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!(
            "{}/storage/v1/object/sign/{}/{}?token={}&expires={}",
            base_url.trim_end_matches('/'),
            self.bucket,
            self.path,
            self.signature,
            self.expires_at.timestamp()
        )
    }
}

/// Returns the bucket relative path embedded in a public URL.
///
/// # Examples
///
/// ```
/// use folio::extract_storage_path;
///
/// let url = "https://cdn.test/storage/v1/object/public/resource-files/guide/a.pdf";
/// assert_eq!(extract_storage_path(url), Some("guide/a.pdf"));
/// assert_eq!(extract_storage_path("https://cdn.test/other/a.pdf"), None);
/// ```
pub fn extract_storage_path(url: &str) -> Option<&str> {
    url.split_once(&format!("{}/", BUCKET))
        .map(|(_, path)| path)
        .filter(|path| !path.is_empty())
}

/// Rejects empty, absolute and parent-relative object paths.
pub fn validate_path(path: &str) -> ObjectResult<()> {
    let invalid = || ObjectError::InvalidPath(path.to_string());

    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(invalid());
    }
    for component in Path::new(path).components() {
        if !matches!(component, Component::Normal(_)) {
            return Err(invalid());
        }
    }
    Ok(())
}

/// Object store backed by a local directory.
#[derive(Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
    secret: Vec<u8>,
}

impl LocalObjectStore {
    /// # Arguments
    ///
    /// * `root` - Directory holding the bucket
    /// * `base_url` - Prefix for public and signed URLs
    /// * `secret` - Key material for URL signatures
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret: secret.to_vec(),
        }
    }

    /// Stable public URL of an object.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, BUCKET, path
        )
    }

    /// Verifies signature and expiry of a URL issued by this store.
    ///
    /// # Errors
    ///
    /// - [`ObjectError::UrlExpired`] once `expires_at` has passed
    /// - [`ObjectError::InvalidSignature`] if any signed field was altered
    pub fn verify(&self, url: &SignedUrl) -> ObjectResult<()> {
        if Utc::now() > url.expires_at {
            return Err(ObjectError::UrlExpired);
        }

        let expected = self.sign(&url.bucket, &url.path, url.expires_at);
        if url.signature != expected {
            return Err(ObjectError::InvalidSignature);
        }
        Ok(())
    }

    /// Reads the bytes behind a verified signed URL.
    pub fn fetch(&self, url: &SignedUrl) -> ObjectResult<Vec<u8>> {
        self.verify(url)?;
        let path = self.object_path(&url.path)?;
        fs::read(&path).map_err(|e| map_io(e, &url.path))
    }

    fn object_path(&self, path: &str) -> ObjectResult<PathBuf> {
        validate_path(path)?;
        Ok(self.root.join(BUCKET).join(path))
    }

    fn sign(&self, bucket: &str, path: &str, expires_at: DateTime<Utc>) -> String {
        let message = format!("{}/{}/{}", bucket, path, expires_at.timestamp());
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(message.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }
}

fn map_io(err: io::Error, path: &str) -> ObjectError {
    match err.kind() {
        io::ErrorKind::NotFound => ObjectError::NotFound(path.to_string()),
        io::ErrorKind::AlreadyExists => ObjectError::AlreadyExists(path.to_string()),
        _ => ObjectError::Io(err.to_string()),
    }
}

impl ObjectStore for LocalObjectStore {
    fn upload(&self, bytes: &[u8], path: &str) -> ObjectResult<String> {
        let full_path = self.object_path(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ObjectError::Io(e.to_string()))?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .map_err(|e| map_io(e, path))?;
        io::Write::write_all(&mut file, bytes).map_err(|e| ObjectError::Io(e.to_string()))?;

        debug!(path, size = bytes.len(), "uploaded object");
        Ok(self.public_url(path))
    }

    fn signed_url(&self, path: &str, ttl_seconds: u64) -> ObjectResult<SignedUrl> {
        let full_path = self.object_path(path)?;
        if !full_path.is_file() {
            return Err(ObjectError::NotFound(path.to_string()));
        }

        let expires_at = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or(ObjectError::InvalidTtl(ttl_seconds))?;
        Ok(SignedUrl {
            bucket: BUCKET.to_string(),
            path: path.to_string(),
            signature: self.sign(BUCKET, path, expires_at),
            expires_at,
        })
    }

    fn delete(&self, path: &str) -> ObjectResult<()> {
        let full_path = self.object_path(path)?;
        fs::remove_file(&full_path).map_err(|e| map_io(e, path))?;
        debug!(path, "deleted object");
        Ok(())
    }
}
