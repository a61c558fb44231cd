//! Portfolio content engine.
//!
//! Renders a small markdown subset, edits content through draft/save
//! sessions, gates resource downloads behind an email address and builds
//! the portfolio as a static site.

mod assets;
pub mod components;
mod config;
pub mod document;
pub mod draft;
pub mod markdown;
pub mod objects;
pub mod pages;
pub mod portfolio;
pub mod resources;
mod site;
pub mod store;
mod util;

pub use assets::{highlight_css, write_css_assets};
pub use config::{
    AboutChanges, Command, Config, FaqCommand, HeroChanges, PageChanges, ProjectCommand,
    ResourceCommand, ServiceCommand,
};
pub use document::{Document, DocumentEdit, TEMPLATE_BODY, is_valid_slug, slugify};
pub use draft::{
    DraftError, DraftResult, EditSession, EditState, Editable, Persist, SaveTicket, SessionId,
};
pub use markdown::{
    Block, ListKind, MarkdownRenderer, SourceBlock, Span, render, render_inline, render_spanned,
};
pub use objects::{
    BUCKET, LocalObjectStore, ObjectError, ObjectResult, ObjectStore, SignedUrl,
    extract_storage_path,
};
pub use portfolio::{
    Portfolio, PortfolioEdit, Project, ProjectStatus, ProjectUpdate, Service, ServiceUpdate,
};
pub use resources::{
    DOWNLOAD_TTL_SECONDS, DownloadGate, DownloadRecord, DownloadRow, GateError, GateResult,
    ResourceFile, ResourcePage, delete_page_with_files, download_report, is_valid_email,
    write_downloads_csv,
};
pub use site::{SiteOptions, SiteSummary, build_site};
pub use store::{DocumentStore, FsStore, MemoryStore, StoreError, StoreResult};
pub use util::{format_date, format_file_size};
