//! Reusable HTML components for page generation
//!
//! This module provides Maud component functions shared across the page
//! types (index, custom, resource, not found) so every generated page gets
//! the same header, footer and document shell.

pub mod footer;
pub mod layout;
pub mod nav;
