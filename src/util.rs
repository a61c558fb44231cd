//! Formatting helpers for generated pages

use chrono::{DateTime, Utc};

/// Formats a timestamp as a short calendar date
///
/// # Arguments
///
/// * `date`: UTC timestamp
///
/// # Returns
///
/// Date string like "Jan 5, 2025"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Formats byte count as human readable file size
///
/// Converts byte count to appropriate unit (bytes, KB, MB) with two decimal
/// places for KB and MB. Uses binary prefixes.
///
/// # Arguments
///
/// * `bytes`: File size in bytes
///
/// # Returns
///
/// Formatted string like "512 bytes", "1.50 KB", or "2.00 MB"
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
