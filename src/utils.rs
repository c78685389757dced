//! Utility functions for string manipulation and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - String truncation for logging
//! - Slugification for posting ids
//! - Output directory validation before a run starts

use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary)
/// with an ellipsis and the number of omitted bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Convert text to a URL-friendly slug.
///
/// Lowercases the text, removes special characters, and replaces spaces
/// with hyphens. Used for the readable suffix of posting ids.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(slugify_title("Field Officer"), "field-officer");
/// assert_eq!(slugify_title("Driver!"), "driver");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Ensure the directory that will hold `output_path` exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file so
/// that a permission problem surfaces before any scraping happens.
#[instrument(level = "info", skip_all, fields(path = %output_path))]
pub async fn ensure_writable_parent(output_path: &str) -> Result<(), Box<dyn Error>> {
    let dir = match Path::new(output_path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;

    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}
