//! Utility functions for string handling, URL tagging, and file system checks.

use crate::error::Result;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a character
/// boundary) and get `"…(+N bytes)"` appended.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Convert a title to a URL-friendly slug.
///
/// ```ignore
/// assert_eq!(slugify_title("Hello World"), "hello-world");
/// assert_eq!(slugify_title("Test-Article!"), "test-article");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ' && c != '-', "")
        .replace(' ', "-")
}

/// Extract the domain name (before .com/.org/etc) from a URL.
///
/// Used to tag each news row with its outlet.
///
/// # Arguments
///
/// * `url` - Article URL
///
/// # Returns
///
/// The second-to-last host label, or `None` if the URL does not parse or its
/// host has a single label.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(source_tag("https://www.aljazeera.com/news/x"), Some("aljazeera".into()));
/// assert_eq!(source_tag("https://localhost/x"), None);
/// ```
pub fn source_tag(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        Some(parts[parts.len() - 2].to_string())
    } else {
        None
    }
}

/// Escape characters that would break a Markdown table cell.
pub fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render a Markdown link that is safe inside a table cell.
///
/// # Arguments
///
/// * `text` - Link text; brackets and backslashes are escaped
/// * `url` - Destination; wrapped in `<...>` so spaces and parentheses survive
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     table_cell_link("[LIVE] Gaza", "https://x.example/a (b)"),
///     "[\\[LIVE\\] Gaza](<https://x.example/a (b)>)"
/// );
/// ```
pub fn table_cell_link(text: &str, url: &str) -> String {
    let text = escape_table_cell(&text.replace('\\', "\\\\"))
        .replace('[', "\\[")
        .replace(']', "\\]");
    let url = escape_table_cell(url)
        .replace('<', "%3C")
        .replace('>', "%3E");
    format!("[{text}](<{url}>)")
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<()> {
    fs::create_dir_all(path).await?;
    // Small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!("Output directory is writable");
    Ok(())
}
