//! Output module for reporting on the database
//!
//! This module handles:
//! - Collecting statistics over hosts, URLs and cookies
//! - Printing statistics and URL listings for the maintenance tool
//! - Dumping the tree and index structure for debugging

pub mod dump;
pub mod stats;

pub use dump::write_dump;
pub use stats::{collect_statistics, print_statistics, DbStatistics};

use crate::db::UrlEntry;
use chrono::{TimeZone, Utc};

/// Formats one URL entry as a listing line
///
/// The line holds the last visit time (or `never`), the visit count, the
/// URL and, when known, the title.
pub fn format_entry(entry: &UrlEntry<'_>) -> String {
    let last_visit = if entry.data.last_visit > 0 {
        Utc.timestamp_opt(entry.data.last_visit, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.data.last_visit.to_string())
    } else {
        "never".to_string()
    };

    match &entry.data.title {
        Some(title) => format!("{}  {:>5}  {}  {}", last_visit, entry.data.visits, entry.url, title),
        None => format!("{}  {:>5}  {}", last_visit, entry.data.visits, entry.url),
    }
}
