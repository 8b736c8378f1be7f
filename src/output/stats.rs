//! Statistics over the URL database
//!
//! This module counts what the database holds and prints the counts for the
//! maintenance tool.

use crate::db::UrlDb;
use crate::state::ContentType;
use std::collections::HashMap;

/// Database statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbStatistics {
    /// Hosts reachable through the search index
    pub indexed_hosts: u64,

    /// Domain tree nodes, intermediate labels included
    pub host_nodes: u64,

    /// Path tree nodes, per-host roots included
    pub path_nodes: u64,

    /// Leaf URLs
    pub urls: u64,

    /// Leaf URLs visited at least once
    pub visited_urls: u64,

    /// Count of URLs by content type
    pub urls_by_type: HashMap<ContentType, u64>,

    pub cookies: u64,

    /// Cookies that outlive the session
    pub persistent_cookies: u64,

    /// Paths holding authentication details
    pub auth_entries: u64,

    pub thumbnails: u64,

    /// Hosts accepting invalid certificates
    pub cert_overrides: u64,
}

/// Counts the contents of a database
///
/// # Arguments
///
/// * `db` - The database to inspect
///
/// # Returns
///
/// The collected statistics
pub fn collect_statistics(db: &UrlDb) -> DbStatistics {
    let mut stats = DbStatistics {
        indexed_hosts: db.index().len() as u64,
        host_nodes: db.hosts().len() as u64,
        path_nodes: db.paths().len() as u64,
        ..Default::default()
    };

    for entry in db.entries() {
        stats.urls += 1;
        if entry.data.visits > 0 {
            stats.visited_urls += 1;
        }
        *stats.urls_by_type.entry(entry.data.content_type).or_insert(0) += 1;
    }

    for cookie in db.cookies() {
        stats.cookies += 1;
        if cookie.persistent {
            stats.persistent_cookies += 1;
        }
    }

    for node in db.paths().iter() {
        if node.auth.is_some() {
            stats.auth_entries += 1;
        }
        if node.thumbnail.is_some() {
            stats.thumbnails += 1;
        }
    }

    stats.cert_overrides = db
        .hosts()
        .iter()
        .filter(|host| host.permit_invalid_certs)
        .count() as u64;

    stats
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DbStatistics) {
    println!("=== URL Database Statistics ===\n");

    println!("Overview:");
    println!("  Indexed hosts: {}", stats.indexed_hosts);
    println!("  Host nodes: {}", stats.host_nodes);
    println!("  Path nodes: {}", stats.path_nodes);
    println!("  URLs: {}", stats.urls);
    println!();

    if !stats.urls_by_type.is_empty() {
        println!("URLs by Content Type:");
        let mut type_counts: Vec<_> = stats.urls_by_type.iter().collect();
        type_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (content_type, count) in type_counts {
            let percentage = (*count as f64 / stats.urls as f64) * 100.0;
            println!("  {}: {} ({:.1}%)", content_type, count, percentage);
        }
        println!();
    }

    println!("Cookies:");
    println!("  Total: {}", stats.cookies);
    println!("  Persistent: {}", stats.persistent_cookies);
    println!();

    println!("Other Data:");
    println!("  Authentication entries: {}", stats.auth_entries);
    println!("  Thumbnails: {}", stats.thumbnails);
    println!("  Certificate overrides: {}", stats.cert_overrides);
    println!();

    let visited_rate = if stats.urls > 0 {
        (stats.visited_urls as f64 / stats.urls as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Visited: {:.1}% ({} / {} URLs visited at least once)",
        visited_rate, stats.visited_urls, stats.urls
    );
}
