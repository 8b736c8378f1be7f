//! URL handling module for urldb
//!
//! This module provides URL decomposition into the (scheme, host, port,
//! path) keys the database stores, host label helpers for the domain tree
//! and search index, and the domain/path matching rules used for cookies.

mod domain;
mod matcher;
mod parts;

// Re-export main functions
pub use domain::{has_www_prefix, host_labels, is_ip_literal, strip_scheme};
pub use matcher::{directory_of, domain_matches, path_matches};
pub use parts::{decompose_url, UrlParts};
