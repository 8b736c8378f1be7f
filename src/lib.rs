//! urldb: a URL and cookie metadata database
//!
//! This crate tracks, per visited URL, visit history, HTTP authentication
//! credentials, certificate-trust overrides, thumbnails and cookies. Hosts are
//! stored in a tree keyed by reversed DNS labels, each host owning a tree of
//! path segments, and a per-initial-character AA tree index gives fast exact
//! and prefix lookup of hosts. The whole database persists to line-oriented
//! flat files.

pub mod clock;
pub mod config;
pub mod cookies;
pub mod db;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod tree;
pub mod url;

use thiserror::Error;

/// Main error type for urldb operations
#[derive(Debug, Error)]
pub enum UrlDbError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL has no authority component: {0}")]
    MissingAuthority(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("Host can't be indexed: {0}")]
    UnindexableHost(String),
}

/// Result type alias for urldb operations
pub type Result<T> = std::result::Result<T, UrlDbError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use cookies::{Cookie, CookieObserver, CookieVersion};
pub use db::{Bitmap, UrlDb, UrlEntry};
pub use state::{AuthData, ContentType, UrlData};
pub use tree::{HostId, PathId};
pub use url::{decompose_url, UrlParts};
