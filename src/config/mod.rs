//! Configuration module for the urldb maintenance tool
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use urldb::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("urldb.toml")).unwrap();
//! println!("History file: {}", config.history.file_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CookieConfig, HistoryConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
