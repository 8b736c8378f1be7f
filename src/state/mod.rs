//! Per-URL state tracking
//!
//! This module provides the metadata attached to each path in the database:
//! visit statistics, content type and HTTP authentication details.

mod content_type;
mod url_data;

pub use content_type::ContentType;
pub use url_data::{sanitise_title, AuthData, UrlData};
