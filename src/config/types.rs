use crate::db::DEFAULT_EXPIRE_DAYS;
use serde::Deserialize;

/// Main configuration structure for the maintenance tool
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub history: HistoryConfig,

    /// Cookie file settings; cookies are not touched when absent
    #[serde(default)]
    pub cookies: Option<CookieConfig>,
}

/// URL history file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Path to the history file
    #[serde(rename = "file-path")]
    pub file_path: String,

    /// Days after its last visit that a URL is dropped on save
    #[serde(rename = "expire-days", default = "default_expire_days")]
    pub expire_days: u32,
}

/// Cookie file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    /// Path to the cookie file
    #[serde(rename = "file-path")]
    pub file_path: String,
}

fn default_expire_days() -> u32 {
    DEFAULT_EXPIRE_DAYS
}
