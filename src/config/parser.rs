use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Loads and validates the configuration file at `path`
///
/// # Returns
///
/// * `Ok(Config)` - Parsed configuration that passed validation
/// * `Err(ConfigError)` - Unreadable file, invalid TOML or a failed check
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use urldb::config::load_config;
///
/// let config = load_config(Path::new("urldb.toml")).unwrap();
/// println!("Expire after: {} days", config.history.expire_days);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    parse_config(&fs::read_to_string(path)?)
}

/// Hex-encoded SHA-256 of a configuration file
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    Ok(hash_content(&fs::read_to_string(path)?))
}

/// Loads a configuration along with the hash of the text it came from
///
/// The file is read once, so the hash always describes the configuration
/// that was returned.
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, hash_content(&content)))
}

fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn hash_content(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}
