use crate::config::types::{Config, CookieConfig, HistoryConfig};
use crate::{ConfigError, ConfigResult};

/// Longest expiry window accepted, about a century
const MAX_EXPIRE_DAYS: u32 = 36_500;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_history_config(&config.history)?;
    if let Some(cookies) = &config.cookies {
        validate_cookie_config(cookies)?;
    }
    Ok(())
}

/// Validates history configuration
fn validate_history_config(config: &HistoryConfig) -> ConfigResult<()> {
    if config.file_path.is_empty() {
        return Err(ConfigError::Validation(
            "history file_path cannot be empty".to_string(),
        ));
    }

    if config.file_path.contains('\0') {
        return Err(ConfigError::Validation(format!(
            "history file_path contains a NUL byte: {:?}",
            config.file_path
        )));
    }

    if config.expire_days < 1 || config.expire_days > MAX_EXPIRE_DAYS {
        return Err(ConfigError::Validation(format!(
            "expire_days must be between 1 and {}, got {}",
            MAX_EXPIRE_DAYS, config.expire_days
        )));
    }

    Ok(())
}

/// Validates cookie configuration
fn validate_cookie_config(config: &CookieConfig) -> ConfigResult<()> {
    if config.file_path.is_empty() {
        return Err(ConfigError::Validation(
            "cookies file_path cannot be empty".to_string(),
        ));
    }

    if config.file_path.contains('\0') {
        return Err(ConfigError::Validation(format!(
            "cookies file_path contains a NUL byte: {:?}",
            config.file_path
        )));
    }

    Ok(())
}
