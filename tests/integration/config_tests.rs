//! Configuration files as the maintenance tool reads them

use std::fs;
use tempfile::TempDir;
use urldb::config::{load_config, load_config_with_hash};
use urldb::ConfigError;

#[test]
fn test_full_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urldb.toml");
    fs::write(
        &path,
        r#"
[history]
file-path = "./urls.db"
expire-days = 90

[cookies]
file-path = "./cookies.db"
"#,
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(&path).unwrap();
    assert_eq!(config.history.file_path, "./urls.db");
    assert_eq!(config.history.expire_days, 90);
    assert_eq!(config.cookies.map(|c| c.file_path).as_deref(), Some("./cookies.db"));
    assert_eq!(hash.len(), 64);
}

#[test]
fn test_expire_days_out_of_range() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urldb.toml");
    fs::write(&path, "[history]\nfile-path = \"u.db\"\nexpire-days = 40000\n").unwrap();

    assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
}

#[test]
fn test_empty_cookie_path_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("urldb.toml");
    fs::write(
        &path,
        "[history]\nfile-path = \"u.db\"\n\n[cookies]\nfile-path = \"\"\n",
    )
    .unwrap();

    assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
}
