use crate::storage::{write_atomically, StorageResult};
use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Where the configuration hash of the last compaction is kept
///
/// The stamp sits beside the history file, named after it with a
/// `.config-hash` suffix.
pub fn stamp_path(history: &Path) -> PathBuf {
    let mut name = history
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("history"));
    name.push(".config-hash");
    history.with_file_name(name)
}

/// Reads the hash recorded by the last compaction
///
/// # Returns
///
/// * `Ok(Some(hash))` - The recorded hash
/// * `Ok(None)` - No compaction has been recorded yet
/// * `Err(StorageError)` - The stamp exists but couldn't be read
pub fn read_stamp(history: &Path) -> StorageResult<Option<String>> {
    match fs::read_to_string(stamp_path(history)) {
        Ok(text) => Ok(Some(text.trim().to_string()).filter(|h| !h.is_empty())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Compares a configuration hash with the one last recorded
///
/// # Returns
///
/// * `Ok(Some(previous))` - A different hash was recorded
/// * `Ok(None)` - The hashes match, or nothing was recorded yet
pub fn stamp_mismatch(history: &Path, hash: &str) -> StorageResult<Option<String>> {
    Ok(read_stamp(history)?.filter(|previous| previous != hash))
}

/// Records the configuration hash a compaction ran with
pub fn write_stamp(history: &Path, hash: &str) -> StorageResult<()> {
    write_atomically(&stamp_path(history), |w| {
        writeln!(w, "{}", hash)?;
        Ok(())
    })
}
