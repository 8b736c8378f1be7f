//! Flat-file persistence for the database
//!
//! This module handles reading and writing the two on-disk files:
//! - the URL history file (line-oriented, versions 105 and 106)
//! - the cookie file (tab-separated records, version 102)
//! - a one-line stamp recording the configuration hash of the last compaction
//!
//! Saves are atomic: data is written to a temporary file next to the target
//! and renamed over it, so a failed save never truncates the previous file.

mod cookie_file;
mod history;
mod stamp;

pub use cookie_file::{read_cookies, write_cookies, COOKIE_FILE_VERSION};
pub use history::{
    read_history, write_history, LoadSummary, HISTORY_VERSION, MIN_HISTORY_VERSION,
};
pub use stamp::{read_stamp, stamp_mismatch, stamp_path, write_stamp};

use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Errors that can occur while loading or saving database files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(i64),

    #[error("Malformed file at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Writes a file atomically
///
/// # Arguments
///
/// * `path` - Destination file
/// * `write` - Callback producing the file contents
///
/// # Returns
///
/// * `Ok(T)` - Whatever the callback returned, once the file is in place
/// * `Err(StorageError)` - The write or rename failed; `path` is untouched
pub fn write_atomically<T, F>(path: &Path, write: F) -> StorageResult<T>
where
    F: FnOnce(&mut dyn Write) -> StorageResult<T>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    let result = {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let result = write(&mut writer)?;
        writer.flush()?;
        result
    };
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(result)
}

/// Line reader that tracks line numbers for error reporting
///
/// Bytes that aren't valid UTF-8 are replaced with U+FFFD, so text written
/// in a legacy encoding degrades instead of failing the read.
pub(crate) struct LineReader<R> {
    inner: R,
    line: usize,
    bytes: Vec<u8>,
    buf: String,
}

impl<R: BufRead> LineReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            bytes: Vec::new(),
            buf: String::new(),
        }
    }

    /// Number of the line most recently read, starting at 1
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Reads the next line without its terminator; None at end of file
    pub(crate) fn next_line(&mut self) -> StorageResult<Option<&str>> {
        self.bytes.clear();
        if self.inner.read_until(b'\n', &mut self.bytes)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        self.buf = String::from_utf8_lossy(&self.bytes).into_owned();
        Ok(Some(self.buf.trim_end_matches(&['\n', '\r'][..])))
    }
}
