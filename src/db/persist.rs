use crate::config::Config;
use crate::db::UrlDb;
use crate::storage::{
    read_cookies, read_history, write_atomically, write_cookies, write_history, LoadSummary,
    StorageError, StorageResult,
};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use tracing::{info, warn};

/// Outcome of reading one of the configured files
enum Opened<T> {
    Loaded(T),
    Missing,
    Rejected(StorageError),
}

/// Sorts a load result into what [`UrlDb::open`] does with it
///
/// Only I/O failures other than a missing file are passed back as errors;
/// a file with an unsupported version or broken header is rejected.
fn classify<T>(result: StorageResult<T>) -> StorageResult<Opened<T>> {
    match result {
        Ok(value) => Ok(Opened::Loaded(value)),
        Err(StorageError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(Opened::Missing),
        Err(e @ (StorageError::UnsupportedVersion(_) | StorageError::Malformed { .. })) => {
            Ok(Opened::Rejected(e))
        }
        Err(e) => Err(e),
    }
}

impl UrlDb {
    /// Builds a database from the files named in a configuration
    ///
    /// A file that doesn't exist yet is treated as empty, so the first run
    /// starts with a fresh database. A history file with an unsupported
    /// version or a broken header is ignored with a warning, and the
    /// database starts empty rather than half loaded. The same goes for the
    /// cookie file, which leaves the jar empty.
    ///
    /// # Returns
    ///
    /// * `Ok(UrlDb)` - The loaded database, using the configured expiry
    /// * `Err(UrlDbError::Storage)` - A file exists but couldn't be read
    pub fn open(config: &Config) -> crate::Result<Self> {
        let fresh = || {
            let mut db = UrlDb::new();
            db.set_expire_days(config.history.expire_days);
            db
        };
        let mut db = fresh();

        let history = Path::new(&config.history.file_path);
        match classify(db.load(history))? {
            Opened::Loaded(_) => {}
            Opened::Missing => info!("No history file at {}, starting empty", history.display()),
            Opened::Rejected(e) => {
                warn!("Ignoring history file {}: {}", history.display(), e);
                db = fresh();
            }
        }

        if let Some(cookies) = &config.cookies {
            let path = Path::new(&cookies.file_path);
            match classify(db.load_cookies(path))? {
                Opened::Loaded(_) => {}
                Opened::Missing => info!("No cookie file at {}, starting empty", path.display()),
                Opened::Rejected(e) => warn!("Ignoring cookie file {}: {}", path.display(), e),
            }
        }

        Ok(db)
    }

    /// Loads a history file, merging it into the database
    ///
    /// See [`crate::storage::read_history`] for the format and the handling
    /// of damaged files.
    pub fn load(&mut self, path: &Path) -> StorageResult<LoadSummary> {
        let reader = BufReader::new(File::open(path)?);
        let summary = read_history(reader, self)?;
        info!(
            "Loaded {} URLs on {} hosts from {} (version {}, {} hosts skipped)",
            summary.urls,
            summary.hosts,
            path.display(),
            summary.version,
            summary.skipped_hosts
        );
        Ok(summary)
    }

    /// Saves the history file, dropping URLs not visited within the expiry
    /// window
    ///
    /// The file is replaced atomically. Returns the number of URLs written.
    pub fn save(&self, path: &Path) -> StorageResult<usize> {
        let cutoff = self.expiry_cutoff();
        let written = write_atomically(path, |w| write_history(w, self, cutoff))?;
        info!("Saved {} URLs to {}", written, path.display());
        Ok(written)
    }

    /// Loads a cookie file, adding its unexpired cookies to the jar
    ///
    /// Returns the number of cookies added.
    pub fn load_cookies(&mut self, path: &Path) -> StorageResult<usize> {
        let reader = BufReader::new(File::open(path)?);
        let cookies = read_cookies(reader, self.now())?;
        let count = cookies.len();
        for cookie in cookies {
            self.insert_cookie(cookie);
        }
        info!("Loaded {} cookies from {}", count, path.display());
        Ok(count)
    }

    /// Saves the persistent, unexpired cookies to a cookie file
    ///
    /// The file is replaced atomically. Returns the number of cookies
    /// written.
    pub fn save_cookies(&self, path: &Path) -> StorageResult<usize> {
        let now = self.now();
        let written = write_atomically(path, |w| write_cookies(w, self.cookies(), now))?;
        info!("Saved {} cookies to {}", written, path.display());
        Ok(written)
    }
}
