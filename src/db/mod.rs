//! The URL database
//!
//! [`UrlDb`] owns the domain tree, the path trees and the search index, and
//! is the only type callers need. Operations are grouped by concern:
//! - `urls`: adding, finding and annotating URLs
//! - `auth`: HTTP authentication details and certificate overrides
//! - `iterate`: whole-database and autocompletion walks
//! - `cookies`: the cookie jar
//! - `persist`: loading and saving the history and cookie files
//!
//! The database is single-threaded; wrap it in a `Mutex` to share it.

mod auth;
mod cookies;
mod iterate;
mod persist;
mod urls;

use crate::clock::{Clock, SystemClock};
use crate::cookies::CookieObserver;
use crate::output::{collect_statistics, DbStatistics};
use crate::search::{bucket_for, HostKey, SearchIndex};
use crate::state::UrlData;
use crate::tree::{HostId, HostTree, PathId, PathNode, PathTree};
use crate::{UrlError, UrlResult};

/// Default number of days a visited URL is kept
pub const DEFAULT_EXPIRE_DAYS: u32 = 28;

const SECONDS_PER_DAY: i64 = 86_400;

/// A thumbnail image owned by the database
///
/// The database only holds thumbnails; the image itself is opaque. A
/// replaced thumbnail is dropped.
pub trait Bitmap: Send {
    /// File the image is stored in, if any, recorded in the history file
    fn filename(&self) -> Option<String> {
        None
    }
}

/// A visited URL with its metadata, as yielded by the iteration methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlEntry<'a> {
    pub url: &'a str,
    pub data: &'a UrlData,
}

/// URL and cookie metadata database
pub struct UrlDb {
    hosts: HostTree,
    paths: PathTree,
    index: SearchIndex,
    clock: Box<dyn Clock>,
    expire_days: u32,
    cookie_observer: Option<Box<dyn CookieObserver>>,
}

impl Default for UrlDb {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlDb {
    /// Creates an empty database using the system clock
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Creates an empty database using the given clock
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        let mut paths = PathTree::new();
        let hosts = HostTree::new(&mut paths);
        Self {
            hosts,
            paths,
            index: SearchIndex::new(),
            clock,
            expire_days: DEFAULT_EXPIRE_DAYS,
            cookie_observer: None,
        }
    }

    pub fn set_clock(&mut self, clock: Box<dyn Clock>) {
        self.clock = clock;
    }

    /// Current time according to the database clock
    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Sets how many days after its last visit a URL is dropped on save
    pub fn set_expire_days(&mut self, days: u32) {
        self.expire_days = days;
    }

    pub fn expire_days(&self) -> u32 {
        self.expire_days
    }

    /// Visits at or before this time are dropped on save
    pub fn expiry_cutoff(&self) -> i64 {
        self.now() - i64::from(self.expire_days) * SECONDS_PER_DAY
    }

    /// Finds or creates a host, registering it in the search index
    ///
    /// Hosts starting with anything other than a letter or digit are added
    /// to the domain tree but can't be found through the index.
    pub fn add_host(&mut self, host: &str) -> HostId {
        let id = self.hosts.insert(host, &mut self.paths);
        self.index.insert(HostKey::new(self.hosts.labels(id)), id);
        id
    }

    /// Finds or creates a host that lookups can reach
    ///
    /// Fails without touching the database when the host would be left out
    /// of the search index.
    pub(crate) fn add_indexed_host(&mut self, host: &str) -> UrlResult<HostId> {
        if bucket_for(host).is_none() {
            return Err(UrlError::UnindexableHost(host.to_string()));
        }
        Ok(self.add_host(host))
    }

    /// Finds or creates a path below a host
    ///
    /// # Arguments
    ///
    /// * `scheme` - URL scheme; part of the node identity
    /// * `port` - Explicit port, or 0
    /// * `host` - Host returned by [`UrlDb::add_host`]
    /// * `path` - Path plus query, starting with `/`
    /// * `fragment` - Fragment to merge into the node's fragment set
    /// * `url` - Canonical URL, stored if the node has none yet
    ///
    /// # Returns
    ///
    /// The node for the final path segment
    pub fn add_path(
        &mut self,
        scheme: &str,
        port: u16,
        host: HostId,
        path: &str,
        fragment: Option<&str>,
        url: &str,
    ) -> PathId {
        let root = self.hosts.get(host).paths;
        self.paths.add_path(root, scheme, port, path, fragment, url)
    }

    pub fn hosts(&self) -> &HostTree {
        &self.hosts
    }

    pub fn paths(&self) -> &PathTree {
        &self.paths
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }

    pub fn node(&self, id: PathId) -> &PathNode {
        self.paths.get(id)
    }

    pub fn node_mut(&mut self, id: PathId) -> &mut PathNode {
        self.paths.get_mut(id)
    }

    /// Counts what the database holds
    pub fn statistics(&self) -> DbStatistics {
        collect_statistics(self)
    }
}
