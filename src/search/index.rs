use crate::search::AaTree;
use crate::tree::HostId;
use crate::url::{host_labels, is_ip_literal};
use std::cmp::Ordering;

/// Number of index buckets: one for IP literals, one per letter
pub const BUCKET_COUNT: usize = 27;

/// Index bucket used for IP literals
pub const IP_BUCKET: usize = 0;

/// Sort key of an indexed host: its lower-cased labels, leaf label first
///
/// Keys compare label by label starting from the leftmost label, and a key
/// that is a proper prefix of another sorts first, so `www.example.org`
/// sorts before `www.example.org.uk`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostKey(Vec<String>);

impl HostKey {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn from_host(host: &str) -> Self {
        Self(host_labels(host))
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Rebuilds the host name
    pub fn host(&self) -> String {
        self.0.join(".")
    }

    pub fn bucket(&self) -> Option<usize> {
        self.0.first().and_then(|label| bucket_for(label))
    }
}

/// Selects the index bucket for a host from its first character
///
/// Returns None for hosts that can't be indexed, i.e. those starting with
/// anything other than an ASCII letter or digit.
pub fn bucket_for(host: &str) -> Option<usize> {
    let first = host.bytes().next()?.to_ascii_lowercase();
    match first {
        b'a'..=b'z' => Some((first - b'a') as usize + 1),
        b'0'..=b'9' => Some(IP_BUCKET),
        _ => None,
    }
}

/// Orders a prefix probe relative to a stored key
///
/// All probe labels but the last must equal the stored labels at the same
/// position. The last probe label only has to be a prefix of the stored
/// label, and the stored key may have further labels. A stored key with
/// fewer labels than the probe sorts before it.
fn prefix_cmp(probe: &[String], stored: &[String]) -> Ordering {
    let last = probe.len().saturating_sub(1);
    for (i, label) in probe.iter().enumerate() {
        let Some(candidate) = stored.get(i) else {
            return Ordering::Greater;
        };

        if i == last {
            let candidate = candidate.as_bytes();
            let truncated = &candidate[..label.len().min(candidate.len())];
            return label.as_bytes().cmp(truncated);
        }

        match label.cmp(candidate) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Splits a host prefix typed by a user into probe labels
fn probe_labels(prefix: &str) -> Vec<String> {
    if is_ip_literal(prefix) {
        vec![prefix.to_ascii_lowercase()]
    } else {
        prefix.split('.').map(|l| l.to_ascii_lowercase()).collect()
    }
}

/// Per-initial-character index of fully-qualified hosts
pub struct SearchIndex {
    buckets: Vec<AaTree<HostKey, HostId>>,
}

impl Default for SearchIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchIndex {
    pub fn new() -> Self {
        Self {
            buckets: (0..BUCKET_COUNT).map(|_| AaTree::new()).collect(),
        }
    }

    /// Total number of indexed hosts
    pub fn len(&self) -> usize {
        self.buckets.iter().map(AaTree::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The per-character trees, IP bucket first
    pub fn buckets(&self) -> &[AaTree<HostKey, HostId>] {
        &self.buckets
    }

    /// Indexes a host node
    ///
    /// Returns false if the host was already indexed or can't be indexed.
    pub fn insert(&mut self, key: HostKey, host: HostId) -> bool {
        match key.bucket() {
            Some(bucket) => self.buckets[bucket].insert(key, host),
            None => false,
        }
    }

    pub fn remove(&mut self, key: &HostKey) -> Option<HostId> {
        let bucket = key.bucket()?;
        self.buckets[bucket].remove(key)
    }

    /// Looks up a host by exact name, ignoring case
    pub fn find(&self, host: &str) -> Option<HostId> {
        let key = HostKey::from_host(host);
        let bucket = key.bucket()?;
        self.buckets[bucket].get(&key).copied()
    }

    /// Visits, in index order, every host whose name starts with `prefix`
    ///
    /// Matching is done label by label (see the comparator notes on
    /// [`HostKey`]); only the final label of the prefix may be partial. The
    /// visitor returns false to stop, in which case this returns false.
    pub fn visit_prefix<F>(&self, prefix: &str, mut visitor: F) -> bool
    where
        F: FnMut(&HostKey, HostId) -> bool,
    {
        let Some(bucket) = bucket_for(prefix) else {
            return true;
        };
        let probe = probe_labels(prefix);
        self.buckets[bucket].visit_matching(
            |stored| prefix_cmp(&probe, stored.labels()),
            |key, host| visitor(key, *host),
        )
    }

    /// Iterates every indexed host: IP literals first, then `a` to `z`
    pub fn iter(&self) -> impl Iterator<Item = (&HostKey, HostId)> + '_ {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|(key, host)| (key, *host)))
    }
}
