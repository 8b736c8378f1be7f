use crate::db::{UrlDb, UrlEntry};
use crate::search::bucket_for;
use crate::state::UrlData;
use crate::tree::PathId;
use crate::url::{has_www_prefix, strip_scheme};
use std::cmp::Ordering;

type Visitor<'v, 'a> = dyn FnMut(UrlEntry<'a>) -> bool + 'v;

impl UrlDb {
    /// Calls `callback` for every URL in the database
    ///
    /// Hosts are visited in index order (IP literals, then `a` to `z`) and
    /// each host's URLs in path order. The callback returns false to stop.
    pub fn iterate_entries<F>(&self, mut callback: F)
    where
        F: FnMut(&str, &UrlData) -> bool,
    {
        for entry in self.entries() {
            if !callback(entry.url, entry.data) {
                break;
            }
        }
    }

    /// Iterates every URL in the database, in the order of [`UrlDb::iterate_entries`]
    pub fn entries(&self) -> impl Iterator<Item = UrlEntry<'_>> + '_ {
        self.index.iter().flat_map(move |(_, host)| {
            self.paths
                .leaves(self.hosts.get(host).paths)
                .filter_map(move |id| self.entry(id))
        })
    }

    /// Calls `callback` for every URL matching a partially typed address
    ///
    /// A prefix without a `/` selects hosts whose name starts with it, then
    /// hosts starting with `www.` followed by it, unless the prefix already
    /// looks like `www`. A prefix with a `/` names a host exactly (falling
    /// back to the `www.` form) and matches the path segment by segment,
    /// ignoring case, with only the last segment allowed to be partial. Any
    /// leading `scheme://` is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use urldb::UrlDb;
    ///
    /// let mut db = UrlDb::new();
    /// db.add_url("http://www.example.org/about.html").unwrap();
    /// db.add_url("http://www.rust-lang.org/").unwrap();
    ///
    /// let mut found = Vec::new();
    /// db.iterate_partial("exa", |url, _| {
    ///     found.push(url.to_string());
    ///     true
    /// });
    /// assert_eq!(found, vec!["http://www.example.org/about.html"]);
    /// ```
    pub fn iterate_partial<F>(&self, prefix: &str, mut callback: F)
    where
        F: FnMut(&str, &UrlData) -> bool,
    {
        self.visit_partial(prefix, &mut |entry| callback(entry.url, entry.data));
    }

    /// Collects the URLs [`UrlDb::iterate_partial`] would visit
    pub fn partial_entries(&self, prefix: &str) -> std::vec::IntoIter<UrlEntry<'_>> {
        let mut entries = Vec::new();
        self.visit_partial(prefix, &mut |entry| {
            entries.push(entry);
            true
        });
        entries.into_iter()
    }

    fn entry(&self, id: PathId) -> Option<UrlEntry<'_>> {
        let node = self.paths.get(id);
        Some(UrlEntry {
            url: node.url.as_deref()?,
            data: &node.data,
        })
    }

    fn visit_partial<'a>(&'a self, prefix: &str, visitor: &mut Visitor<'_, 'a>) -> bool {
        let prefix = strip_scheme(prefix);
        if bucket_for(prefix).is_none() {
            return true;
        }

        if let Some(slash) = prefix.find('/') {
            let host = &prefix[..slash];
            let found = self.index.find(host).or_else(|| {
                if has_www_prefix(host) {
                    None
                } else {
                    self.index.find(&format!("www.{}", host))
                }
            });
            return match found {
                Some(host) => {
                    self.visit_partial_path(self.hosts.get(host).paths, &prefix[slash + 1..], visitor)
                }
                None => true,
            };
        }

        let completed = self.index.visit_prefix(prefix, |_, host| {
            self.visit_leaves(self.hosts.get(host).paths, visitor)
        });
        if !completed || has_www_prefix(prefix) {
            return completed;
        }

        self.index.visit_prefix(&format!("www.{}", prefix), |_, host| {
            self.visit_leaves(self.hosts.get(host).paths, visitor)
        })
    }

    fn visit_partial_path<'a>(&'a self, parent: PathId, prefix: &str, visitor: &mut Visitor<'_, 'a>) -> bool {
        let (segment, rest) = match prefix.find('/') {
            Some(slash) => (&prefix[..slash], Some(&prefix[slash + 1..])),
            None => (prefix, None),
        };

        // "//" in the prefix
        if segment.is_empty() && rest.is_some() {
            return true;
        }

        for &child in self.paths.get(parent).children() {
            match compare_segment(&self.paths.get(child).segment, segment) {
                Ordering::Less => continue,
                Ordering::Greater => break,
                Ordering::Equal => {}
            }

            let keep_going = match rest {
                None => self.visit_leaves(child, visitor),
                Some(rest) => self.visit_partial_path(child, rest, visitor),
            };
            if !keep_going {
                return false;
            }
        }
        true
    }

    fn visit_leaves<'a>(&'a self, node: PathId, visitor: &mut Visitor<'_, 'a>) -> bool {
        self.paths
            .leaves(node)
            .filter_map(|id| self.entry(id))
            .all(|entry| visitor(entry))
    }
}

/// Compares a stored segment, truncated to the typed segment's length, with
/// the typed segment, ignoring ASCII case
fn compare_segment(stored: &str, typed: &str) -> Ordering {
    let stored = stored.as_bytes();
    let truncated = &stored[..typed.len().min(stored.len())];
    let lower = |b: &u8| b.to_ascii_lowercase();
    truncated.iter().map(lower).cmp(typed.as_bytes().iter().map(lower))
}
