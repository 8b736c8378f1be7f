use crate::cookies::Cookie;
use crate::db::Bitmap;
use crate::state::{AuthData, UrlData};
use crate::tree::{HostId, PathId};
use std::cmp::Ordering;

/// One path segment of a host's path tree
///
/// The (segment, scheme, port) triple identifies a node among its siblings,
/// so `http://h/a` and `https://h/a` are distinct nodes.
pub struct PathNode {
    /// Path segment; empty for a directory's own resource
    pub segment: String,

    pub scheme: String,

    /// 0 when the URL has no explicit port
    pub port: u16,

    /// Fragment identifiers seen for this resource
    pub fragments: Vec<String>,

    /// Canonical URL of the resource; set on first insertion
    pub url: Option<String>,

    pub data: UrlData,

    pub thumbnail: Option<Box<dyn Bitmap>>,

    pub auth: Option<AuthData>,

    pub cookies: Vec<Cookie>,

    pub parent: Option<PathId>,

    /// Owning host, set on path tree roots only
    pub host: Option<HostId>,

    children: Vec<PathId>,
}

impl PathNode {
    fn new(segment: &str, scheme: &str, port: u16, parent: Option<PathId>) -> Self {
        Self {
            segment: segment.to_string(),
            scheme: scheme.to_string(),
            port,
            fragments: Vec::new(),
            url: None,
            data: UrlData::default(),
            thumbnail: None,
            auth: None,
            cookies: Vec::new(),
            parent,
            host: None,
            children: Vec::new(),
        }
    }

    fn matches(&self, segment: &str, scheme: &str, port: u16) -> bool {
        self.segment == segment && self.scheme.eq_ignore_ascii_case(scheme) && self.port == port
    }

    pub fn children(&self) -> &[PathId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Adds a fragment, keeping the set sorted and free of duplicates
    ///
    /// Both ordering and duplicate detection ignore ASCII case.
    pub fn add_fragment(&mut self, fragment: &str) {
        let key = fragment.to_ascii_lowercase();
        if let Err(pos) = self
            .fragments
            .binary_search_by(|f| f.to_ascii_lowercase().cmp(&key))
        {
            self.fragments.insert(pos, fragment.to_string());
        }
    }
}

/// Path tree arena, holding the path trees of every host
#[derive(Default)]
pub struct PathTree {
    nodes: Vec<PathNode>,
}

impl PathTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the sentinel root of a host's path tree
    pub fn new_root(&mut self, host: HostId) -> PathId {
        let id = PathId(self.nodes.len());
        let mut root = PathNode::new("", "", 0, None);
        root.host = Some(host);
        self.nodes.push(root);
        id
    }

    pub fn get(&self, id: PathId) -> &PathNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: PathId) -> &mut PathNode {
        &mut self.nodes[id.0]
    }

    /// Total number of nodes, path tree roots included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates every node of every host's path tree
    pub fn iter(&self) -> impl Iterator<Item = &PathNode> + '_ {
        self.nodes.iter()
    }

    /// Finds a direct child by (segment, scheme, port)
    pub fn find_child(&self, parent: PathId, segment: &str, scheme: &str, port: u16) -> Option<PathId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.0].matches(segment, scheme, port))
    }

    /// Finds or creates a direct child, keeping children sorted by segment
    pub fn find_or_create_child(&mut self, parent: PathId, segment: &str, scheme: &str, port: u16) -> PathId {
        if let Some(existing) = self.find_child(parent, segment, scheme, port) {
            return existing;
        }

        let id = PathId(self.nodes.len());
        self.nodes
            .push(PathNode::new(segment, scheme, port, Some(parent)));

        // New nodes go after any siblings with an equal segment
        let siblings = &self.nodes[parent.0].children;
        let pos = siblings
            .iter()
            .position(|&c| {
                self.nodes[c.0].segment.as_bytes().cmp(segment.as_bytes()) == Ordering::Greater
            })
            .unwrap_or(siblings.len());
        self.nodes[parent.0].children.insert(pos, id);
        id
    }

    /// Inserts a path below a host's path tree root, returning its terminal node
    ///
    /// The leading `/` is stripped and the rest split on `/`, so `/` maps to
    /// a single empty segment and `/a/b/` ends in an empty segment. A
    /// fragment is merged into the terminal node's fragment set. The node's
    /// URL is only set if it has none yet.
    pub fn add_path(
        &mut self,
        root: PathId,
        scheme: &str,
        port: u16,
        path: &str,
        fragment: Option<&str>,
        url: &str,
    ) -> PathId {
        let mut node = root;
        for segment in split_segments(path) {
            node = self.find_or_create_child(node, segment, scheme, port);
        }

        let terminal = &mut self.nodes[node.0];
        if let Some(fragment) = fragment {
            terminal.add_fragment(fragment);
        }
        if terminal.url.is_none() {
            terminal.url = Some(url.to_string());
        }
        node
    }

    /// Looks up a path below a root, matching every segment exactly
    pub fn match_path(&self, root: PathId, scheme: &str, port: u16, path: &str) -> Option<PathId> {
        split_segments(path).try_fold(root, |node, segment| {
            self.find_child(node, segment, scheme, port)
        })
    }

    /// Returns the root of the path tree containing a node
    pub fn root_of(&self, id: PathId) -> PathId {
        let mut node = id;
        while let Some(parent) = self.nodes[node.0].parent {
            node = parent;
        }
        node
    }

    /// Returns the host owning the path tree containing a node
    pub fn owning_host(&self, id: PathId) -> Option<HostId> {
        self.nodes[self.root_of(id).0].host
    }

    /// Iterates a node and everything below it, depth first in path order
    pub fn walk(&self, root: PathId) -> Walk<'_> {
        Walk {
            tree: self,
            stack: vec![root],
        }
    }

    /// Iterates the leaf resources below a node in path order
    ///
    /// Nodes without children and without a URL (such as an empty path tree
    /// root) are skipped.
    pub fn leaves(&self, root: PathId) -> impl Iterator<Item = PathId> + '_ {
        self.walk(root).filter(move |&id| {
            let node = &self.nodes[id.0];
            node.children.is_empty() && node.url.is_some()
        })
    }
}

/// Splits a path into the segments stored in the tree
pub(crate) fn split_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// Pre-order iterator over a path tree
pub struct Walk<'a> {
    tree: &'a PathTree,
    stack: Vec<PathId>,
}

impl Iterator for Walk<'_> {
    type Item = PathId;

    fn next(&mut self) -> Option<PathId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.nodes[id.0].children.iter().rev());
        Some(id)
    }
}
