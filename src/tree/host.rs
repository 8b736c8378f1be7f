use crate::tree::{HostId, PathId, PathTree};
use crate::url::host_labels;
use std::collections::HashMap;

/// One DNS label of the domain tree, or a whole IP literal
#[derive(Debug, Clone)]
pub struct HostNode {
    /// Lower-cased label; empty for the root sentinel
    pub label: String,

    pub parent: Option<HostId>,

    /// Accept invalid TLS certificates for every path on this host
    pub permit_invalid_certs: bool,

    /// Root of this host's path tree
    pub paths: PathId,

    children: HashMap<String, HostId>,
}

/// Domain tree arena
///
/// Index 0 is the root sentinel, which is never a real host.
#[derive(Debug, Clone)]
pub struct HostTree {
    nodes: Vec<HostNode>,
}

impl HostTree {
    /// Creates a tree holding only the root sentinel
    pub fn new(paths: &mut PathTree) -> Self {
        let root = HostId(0);
        let root_paths = paths.new_root(root);
        Self {
            nodes: vec![HostNode {
                label: String::new(),
                parent: None,
                permit_invalid_certs: false,
                paths: root_paths,
                children: HashMap::new(),
            }],
        }
    }

    pub fn root(&self) -> HostId {
        HostId(0)
    }

    pub fn get(&self, id: HostId) -> &HostNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: HostId) -> &mut HostNode {
        &mut self.nodes[id.0]
    }

    /// Number of nodes, excluding the root sentinel
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates every node except the root sentinel
    pub fn iter(&self) -> impl Iterator<Item = &HostNode> + '_ {
        self.nodes.iter().skip(1)
    }

    /// Finds a direct child by label, ignoring case
    pub fn child(&self, parent: HostId, label: &str) -> Option<HostId> {
        self.nodes[parent.0]
            .children
            .get(&label.to_ascii_lowercase())
            .copied()
    }

    /// Direct children of a node, ordered by label
    pub fn children(&self, parent: HostId) -> Vec<HostId> {
        let mut children: Vec<_> = self.nodes[parent.0].children.iter().collect();
        children.sort_by(|a, b| a.0.cmp(b.0));
        children.into_iter().map(|(_, &id)| id).collect()
    }

    /// Finds the node for a host without creating anything
    pub fn find(&self, host: &str) -> Option<HostId> {
        host_labels(host)
            .iter()
            .rev()
            .try_fold(self.root(), |node, label| self.child(node, label))
    }

    /// Follows a host's labels as far as they exist in the tree
    ///
    /// Returns the root sentinel if not even the top-level label is known.
    pub fn deepest(&self, host: &str) -> HostId {
        let mut node = self.root();
        for label in host_labels(host).iter().rev() {
            match self.child(node, label) {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    /// Finds or creates the node chain for a host, returning its leaf
    ///
    /// Labels are walked from the top-level domain to the leftmost label; an
    /// IP literal is a single child of the root. Existing nodes are reused,
    /// so inserting the same host twice yields the same node.
    pub fn insert(&mut self, host: &str, paths: &mut PathTree) -> HostId {
        let mut node = self.root();
        for label in host_labels(host).into_iter().rev() {
            node = match self.child(node, &label) {
                Some(existing) => existing,
                None => self.create_child(node, label, paths),
            };
        }
        node
    }

    fn create_child(&mut self, parent: HostId, label: String, paths: &mut PathTree) -> HostId {
        let id = HostId(self.nodes.len());
        let root_paths = paths.new_root(id);
        self.nodes.push(HostNode {
            label: label.clone(),
            parent: Some(parent),
            permit_invalid_certs: false,
            paths: root_paths,
            children: HashMap::new(),
        });
        self.nodes[parent.0].children.insert(label, id);
        id
    }

    /// Lower-cased labels of a host in leaf-to-root order
    pub fn labels(&self, id: HostId) -> Vec<String> {
        self.ancestors(id)
            .map(|n| self.nodes[n.0].label.clone())
            .collect()
    }

    /// Reconstructs the fully-qualified host name of a node
    pub fn fqdn(&self, id: HostId) -> String {
        self.labels(id).join(".")
    }

    /// Iterates from a node up to, but excluding, the root sentinel
    pub fn ancestors(&self, id: HostId) -> impl Iterator<Item = HostId> + '_ {
        std::iter::successors(Some(id), move |n| self.nodes[n.0].parent)
            .filter(|n| n.0 != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_tree() -> (HostTree, PathTree) {
        let mut paths = PathTree::new();
        let hosts = HostTree::new(&mut paths);
        (hosts, paths)
    }

    #[test]
    fn test_insert_builds_label_chain() {
        let (mut hosts, mut paths) = new_tree();
        let leaf = hosts.insert("www.example.org", &mut paths);

        assert_eq!(hosts.get(leaf).label, "www");
        assert_eq!(hosts.fqdn(leaf), "www.example.org");
        assert_eq!(hosts.len(), 3);

        let org = hosts.child(hosts.root(), "org").unwrap();
        let example = hosts.child(org, "EXAMPLE").unwrap();
        assert_eq!(hosts.child(example, "www"), Some(leaf));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let (mut hosts, mut paths) = new_tree();
        let a = hosts.insert("www.example.org", &mut paths);
        let b = hosts.insert("WWW.Example.Org", &mut paths);
        assert_eq!(a, b);
        assert_eq!(hosts.len(), 3);
    }

    #[test]
    fn test_siblings_share_parents() {
        let (mut hosts, mut paths) = new_tree();
        let www = hosts.insert("www.example.org", &mut paths);
        let mail = hosts.insert("mail.example.org", &mut paths);
        assert_ne!(www, mail);
        assert_eq!(hosts.get(www).parent, hosts.get(mail).parent);
        assert_eq!(hosts.len(), 4);
    }

    #[test]
    fn test_ip_literal_is_one_label() {
        let (mut hosts, mut paths) = new_tree();
        let ip = hosts.insert("192.168.0.1", &mut paths);
        assert_eq!(hosts.get(ip).parent, Some(hosts.root()));
        assert_eq!(hosts.fqdn(ip), "192.168.0.1");
    }

    #[test]
    fn test_find_does_not_create() {
        let (mut hosts, mut paths) = new_tree();
        assert_eq!(hosts.find("example.org"), None);
        let leaf = hosts.insert("example.org", &mut paths);
        assert_eq!(hosts.find("Example.ORG"), Some(leaf));
        assert_eq!(hosts.find("www.example.org"), None);
        assert_eq!(hosts.len(), 2);
    }

    #[test]
    fn test_deepest_stops_at_unknown_label() {
        let (mut hosts, mut paths) = new_tree();
        let example = hosts.insert("example.org", &mut paths);
        assert_eq!(hosts.deepest("foo.bar.example.org"), example);
        assert_eq!(hosts.deepest("example.org"), example);
        assert_eq!(hosts.deepest("example.com"), hosts.root());
    }

    #[test]
    fn test_children_sorted_by_label() {
        let (mut hosts, mut paths) = new_tree();
        let www = hosts.insert("www.example.org", &mut paths);
        let mail = hosts.insert("mail.example.org", &mut paths);
        let api = hosts.insert("api.example.org", &mut paths);
        let example = hosts.get(www).parent.unwrap();
        assert_eq!(hosts.children(example), vec![api, mail, www]);
    }

    #[test]
    fn test_every_node_owns_a_path_root() {
        let (mut hosts, mut paths) = new_tree();
        let leaf = hosts.insert("www.example.org", &mut paths);
        for id in hosts.ancestors(leaf) {
            let root = hosts.get(id).paths;
            assert_eq!(paths.get(root).host, Some(id));
        }
    }

    #[test]
    fn test_ancestors_exclude_root() {
        let (mut hosts, mut paths) = new_tree();
        let leaf = hosts.insert("a.b.c", &mut paths);
        let labels: Vec<_> = hosts
            .ancestors(leaf)
            .map(|id| hosts.get(id).label.clone())
            .collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }
}
