use std::cmp::Ordering;
use std::mem;

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    level: u32,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            level: 1,
            left: None,
            right: None,
        })
    }
}

/// A balanced binary search tree using Arne Andersson's level discipline
///
/// Every node carries a level: leaves are at level 1, a left child is one
/// level below its parent, a right child is at the same level or one below,
/// and no two consecutive right links stay on the same level. Empty subtrees
/// count as level 0. Insertion restores these rules with `skew` and `split`
/// on the way back up; removal additionally lowers levels that have become
/// too high before re-applying both.
pub struct AaTree<K, V> {
    root: Link<K, V>,
    len: usize,
}

impl<K: Ord, V> Default for AaTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> AaTree<K, V> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a key, returning false (and leaving the tree untouched) if it
    /// is already present
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let (root, inserted) = insert_node(self.root.take(), key, value);
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes a key, returning its value if it was present
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (root, removed) = remove_node(self.root.take(), key);
        self.root = root;
        removed.map(|(_, value)| {
            self.len -= 1;
            value
        })
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find_by(|k| key.cmp(k))
    }

    /// Descends with a custom comparator
    ///
    /// `probe` reports how the sought item orders relative to a stored key.
    pub fn find_by<F>(&self, probe: F) -> Option<&V>
    where
        F: Fn(&K) -> Ordering,
    {
        let mut link = &self.root;
        while let Some(node) = link {
            link = match probe(&node.key) {
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Visits, in order, every entry the comparator reports as `Equal`
    ///
    /// The comparator must be consistent with the key order: all matching
    /// keys form one contiguous run. Subtrees lying wholly on one side of
    /// the run are skipped. The visitor returns false to stop; the return
    /// value is false if the walk was stopped early.
    pub fn visit_matching<F, G>(&self, probe: F, mut visitor: G) -> bool
    where
        F: Fn(&K) -> Ordering,
        G: FnMut(&K, &V) -> bool,
    {
        visit_node(&self.root, &probe, &mut visitor)
    }

    /// Visits every entry in order along with its depth below the root
    pub fn visit_with_depth<F>(&self, mut visitor: F)
    where
        F: FnMut(&K, &V, usize),
    {
        fn walk<K, V, F: FnMut(&K, &V, usize)>(link: &Link<K, V>, depth: usize, visitor: &mut F) {
            if let Some(node) = link {
                walk(&node.left, depth + 1, visitor);
                visitor(&node.key, &node.value, depth);
                walk(&node.right, depth + 1, visitor);
            }
        }
        walk(&self.root, 0, &mut visitor);
    }

    /// In-order iterator over all entries
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(&self.root);
        iter
    }
}

fn level<K, V>(link: &Link<K, V>) -> u32 {
    link.as_ref().map_or(0, |n| n.level)
}

/// Rotates right when the left child sits on the same level
fn skew<K, V>(mut t: Box<Node<K, V>>) -> Box<Node<K, V>> {
    if level(&t.left) == t.level {
        if let Some(mut l) = t.left.take() {
            t.left = l.right.take();
            l.right = Some(t);
            return l;
        }
    }
    t
}

/// Rotates left and promotes when two right links share a level
fn split<K, V>(mut t: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let rr_level = t.right.as_ref().map_or(0, |r| level(&r.right));
    if rr_level == t.level {
        if let Some(mut r) = t.right.take() {
            t.right = r.left.take();
            r.left = Some(t);
            r.level += 1;
            return r;
        }
    }
    t
}

fn insert_node<K: Ord, V>(link: Link<K, V>, key: K, value: V) -> (Box<Node<K, V>>, bool) {
    let Some(mut t) = link else {
        return (Node::leaf(key, value), true);
    };

    let inserted = match key.cmp(&t.key) {
        Ordering::Less => {
            let (left, inserted) = insert_node(t.left.take(), key, value);
            t.left = Some(left);
            inserted
        }
        Ordering::Greater => {
            let (right, inserted) = insert_node(t.right.take(), key, value);
            t.right = Some(right);
            inserted
        }
        Ordering::Equal => return (t, false),
    };

    (split(skew(t)), inserted)
}

fn remove_node<K: Ord, V>(link: Link<K, V>, key: &K) -> (Link<K, V>, Option<(K, V)>) {
    let Some(mut t) = link else {
        return (None, None);
    };

    let removed = match key.cmp(&t.key) {
        Ordering::Less => {
            let (left, removed) = remove_node(t.left.take(), key);
            t.left = left;
            removed
        }
        Ordering::Greater => {
            let (right, removed) = remove_node(t.right.take(), key);
            t.right = right;
            removed
        }
        Ordering::Equal => match (t.left.take(), t.right.take()) {
            (None, None) => {
                let node = *t;
                return (None, Some((node.key, node.value)));
            }
            (left, Some(right)) => {
                // Replace with the in-order successor
                let (right, (key, value)) = remove_min(right);
                t.left = left;
                t.right = right;
                Some((mem::replace(&mut t.key, key), mem::replace(&mut t.value, value)))
            }
            (Some(left), None) => {
                let (left, (key, value)) = remove_max(left);
                t.left = left;
                Some((mem::replace(&mut t.key, key), mem::replace(&mut t.value, value)))
            }
        },
    };

    (Some(rebalance(t)), removed)
}

fn remove_min<K, V>(mut t: Box<Node<K, V>>) -> (Link<K, V>, (K, V)) {
    match t.left.take() {
        None => {
            let node = *t;
            (node.right, (node.key, node.value))
        }
        Some(left) => {
            let (left, min) = remove_min(left);
            t.left = left;
            (Some(rebalance(t)), min)
        }
    }
}

fn remove_max<K, V>(mut t: Box<Node<K, V>>) -> (Link<K, V>, (K, V)) {
    match t.right.take() {
        None => {
            let node = *t;
            (node.left, (node.key, node.value))
        }
        Some(right) => {
            let (right, max) = remove_max(right);
            t.right = right;
            (Some(rebalance(t)), max)
        }
    }
}

/// Restores the level rules after a removal below `t`
///
/// A removal can leave a node two levels too high, so the level is clamped
/// first, then the node, its right child and right grandchild are skewed
/// and the node and its right child split.
fn rebalance<K, V>(mut t: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let should_be = level(&t.left).min(level(&t.right)) + 1;
    if should_be < t.level {
        t.level = should_be;
        if let Some(right) = t.right.as_mut() {
            if should_be < right.level {
                right.level = should_be;
            }
        }
    }

    let mut t = skew(t);
    if let Some(right) = t.right.take() {
        let mut right = skew(right);
        if let Some(rr) = right.right.take() {
            right.right = Some(skew(rr));
        }
        t.right = Some(right);
    }

    let mut t = split(t);
    if let Some(right) = t.right.take() {
        t.right = Some(split(right));
    }
    t
}

fn visit_node<K, V, F, G>(link: &Link<K, V>, probe: &F, visitor: &mut G) -> bool
where
    F: Fn(&K) -> Ordering,
    G: FnMut(&K, &V) -> bool,
{
    let Some(node) = link else {
        return true;
    };

    match probe(&node.key) {
        Ordering::Less => visit_node(&node.left, probe, visitor),
        Ordering::Greater => visit_node(&node.right, probe, visitor),
        Ordering::Equal => {
            visit_node(&node.left, probe, visitor)
                && visitor(&node.key, &node.value)
                && visit_node(&node.right, probe, visitor)
        }
    }
}

/// In-order iterator over an [`AaTree`]
pub struct Iter<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left(&mut self, mut link: &'a Link<K, V>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        Some((&node.key, &node.value))
    }
}

#[cfg(test)]
impl<K: Ord, V> AaTree<K, V> {
    /// Panics if any level rule or the key order is violated
    fn check_invariants(&self) {
        fn check<K, V>(link: &Link<K, V>) -> usize {
            let Some(t) = link else { return 0 };
            if t.left.is_none() && t.right.is_none() {
                assert_eq!(t.level, 1, "leaf not at level 1");
            }
            assert_eq!(level(&t.left) + 1, t.level, "left child level");
            let right = level(&t.right);
            assert!(right == t.level || right + 1 == t.level, "right child level");
            if let Some(r) = &t.right {
                assert!(level(&r.right) < t.level, "double right link on one level");
            }
            if t.level > 1 {
                assert!(t.left.is_some() && t.right.is_some(), "internal node missing a child");
            }
            1 + check(&t.left) + check(&t.right)
        }

        assert_eq!(check(&self.root), self.len, "length mismatch");
        let keys: Vec<_> = self.iter().map(|(k, _)| k).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys out of order");
    }
}
