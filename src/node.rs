//! Radix trie nodes with path compression.
//!
//! Every edge is labeled with a whole byte sequence rather than a single
//! byte, so chains of single-child nodes collapse into one edge. Each node
//! keeps a dispatch cache over its children: the first byte of every child
//! edge (`indices`, mirroring child order) plus the min/max of those bytes
//! (`bounds`), so descent can reject a byte without touching any child.

use std::collections::VecDeque;

use smallvec::SmallVec;

/// A node in the radix trie.
///
/// The root is the only node with an empty `prefix`; every other node's
/// edge label is non-empty. A non-root node with no value and exactly one
/// child never persists past a mutating call: it is merged into a single
/// node whose prefix is the concatenation.
#[derive(Clone)]
pub(crate) struct Node<V> {
    /// Edge label: the bytes consumed when descending into this node.
    pub(crate) prefix: Vec<u8>,
    /// Payload, if a key ends exactly at this node.
    pub(crate) value: Option<V>,
    /// Owned children, sorted ascending by the first byte of their prefix.
    pub(crate) children: Vec<Box<Node<V>>>,
    /// First byte of each child's prefix, in `children` order.
    pub(crate) indices: SmallVec<[u8; 8]>,
    /// (min, max) over `indices`; `None` iff there are no children.
    pub(crate) bounds: Option<(u8, u8)>,
}

fn longest_common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

impl<V> Node<V> {
    /// An empty root node.
    pub(crate) fn new() -> Self {
        Self::branch(Vec::new())
    }

    fn branch(prefix: Vec<u8>) -> Self {
        Node {
            prefix,
            value: None,
            children: Vec::new(),
            indices: SmallVec::new(),
            bounds: None,
        }
    }

    fn leaf(prefix: Vec<u8>, value: V) -> Self {
        Node {
            prefix,
            value: Some(value),
            children: Vec::new(),
            indices: SmallVec::new(),
            bounds: None,
        }
    }

    /// Rebuild the dispatch cache from `children`, restoring sort order.
    fn reindex(&mut self) {
        self.children.sort_by_key(|c| c.prefix[0]);
        self.indices.clear();
        self.indices.extend(self.children.iter().map(|c| c.prefix[0]));
        self.bounds = match (self.indices.first(), self.indices.last()) {
            (Some(&min), Some(&max)) => Some((min, max)),
            _ => None,
        };
    }

    /// Locate the child whose prefix starts with `byte`, if any.
    ///
    /// Rejects via `bounds` before scanning `indices`, so misses outside
    /// the populated byte range cost no per-child work.
    fn find_child(&self, byte: u8) -> Option<usize> {
        let (min, max) = self.bounds?;
        if byte < min || byte > max {
            return None;
        }
        self.indices.iter().position(|&b| b == byte)
    }

    /// Fold this node's lone child into it: prefixes concatenate, the
    /// child's value, children, and dispatch cache move up.
    fn merge_lone_child(&mut self) {
        debug_assert_eq!(self.children.len(), 1);
        let child = *self.children.pop().unwrap();
        self.prefix.extend_from_slice(&child.prefix);
        self.value = child.value;
        self.children = child.children;
        self.indices = child.indices;
        self.bounds = child.bounds;
    }

    fn count_values(&self) -> usize {
        let mut n = usize::from(self.value.is_some());
        for child in &self.children {
            n += child.count_values();
        }
        n
    }

    /// Insert `key` below this node, returning any displaced value.
    pub(crate) fn insert(&mut self, mut key: &[u8], value: V) -> Option<V> {
        if key.is_empty() {
            return self.value.replace(value);
        }

        let mut node = self;
        loop {
            let idx = match node.find_child(key[0]) {
                Some(idx) => idx,
                None => {
                    // No child shares the leading byte: a fresh leaf takes
                    // the entire remaining key as its edge.
                    node.children.push(Box::new(Node::leaf(key.to_vec(), value)));
                    node.reindex();
                    return None;
                }
            };

            let longest = longest_common_prefix(key, &node.children[idx].prefix);
            if longest == node.children[idx].prefix.len() {
                // Traversal: the child's whole edge is consumed.
                // pfx: /posts
                // key: /posts|/upsert
                key = &key[longest..];
                let child = node.children[idx].as_mut();
                if key.is_empty() {
                    return child.value.replace(value);
                }
                node = child;
            } else if longest == key.len() {
                // Expansion: the key ends inside this edge. A branch node
                // carrying the value takes the common prefix; the old child
                // keeps the unmatched tail.
                // pfx: categories|/skus
                // key: categories|
                let mut child = std::mem::replace(
                    &mut node.children[idx],
                    Box::new(Node::branch(key.to_vec())),
                );
                child.prefix.drain(..longest);
                let branch = node.children[idx].as_mut();
                branch.value = Some(value);
                branch.children.push(child);
                branch.reindex();
                return None;
            } else {
                // Collision: key and edge diverge mid-way. The branch node
                // holds the common prefix with the truncated child and a
                // new leaf for the key's tail as its two children.
                // pfx: cat|egories
                // key: cat|woman
                let mut child = std::mem::replace(
                    &mut node.children[idx],
                    Box::new(Node::branch(key[..longest].to_vec())),
                );
                child.prefix.drain(..longest);
                let branch = node.children[idx].as_mut();
                branch.children.push(child);
                branch
                    .children
                    .push(Box::new(Node::leaf(key[longest..].to_vec(), value)));
                branch.reindex();
                return None;
            }
        }
    }

    /// Look up the value stored for exactly `key`.
    pub(crate) fn get(&self, mut key: &[u8]) -> Option<&V> {
        if key.is_empty() {
            return self.value.as_ref();
        }

        let mut node = self;
        loop {
            let idx = node.find_child(key[0])?;
            let child = node.children[idx].as_ref();
            if key == child.prefix.as_slice() {
                return child.value.as_ref();
            }
            if !key.starts_with(&child.prefix) {
                return None;
            }
            key = &key[child.prefix.len()..];
            node = child;
        }
    }

    /// Remove the value stored for exactly `key`, re-compressing the path.
    pub(crate) fn remove(&mut self, mut key: &[u8]) -> Option<V> {
        if key.is_empty() {
            return self.value.take();
        }

        let mut node = self;
        loop {
            let idx = node.find_child(key[0])?;
            if key == node.children[idx].prefix.as_slice() {
                let old = node.children[idx].value.take()?;
                match node.children[idx].children.len() {
                    0 => {
                        // Childless and valueless: splice the node out.
                        node.children.remove(idx);
                        node.reindex();
                        // The root (the only node with an empty prefix) is
                        // allowed to hold a lone child without a value.
                        if !node.prefix.is_empty()
                            && node.value.is_none()
                            && node.children.len() == 1
                        {
                            node.merge_lone_child();
                        }
                    }
                    1 => node.children[idx].merge_lone_child(),
                    _ => {}
                }
                return Some(old);
            }
            if !key.starts_with(&node.children[idx].prefix) {
                return None;
            }
            key = &key[node.children[idx].prefix.len()..];
            node = node.children[idx].as_mut();
        }
    }

    /// Discard every key starting with `prefix`, returning how many values
    /// were removed.
    pub(crate) fn remove_prefix(&mut self, mut prefix: &[u8]) -> usize {
        if prefix.is_empty() {
            if self.value.is_none() && self.children.is_empty() {
                return 0;
            }
            let removed = self.count_values();
            self.value = None;
            self.children.clear();
            self.reindex();
            return removed;
        }

        let mut node = self;
        loop {
            let idx = match node.find_child(prefix[0]) {
                Some(idx) => idx,
                None => return 0,
            };
            if node.children[idx].prefix.starts_with(prefix) {
                // The whole subtree below this edge is covered.
                let doomed = node.children.remove(idx);
                node.reindex();
                if !node.prefix.is_empty() && node.value.is_none() && node.children.len() == 1 {
                    node.merge_lone_child();
                }
                return doomed.count_values();
            }
            if !prefix.starts_with(&node.children[idx].prefix) {
                return 0;
            }
            prefix = &prefix[node.children[idx].prefix.len()..];
            node = node.children[idx].as_mut();
        }
    }

    /// Collect every (key, value) pair whose key starts with `prefix`, in
    /// left-to-right branch order.
    pub(crate) fn scan_prefix<'a>(&'a self, prefix: &[u8]) -> Vec<(Vec<u8>, &'a V)> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        let mut node = self;
        let mut rest = prefix;
        while !rest.is_empty() {
            let idx = match node.find_child(rest[0]) {
                Some(idx) => idx,
                None => return out,
            };
            let child = node.children[idx].as_ref();
            // A dispatch hit must point at a child that actually starts
            // with the dispatched byte; anything else means the cache no
            // longer mirrors `children` and the tree was already corrupt
            // before this call.
            assert_eq!(
                child.prefix.first(),
                Some(&rest[0]),
                "dispatch index diverged from children"
            );
            if child.prefix.len() >= rest.len() {
                if !child.prefix.starts_with(rest) {
                    // The search string dies inside this edge.
                    return out;
                }
                // The edge extends the search string: the entire subtree
                // below it is the answer set.
                node = child;
                break;
            }
            if !rest.starts_with(&child.prefix) {
                return out;
            }
            path.extend_from_slice(&child.prefix);
            rest = &rest[child.prefix.len()..];
            node = child;
        }
        node.collect_into(&mut path, &mut out);
        out
    }

    fn collect_into<'a>(&'a self, path: &mut Vec<u8>, out: &mut Vec<(Vec<u8>, &'a V)>) {
        path.extend_from_slice(&self.prefix);
        if let Some(ref v) = self.value {
            out.push((path.clone(), v));
        }
        for child in &self.children {
            child.collect_into(path, out);
        }
        path.truncate(path.len() - self.prefix.len());
    }

    /// Pre-order walk: a node's pair is emitted before its children, and
    /// children are visited in sorted order, so pairs come out in
    /// lexicographic key order.
    pub(crate) fn walk_dfs<'a>(&'a self, path: &mut Vec<u8>, f: &mut impl FnMut(&[u8], &'a V)) {
        path.extend_from_slice(&self.prefix);
        if let Some(ref v) = self.value {
            f(path, v);
        }
        for child in &self.children {
            child.walk_dfs(path, f);
        }
        path.truncate(path.len() - self.prefix.len());
    }

    /// Level-order walk over the same pair set as [`Node::walk_dfs`].
    pub(crate) fn walk_bfs<'a>(&'a self, f: &mut impl FnMut(&[u8], &'a V)) {
        let mut queue: VecDeque<(&Node<V>, Vec<u8>)> = VecDeque::new();
        queue.push_back((self, Vec::new()));
        while let Some((node, mut key)) = queue.pop_front() {
            key.extend_from_slice(&node.prefix);
            if let Some(ref v) = node.value {
                f(&key, v);
            }
            for child in &node.children {
                queue.push_back((child.as_ref(), key.clone()));
            }
        }
    }
}
