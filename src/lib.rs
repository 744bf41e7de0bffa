//! # radix-rs
//!
//! A compressed prefix tree (radix trie) mapping byte-string keys to
//! arbitrary values.
//!
//! Edges are labeled with whole byte sequences, so chains of single-child
//! nodes collapse into one edge and stay collapsed: deletion re-compresses
//! the affected path on the spot. Descent dispatches on the first byte of
//! the remaining key against a per-node cache of child edge bytes, making
//! each step near-constant-time.
//!
//! ## Features
//!
//! - **Exact lookup**: `get` / `contains_key` in O(key length)
//! - **Prefix scans**: all stored keys below a prefix, in order
//! - **Bulk deletion**: `remove_prefix` discards a whole covered subtree
//! - **Traversal**: eager depth-first and breadth-first walks, plus a lazy
//!   sorted iterator
//!
//! ## Example
//!
//! ```rust
//! use radix_rs::RadixTree;
//!
//! let mut tree: RadixTree<u64> = RadixTree::new();
//! tree.insert("apple", 10);
//! tree.insert("app", 70);
//! tree.insert("amsterdam", 80);
//!
//! assert_eq!(tree.get("app"), Some(&70));
//! assert_eq!(tree.get("appl"), None);
//!
//! let hits = tree.scan_prefix("app");
//! assert_eq!(hits.len(), 2); // "app" before "apple"
//!
//! assert!(tree.remove_prefix("app"));
//! assert_eq!(tree.len(), 1);
//! ```
//!
//! The tree is strictly single-threaded: `&self`/`&mut self` borrows
//! express the exclusive-access requirement, and callers wanting shared
//! access wrap the whole tree in a lock of their choosing.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod node;

use node::Node;

/// A radix trie mapping byte-string keys to values of type `V`.
///
/// Keys may be empty, and any `AsRef<[u8]>` works as a key, so `&str` and
/// `&[u8]` are both accepted. Values need no trait bounds: absence is an
/// explicit state, never a sentinel value, so storing a zero or default
/// `V` is fully supported.
#[derive(Clone)]
pub struct RadixTree<V> {
    root: Node<V>,
    len: usize,
}

impl<V> RadixTree<V> {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            root: Node::new(),
            len: 0,
        }
    }

    /// Insert a key-value pair.
    ///
    /// Returns the previous value if the key was already present; last
    /// write wins.
    pub fn insert(&mut self, key: impl AsRef<[u8]>, value: V) -> Option<V> {
        let old = self.root.insert(key.as_ref(), value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// Get a reference to the value stored for exactly `key`.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&V> {
        self.root.get(key.as_ref())
    }

    /// Check whether a value is stored for exactly `key`.
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.get(key).is_some()
    }

    /// Remove the value stored for exactly `key`, returning it.
    ///
    /// The surrounding path is re-compressed, so no valueless single-child
    /// node is left behind.
    pub fn remove(&mut self, key: impl AsRef<[u8]>) -> Option<V> {
        let old = self.root.remove(key.as_ref());
        if old.is_some() {
            self.len -= 1;
        }
        old
    }

    /// Remove every key starting with `prefix`, discarding the whole
    /// covered subtree.
    ///
    /// Returns whether anything was removed; calling it again with the
    /// same prefix immediately afterwards returns `false`. An empty
    /// prefix clears the entire tree.
    pub fn remove_prefix(&mut self, prefix: impl AsRef<[u8]>) -> bool {
        let removed = self.root.remove_prefix(prefix.as_ref());
        self.len -= removed;
        removed > 0
    }

    /// Collect every (key, value) pair whose key starts with `prefix`, in
    /// lexicographic-by-branch order. An empty prefix yields the whole
    /// tree.
    ///
    /// # Panics
    ///
    /// Panics if the per-node dispatch cache is found out of sync with the
    /// children it indexes; that means the tree's structural invariants
    /// were already broken before the call.
    pub fn scan_prefix(&self, prefix: impl AsRef<[u8]>) -> Vec<(Vec<u8>, &V)> {
        self.root.scan_prefix(prefix.as_ref())
    }

    /// Walk the tree depth-first, invoking `f` for every stored pair in
    /// lexicographic key order.
    pub fn walk_dfs(&self, mut f: impl FnMut(&[u8], &V)) {
        let mut path = Vec::new();
        self.root.walk_dfs(&mut path, &mut f);
    }

    /// Walk the tree breadth-first, invoking `f` for every stored pair in
    /// level order. Same pair set as [`RadixTree::walk_dfs`], different
    /// order.
    pub fn walk_bfs(&self, mut f: impl FnMut(&[u8], &V)) {
        self.root.walk_bfs(&mut f);
    }

    /// Number of stored key-value pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree stores no pairs at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lazy iterator over all stored pairs in lexicographic key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            stack: vec![(&self.root, Vec::new())],
        }
    }
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for RadixTree<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over a tree's pairs in lexicographic key order.
///
/// Each stack entry carries the key accumulated down to (but excluding)
/// its node's own edge label.
pub struct Iter<'a, V> {
    stack: Vec<(&'a Node<V>, Vec<u8>)>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, mut key)) = self.stack.pop() {
            key.extend_from_slice(&node.prefix);
            for child in node.children.iter().rev() {
                self.stack.push((child.as_ref(), key.clone()));
            }
            if let Some(ref v) = node.value {
                return Some((key, v));
            }
        }
        None
    }
}


#[cfg(test)]
mod proptests;
