//! Index node types.
//!
//! Nodes live in an arena owned by the [`Index`](super::Index) and refer to
//! their children through [`NodeId`] handles:
//! - Internal nodes: store entries and `entries.len() + 1` child handles
//! - Leaf nodes: store entries only

use std::borrow::Borrow;

/// Handle of a node inside an index's arena.
pub type NodeId = usize;

/// Node type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Internal,
    Leaf,
}

/// A key-value pair stored in a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry<K, V> {
    pub key: K,
    pub value: V,
}

/// A single B-tree node.
///
/// `Child[i]` contains keys < `Key[i]`
/// `Child[i+1]` contains keys > `Key[i]`
#[derive(Debug)]
pub struct Node<K, V> {
    pub node_type: NodeType,
    /// Entries in strictly increasing key order.
    pub entries: Vec<IndexEntry<K, V>>,
    /// Child handles. Empty for leaves, `entries.len() + 1` otherwise.
    pub children: Vec<NodeId>,
}

impl<K, V> Node<K, V> {
    /// Create a new empty leaf node.
    #[must_use]
    pub const fn leaf() -> Self {
        Self {
            node_type: NodeType::Leaf,
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an internal node with no entries and a single child.
    ///
    /// Only valid as a transient state while the old root is being split.
    #[must_use]
    pub fn above(child: NodeId) -> Self {
        Self {
            node_type: NodeType::Internal,
            entries: Vec::new(),
            children: vec![child],
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node_type == NodeType::Leaf
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len() is not const-stable
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the position of a key.
    ///
    /// `Ok(i)` if `entries[i]` holds the key, `Err(i)` with the child index
    /// (or leaf insert position) otherwise.
    pub fn search<Q>(&self, key: &Q) -> Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.binary_search_by(|e| e.key.borrow().cmp(key))
    }

    /// Split a full node around its median.
    ///
    /// With `2t-1` entries, this node keeps the lower `t-1` entries (and `t`
    /// children when internal); the returned sibling takes the upper `t-1`
    /// entries (and `t` children). The median entry is returned for promotion.
    pub fn split(&mut self, min_degree: usize) -> (IndexEntry<K, V>, Self) {
        let upper_entries = self.entries.split_off(min_degree);
        let median = self.entries.remove(min_degree - 1);
        let upper_children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children.split_off(min_degree)
        };

        let sibling = Self {
            node_type: self.node_type,
            entries: upper_entries,
            children: upper_children,
        };

        (median, sibling)
    }

    /// Absorb a separator and the right sibling's contents.
    ///
    /// Inverse of [`Node::split`].
    pub fn absorb(&mut self, separator: IndexEntry<K, V>, right: Self) {
        self.entries.push(separator);
        self.entries.extend(right.entries);
        self.children.extend(right.children);
    }
}
