//! In-memory B-tree keyed by an ordered key.
//!
//! Nodes are kept in an arena owned by the index. Splits allocate from a free
//! list that merges and root collapses feed, so node handles stay small
//! integers for the lifetime of the index.
//!
//! Insertion splits full nodes on the way down; deletion refills underfull
//! children on the way down (borrowing from a sibling or merging with one), so
//! no operation ever has to walk back up the tree.

use std::borrow::Borrow;
use std::mem;

use crate::index::node::{IndexEntry, Node, NodeId};

/// Minimum degree `t` of a B-tree.
///
/// Every node except the root holds between `t-1` and `2t-1` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinDegree(usize);

impl MinDegree {
    /// Degree used when none is configured.
    pub const DEFAULT: Self = Self(6);

    /// Validate a minimum degree.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::InvalidDegree` if `t < 2`.
    pub const fn new(t: usize) -> Result<Self, IndexError> {
        if t < 2 {
            Err(IndexError::InvalidDegree(t))
        } else {
            Ok(Self(t))
        }
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Maximum number of entries in any node (`2t-1`).
    #[must_use]
    pub const fn max_entries(self) -> usize {
        2 * self.0 - 1
    }

    /// Minimum number of entries in a non-root node (`t-1`).
    #[must_use]
    pub const fn min_entries(self) -> usize {
        self.0 - 1
    }
}

impl Default for MinDegree {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// An ordered index backed by a B-tree.
#[derive(Debug)]
pub struct Index<K, V> {
    nodes: Vec<Node<K, V>>,
    /// Arena slots released by merges, reused by splits.
    free: Vec<NodeId>,
    root: NodeId,
    degree: MinDegree,
    len: usize,
}

impl<K: Ord, V> Index<K, V> {
    /// Create an empty index whose root is an empty leaf.
    #[must_use]
    pub fn new(degree: MinDegree) -> Self {
        Self {
            nodes: vec![Node::leaf()],
            free: Vec::new(),
            root: 0,
            degree,
            len: 0,
        }
    }

    #[must_use]
    pub const fn min_degree(&self) -> MinDegree {
        self.degree
    }

    /// Number of entries in the index.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of live nodes in the arena.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len() is not const-stable
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Number of levels, counting the root. An empty index has height 1.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut id = self.root;
        while let Some(&first) = self.nodes[id].children.first() {
            height += 1;
            id = first;
        }
        height
    }

    /// Look up a value by key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key)
            .map(|(id, pos)| &self.nodes[id].entries[pos].value)
    }

    /// Look up a value by key for mutation.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (id, pos) = self.locate(key)?;
        Some(&mut self.nodes[id].entries[pos].value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).is_some()
    }

    /// Insert a new key-value pair.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::DuplicateKey` if the key is already present; the
    /// index is left untouched.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), IndexError> {
        if self.locate(&key).is_some() {
            return Err(IndexError::DuplicateKey);
        }

        if self.nodes[self.root].len() == self.degree.max_entries() {
            // Grow a level: the old root becomes the only child of a new root
            // and is split immediately.
            let old_root = self.root;
            let new_root = self.allocate(Node::above(old_root));
            self.root = new_root;
            self.split_child(new_root, 0);
        }

        let root = self.root;
        self.insert_non_full(root, IndexEntry { key, value });
        self.len += 1;
        Ok(())
    }

    /// Remove a key, returning its value.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::NotFound` if the key is absent; the index is not
    /// restructured in that case.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V, IndexError>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.locate(key).is_none() {
            return Err(IndexError::NotFound);
        }

        let root = self.root;
        let removed = self.delete_from(root, key).ok_or(IndexError::NotFound)?;
        self.len -= 1;
        Ok(removed.value)
    }

    /// In-order iterator over all entries.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// In-order iterator over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Find the node and position holding a key.
    fn locate<Q>(&self, key: &Q) -> Option<(NodeId, usize)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut id = self.root;
        loop {
            let node = &self.nodes[id];
            match node.search(key) {
                Ok(pos) => return Some((id, pos)),
                Err(_) if node.is_leaf() => return None,
                Err(child_idx) => id = node.children[child_idx],
            }
        }
    }

    fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id] = node;
            id
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    /// Return a node's slot to the free list, handing back its contents.
    fn release(&mut self, id: NodeId) -> Node<K, V> {
        self.free.push(id);
        mem::replace(&mut self.nodes[id], Node::leaf())
    }

    /// Descend from a node known to have room, splitting full children first.
    fn insert_non_full(&mut self, mut id: NodeId, entry: IndexEntry<K, V>) {
        let max = self.degree.max_entries();
        loop {
            let pos = self.nodes[id].search(&entry.key).unwrap_or_else(|i| i);

            if self.nodes[id].is_leaf() {
                self.nodes[id].entries.insert(pos, entry);
                return;
            }

            let mut child_idx = pos;
            let child = self.nodes[id].children[child_idx];
            if self.nodes[child].len() == max {
                self.split_child(id, child_idx);
                if entry.key > self.nodes[id].entries[child_idx].key {
                    child_idx += 1;
                }
            }
            id = self.nodes[id].children[child_idx];
        }
    }

    /// Split the full child at `child_idx`, promoting its median into `parent`.
    fn split_child(&mut self, parent: NodeId, child_idx: usize) {
        let child = self.nodes[parent].children[child_idx];
        let (median, sibling) = self.nodes[child].split(self.degree.get());
        let sibling_id = self.allocate(sibling);

        let parent_node = &mut self.nodes[parent];
        parent_node.entries.insert(child_idx, median);
        parent_node.children.insert(child_idx + 1, sibling_id);
    }

    /// Delete a key from the subtree rooted at `id`.
    ///
    /// Pre-condition: `id` is the root or holds at least `t` entries, so one
    /// entry can leave it without breaking the minimum fill.
    fn delete_from<Q>(&mut self, id: NodeId, key: &Q) -> Option<IndexEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let t = self.degree.get();
        let search = self.nodes[id].search(key);

        if self.nodes[id].is_leaf() {
            return search.ok().map(|pos| self.nodes[id].entries.remove(pos));
        }

        match search {
            Ok(pos) => {
                let left = self.nodes[id].children[pos];
                let right = self.nodes[id].children[pos + 1];

                if self.nodes[left].len() >= t {
                    let predecessor = self.take_max(left)?;
                    Some(mem::replace(&mut self.nodes[id].entries[pos], predecessor))
                } else if self.nodes[right].len() >= t {
                    let successor = self.take_min(right)?;
                    Some(mem::replace(&mut self.nodes[id].entries[pos], successor))
                } else {
                    // Both neighbours are minimal: the separator moves down
                    // into the merged node and is deleted from there.
                    let merged = self.merge(id, pos);
                    self.delete_from(merged, key)
                }
            }
            Err(child_idx) => {
                let next = self.ensure_spare(id, child_idx);
                self.delete_from(next, key)
            }
        }
    }

    /// Remove the largest entry of the subtree rooted at `id`.
    ///
    /// Follows the rightmost child chain down to a leaf.
    fn take_max(&mut self, mut id: NodeId) -> Option<IndexEntry<K, V>> {
        loop {
            if self.nodes[id].is_leaf() {
                return self.nodes[id].entries.pop();
            }
            let last = self.nodes[id].children.len() - 1;
            id = self.ensure_spare(id, last);
        }
    }

    /// Remove the smallest entry of the subtree rooted at `id`.
    ///
    /// Follows the leftmost child chain down to a leaf.
    fn take_min(&mut self, mut id: NodeId) -> Option<IndexEntry<K, V>> {
        loop {
            if self.nodes[id].is_leaf() {
                if self.nodes[id].entries.is_empty() {
                    return None;
                }
                return Some(self.nodes[id].entries.remove(0));
            }
            id = self.ensure_spare(id, 0);
        }
    }

    /// Make sure the child at `child_idx` holds at least `t` entries before
    /// descending into it. Returns the node to descend into, which differs
    /// from the original child when it was merged into its left sibling.
    fn ensure_spare(&mut self, parent: NodeId, child_idx: usize) -> NodeId {
        let child = self.nodes[parent].children[child_idx];
        if self.nodes[child].len() < self.degree.get() {
            self.fill(parent, child_idx)
        } else {
            child
        }
    }

    /// Relieve an underfull child by borrowing from a sibling, or merging
    /// with one when neither sibling has an entry to spare.
    fn fill(&mut self, parent: NodeId, child_idx: usize) -> NodeId {
        let t = self.degree.get();
        let children = &self.nodes[parent].children;
        let last = children.len() - 1;
        let prev_has_spare = child_idx > 0 && self.nodes[children[child_idx - 1]].len() >= t;
        let next_has_spare = child_idx < last && self.nodes[children[child_idx + 1]].len() >= t;

        if prev_has_spare {
            self.borrow_from_prev(parent, child_idx);
            self.nodes[parent].children[child_idx]
        } else if next_has_spare {
            self.borrow_from_next(parent, child_idx);
            self.nodes[parent].children[child_idx]
        } else if child_idx < last {
            self.merge(parent, child_idx)
        } else {
            self.merge(parent, child_idx - 1)
        }
    }

    /// Rotate the left sibling's last entry through the parent into the child.
    fn borrow_from_prev(&mut self, parent: NodeId, child_idx: usize) {
        let child = self.nodes[parent].children[child_idx];
        let sibling = self.nodes[parent].children[child_idx - 1];

        let sibling_node = &mut self.nodes[sibling];
        let Some(lent) = sibling_node.entries.pop() else {
            return;
        };
        let moved_child = sibling_node.children.pop();

        let separator = mem::replace(&mut self.nodes[parent].entries[child_idx - 1], lent);

        let child_node = &mut self.nodes[child];
        child_node.entries.insert(0, separator);
        if let Some(moved) = moved_child {
            child_node.children.insert(0, moved);
        }
    }

    /// Rotate the right sibling's first entry through the parent into the child.
    fn borrow_from_next(&mut self, parent: NodeId, child_idx: usize) {
        let child = self.nodes[parent].children[child_idx];
        let sibling = self.nodes[parent].children[child_idx + 1];

        let sibling_node = &mut self.nodes[sibling];
        if sibling_node.entries.is_empty() {
            return;
        }
        let lent = sibling_node.entries.remove(0);
        let moved_child = if sibling_node.is_leaf() {
            None
        } else {
            Some(sibling_node.children.remove(0))
        };

        let separator = mem::replace(&mut self.nodes[parent].entries[child_idx], lent);

        let child_node = &mut self.nodes[child];
        child_node.entries.push(separator);
        if let Some(moved) = moved_child {
            child_node.children.push(moved);
        }
    }

    /// Merge `children[idx + 1]` and the separator `entries[idx]` into
    /// `children[idx]`. Returns the merged node.
    ///
    /// When this empties the root, the merged node becomes the new root and
    /// the tree shrinks by one level.
    fn merge(&mut self, parent: NodeId, idx: usize) -> NodeId {
        let left = self.nodes[parent].children[idx];
        let right = self.nodes[parent].children[idx + 1];

        let separator = self.nodes[parent].entries.remove(idx);
        self.nodes[parent].children.remove(idx + 1);

        let right_node = self.release(right);
        self.nodes[left].absorb(separator, right_node);

        if parent == self.root && self.nodes[parent].is_empty() {
            self.root = left;
            self.release(parent);
        }

        left
    }

    /// Verify every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in depth-first order.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut leaf_depth = None;
        let counted = self.check_node(self.root, None, None, 0, &mut leaf_depth)?;
        if counted != self.len {
            return Err(InvariantViolation::LengthMismatch {
                recorded: self.len,
                counted,
            });
        }
        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize, InvariantViolation> {
        let node = &self.nodes[id];
        let len = node.len();
        let is_root = id == self.root;

        if len > self.degree.max_entries() {
            return Err(InvariantViolation::Overfull { node: id, entries: len });
        }
        if !is_root && len < self.degree.min_entries() {
            return Err(InvariantViolation::Underfull { node: id, entries: len });
        }
        if is_root && !node.is_leaf() && len == 0 {
            return Err(InvariantViolation::EmptyInternalRoot);
        }
        if node.entries.windows(2).any(|w| w[0].key >= w[1].key) {
            return Err(InvariantViolation::Unsorted { node: id });
        }

        let below_lower = match (node.entries.first(), lower) {
            (Some(first), Some(bound)) => first.key <= *bound,
            _ => false,
        };
        let above_upper = match (node.entries.last(), upper) {
            (Some(last), Some(bound)) => last.key >= *bound,
            _ => false,
        };
        if below_lower || above_upper {
            return Err(InvariantViolation::OutOfRange { node: id });
        }

        if node.is_leaf() {
            if !node.children.is_empty() {
                return Err(InvariantViolation::ChildCount {
                    node: id,
                    entries: len,
                    children: node.children.len(),
                });
            }
            match *leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(InvariantViolation::UnevenLeafDepth {
                        expected,
                        found: depth,
                    });
                }
                Some(_) => {}
            }
            return Ok(len);
        }

        if node.children.len() != len + 1 {
            return Err(InvariantViolation::ChildCount {
                node: id,
                entries: len,
                children: node.children.len(),
            });
        }

        let mut count = len;
        for (i, &child) in node.children.iter().enumerate() {
            let child_lower = if i == 0 {
                lower
            } else {
                Some(&node.entries[i - 1].key)
            };
            let child_upper = node.entries.get(i).map_or(upper, |e| Some(&e.key));
            count += self.check_node(child, child_lower, child_upper, depth + 1, leaf_depth)?;
        }
        Ok(count)
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a Index<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over an index.
///
/// Keeps an explicit stack of `(node, next entry position)` frames along the
/// path from the root to the current entry.
pub struct Iter<'a, K, V> {
    index: &'a Index<K, V>,
    stack: Vec<(NodeId, usize)>,
    remaining: usize,
}

impl<'a, K: Ord, V> Iter<'a, K, V> {
    fn new(index: &'a Index<K, V>) -> Self {
        let mut iter = Self {
            index,
            stack: Vec::new(),
            remaining: index.len,
        };
        iter.descend_left(index.root);
        iter
    }

    fn descend_left(&mut self, mut id: NodeId) {
        loop {
            self.stack.push((id, 0));
            match self.index.nodes[id].children.first() {
                Some(&first) => id = first,
                None => return,
            }
        }
    }
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        loop {
            let &(id, pos) = self.stack.last()?;
            let node = &index.nodes[id];

            if pos >= node.len() {
                self.stack.pop();
                continue;
            }

            if let Some(top) = self.stack.last_mut() {
                top.1 += 1;
            }
            if let Some(&right) = node.children.get(pos + 1) {
                self.descend_left(right);
            }

            self.remaining = self.remaining.saturating_sub(1);
            let entry = &node.entries[pos];
            return Some((&entry.key, &entry.value));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Ord, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Errors returned by index operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The key is already present.
    DuplicateKey,
    /// The key is not present.
    NotFound,
    /// The minimum degree is below 2.
    InvalidDegree(usize),
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateKey => write!(f, "key already present in index"),
            Self::NotFound => write!(f, "key not found in index"),
            Self::InvalidDegree(t) => {
                write!(f, "invalid minimum degree {t} (must be at least 2)")
            }
        }
    }
}

impl std::error::Error for IndexError {}

/// A broken structural invariant, reported by [`Index::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node holds more than `2t-1` entries.
    Overfull { node: NodeId, entries: usize },
    /// A non-root node holds fewer than `t-1` entries.
    Underfull { node: NodeId, entries: usize },
    /// The root is internal but has no entries.
    EmptyInternalRoot,
    /// A node's entries are not strictly increasing.
    Unsorted { node: NodeId },
    /// A node holds a key outside the range its parent's separators allow.
    OutOfRange { node: NodeId },
    /// A node's child count does not match its entry count.
    ChildCount {
        node: NodeId,
        entries: usize,
        children: usize,
    },
    /// Leaves found at different depths.
    UnevenLeafDepth { expected: usize, found: usize },
    /// The recorded length differs from the number of stored entries.
    LengthMismatch { recorded: usize, counted: usize },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overfull { node, entries } => {
                write!(f, "node {node} is overfull with {entries} entries")
            }
            Self::Underfull { node, entries } => {
                write!(f, "node {node} is underfull with {entries} entries")
            }
            Self::EmptyInternalRoot => write!(f, "internal root has no entries"),
            Self::Unsorted { node } => write!(f, "node {node} has unsorted entries"),
            Self::OutOfRange { node } => {
                write!(f, "node {node} holds keys outside its separator range")
            }
            Self::ChildCount {
                node,
                entries,
                children,
            } => write!(
                f,
                "node {node} has {entries} entries but {children} children"
            ),
            Self::UnevenLeafDepth { expected, found } => {
                write!(f, "leaf at depth {found}, expected depth {expected}")
            }
            Self::LengthMismatch { recorded, counted } => {
                write!(f, "index records {recorded} entries but holds {counted}")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}
