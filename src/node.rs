use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

use log::trace;

use crate::config::max_keys;
use crate::error::SplitError;

// https://en.wikipedia.org/wiki/B-tree
// Nodes are sized by the minimum degree t (the CLRS definition):
// A root node when it is a leaf node: min 0 max 2t-1 keys, no children
// A root node when it is an internal node: min 1 max 2t-1 keys, min 2 max 2t children
// Any other node: min t-1 max 2t-1 keys, and if internal min t max 2t children
//
// A node never stores t. The tree passes it down to every operation that needs it.

/// A single B-tree node holding records in ascending key order.
///
/// `values[i]` belongs to `keys[i]`. An internal node owns `keys.len() + 1`
/// children, and every key in `children[i]` sorts strictly between
/// `keys[i - 1]` and `keys[i]`. A leaf owns no children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
    children: Vec<Box<Node<K, V>>>,
    leaf: bool,
}

impl<K, V> Node<K, V> {
    /// Builds a leaf node from parallel key and value lists.
    ///
    /// Panics if the lists differ in length.
    pub fn leaf(keys: Vec<K>, values: Vec<V>) -> Self {
        assert_eq!(keys.len(), values.len(), "Every key needs exactly one value");
        Node { keys, values, children: Vec::new(), leaf: true }
    }

    /// Builds an internal node from parallel key and value lists and its children.
    ///
    /// Panics if the lists differ in length or there is not exactly one more
    /// child than keys.
    pub fn internal(keys: Vec<K>, values: Vec<V>, children: Vec<Node<K, V>>) -> Self {
        assert_eq!(keys.len(), values.len(), "Every key needs exactly one value");
        assert_eq!(children.len(), keys.len() + 1, "Internal node needs one more child than keys");
        let children = children.into_iter().map(Box::new).collect();
        Node { keys, values, children, leaf: false }
    }

    pub(crate) fn empty_leaf() -> Self {
        Node { keys: Vec::new(), values: Vec::new(), children: Vec::new(), leaf: true }
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Child subtrees in key order. Empty for a leaf.
    pub fn children(&self) -> &[Box<Node<K, V>>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Number of records stored directly in this node.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True if the node holds the `2t-1` keys that make it eligible for a split.
    pub fn is_full(&self, min_degree: usize) -> bool {
        self.keys.len() == max_keys(min_degree)
    }

    /// Number of edges from this node down to a leaf.
    pub(crate) fn height(&self) -> usize {
        let mut node = self;
        let mut height = 0;
        while !node.leaf {
            node = &node.children[0];
            height += 1;
        }
        height
    }

    /// Splits the full child at `child_idx` after checking every precondition.
    ///
    /// The parent must be internal and non-full, and the child must hold
    /// exactly `2t-1` keys.
    pub(crate) fn split_child(&mut self, child_idx: usize, min_degree: usize) -> Result<(), SplitError> {
        if self.leaf {
            return Err(SplitError::ParentIsLeaf);
        }
        let child = self
            .children
            .get(child_idx)
            .ok_or(SplitError::ChildNotFound { index: child_idx })?;

        let full = max_keys(min_degree);
        if child.keys.len() != full {
            return Err(SplitError::ChildNotFull { index: child_idx, len: child.keys.len(), full });
        }
        if self.keys.len() >= full {
            return Err(SplitError::ParentFull { len: self.keys.len() });
        }

        self.split_full_child(child_idx);
        Ok(())
    }

    /// Splits a full child into 2 nodes and moves the middle record up into this node
    ///
    /// The caller guarantees the child is full and this node has room.
    pub(crate) fn split_full_child(&mut self, child_idx: usize) {
        let child = &mut self.children[child_idx];
        let mid = child.keys.len() / 2;

        // Right half starts at mid+1, leaving the middle record last in child
        let right_keys = child.keys.split_off(mid + 1);
        let right_values = child.values.split_off(mid + 1);
        let (middle_key, middle_value) = child.take_record(mid);

        let right_children = if child.leaf { Vec::new() } else { child.children.split_off(mid + 1) };

        let sibling = Node { keys: right_keys, values: right_values, children: right_children, leaf: child.leaf };

        self.keys.insert(child_idx, middle_key);
        self.values.insert(child_idx, middle_value);
        self.children.insert(child_idx + 1, Box::new(sibling));
        trace!("split child {} around index {}", child_idx, mid);
    }

    /// Walks every record in ascending key order
    pub(crate) fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a K, &'a V),
    {
        for i in 0..self.keys.len() {
            if !self.leaf {
                self.children[i].walk(visit);
            }
            visit(&self.keys[i], &self.values[i]);
        }
        if !self.leaf {
            self.children[self.keys.len()].walk(visit);
        }
    }

    /// Takes the root's only child once the root has run out of keys.
    pub(crate) fn collapse(&mut self) -> Option<Box<Node<K, V>>> {
        if self.leaf || !self.keys.is_empty() {
            return None;
        }
        self.children.pop()
    }

    fn take_record(&mut self, idx: usize) -> (K, V) {
        (self.keys.remove(idx), self.values.remove(idx))
    }

    /// Moves the last record of the left sibling up into the parent and the
    /// parent's separator down to the front of the child at `child_idx`
    fn rotate_right(&mut self, child_idx: usize) {
        let left = &mut self.children[child_idx - 1];
        let last = left.keys.len() - 1;
        let (key, value) = left.take_record(last);
        let grandchild = if left.leaf { None } else { left.children.pop() };

        let separator_key = mem::replace(&mut self.keys[child_idx - 1], key);
        let separator_value = mem::replace(&mut self.values[child_idx - 1], value);

        let right = &mut self.children[child_idx];
        right.keys.insert(0, separator_key);
        right.values.insert(0, separator_value);
        if let Some(grandchild) = grandchild {
            right.children.insert(0, grandchild);
        }
        trace!("borrowed from left sibling into child {}", child_idx);
    }

    /// Moves the first record of the right sibling up into the parent and the
    /// parent's separator down to the end of the child at `child_idx`
    fn rotate_left(&mut self, child_idx: usize) {
        let right = &mut self.children[child_idx + 1];
        let (key, value) = right.take_record(0);
        let grandchild = if right.leaf { None } else { Some(right.children.remove(0)) };

        let separator_key = mem::replace(&mut self.keys[child_idx], key);
        let separator_value = mem::replace(&mut self.values[child_idx], value);

        let left = &mut self.children[child_idx];
        left.keys.push(separator_key);
        left.values.push(separator_value);
        if let Some(grandchild) = grandchild {
            left.children.push(grandchild);
        }
        trace!("borrowed from right sibling into child {}", child_idx);
    }

    /// Merges the child at `child_idx`, the separator after it, and its right sibling
    fn merge_children(&mut self, child_idx: usize) {
        let (separator_key, separator_value) = self.take_record(child_idx);
        let mut right = self.children.remove(child_idx + 1);

        let left = &mut self.children[child_idx];
        left.keys.push(separator_key);
        left.values.push(separator_value);
        left.keys.append(&mut right.keys);
        left.values.append(&mut right.values);
        if !left.leaf {
            left.children.append(&mut right.children);
        }
        trace!("merged children {} and {}", child_idx, child_idx + 1);
    }

    /// Makes sure the child at `child_idx` holds at least t keys before descending
    ///
    /// Returns the index of the child to descend into, which moves one to the
    /// left when the last child is merged into its left sibling.
    fn fill_child(&mut self, child_idx: usize, min_degree: usize) -> usize {
        if self.children[child_idx].keys.len() >= min_degree {
            return child_idx;
        }
        let has_right = child_idx + 1 < self.children.len();

        if child_idx > 0 && self.children[child_idx - 1].keys.len() >= min_degree {
            self.rotate_right(child_idx);
            child_idx
        } else if has_right && self.children[child_idx + 1].keys.len() >= min_degree {
            self.rotate_left(child_idx);
            child_idx
        } else if has_right {
            self.merge_children(child_idx);
            child_idx
        } else {
            self.merge_children(child_idx - 1);
            child_idx - 1
        }
    }

    /// Removes the record at `idx` from this subtree
    ///
    /// This node holds at least t keys unless it is the root.
    fn remove_at(&mut self, idx: usize, min_degree: usize) -> (K, V) {
        if self.leaf {
            return self.take_record(idx);
        }

        if self.children[idx].keys.len() >= min_degree {
            // Replace with the predecessor
            let (key, value) = self.children[idx].pop_last(min_degree);
            let key = mem::replace(&mut self.keys[idx], key);
            let value = mem::replace(&mut self.values[idx], value);
            (key, value)
        } else if self.children[idx + 1].keys.len() >= min_degree {
            // Replace with the successor
            let (key, value) = self.children[idx + 1].pop_first(min_degree);
            let key = mem::replace(&mut self.keys[idx], key);
            let value = mem::replace(&mut self.values[idx], value);
            (key, value)
        } else {
            // Both neighbours are at the minimum, so pull the record down into
            // the merged node where it lands right after the left half
            self.merge_children(idx);
            self.children[idx].remove_at(min_degree - 1, min_degree)
        }
    }

    /// Removes the largest record of this subtree
    fn pop_last(&mut self, min_degree: usize) -> (K, V) {
        if self.leaf {
            let last = self.keys.len() - 1;
            return self.take_record(last);
        }
        let idx = self.fill_child(self.children.len() - 1, min_degree);
        self.children[idx].pop_last(min_degree)
    }

    /// Removes the smallest record of this subtree
    fn pop_first(&mut self, min_degree: usize) -> (K, V) {
        if self.leaf {
            return self.take_record(0);
        }
        let idx = self.fill_child(0, min_degree);
        self.children[idx].pop_first(min_degree)
    }
}

impl<K: Ord, V> Node<K, V> {
    /// Binary search over this node's keys
    ///
    /// Returns true and the key's index if present, otherwise false and the
    /// index of the smallest key greater than `key` (the child to descend into)
    pub(crate) fn search<Q>(&self, key: &Q) -> (bool, usize)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut left = 0;
        let mut right = self.keys.len();

        // Range is [left, right)
        while left < right {
            let mid = left + (right - left) / 2;
            match self.keys[mid].borrow().cmp(key) {
                Ordering::Equal => return (true, mid),
                Ordering::Less => left = mid + 1,
                Ordering::Greater => right = mid,
            }
        }
        (false, left)
    }

    /// Finds the value for `key` in this subtree
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self;
        loop {
            let (found, idx) = node.search(key);
            if found {
                return Some(&node.values[idx]);
            }
            if node.leaf {
                return None;
            }
            node = &node.children[idx];
        }
    }

    /// Inserts a record into a subtree whose root is not full
    ///
    /// Full children are split on the way down, so the record always lands in
    /// a leaf with room. Returns the old value if `key` was already present.
    pub(crate) fn insert_non_full(&mut self, key: K, value: V, min_degree: usize) -> Option<V> {
        let (found, mut idx) = self.search(&key);
        if found {
            return Some(mem::replace(&mut self.values[idx], value));
        }

        if self.leaf {
            self.keys.insert(idx, key);
            self.values.insert(idx, value);
            return None;
        }

        if self.children[idx].is_full(min_degree) {
            self.split_full_child(idx);
            // The promoted key may be the one being inserted
            match key.cmp(&self.keys[idx]) {
                Ordering::Equal => return Some(mem::replace(&mut self.values[idx], value)),
                Ordering::Greater => idx += 1,
                Ordering::Less => {}
            }
        }
        self.children[idx].insert_non_full(key, value, min_degree)
    }

    /// Deletes `key` from this subtree in a single top-down pass
    ///
    /// Every child is topped up to t keys before descending into it, even if
    /// `key` turns out to be absent.
    pub(crate) fn remove<Q>(&mut self, key: &Q, min_degree: usize) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (found, idx) = self.search(key);
        if found {
            return Some(self.remove_at(idx, min_degree));
        }
        if self.leaf {
            return None;
        }
        let idx = self.fill_child(idx, min_degree);
        self.children[idx].remove(key, min_degree)
    }
}
