use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::mem;

use log::debug;

use crate::config::{DEFAULT_MIN_DEGREE, MIN_DEGREE};
use crate::error::{Error, Result};
use crate::node::Node;

/// An ordered dictionary of unique keys backed by a B-tree.
///
/// Every node except the root holds between `t-1` and `2t-1` records, where
/// `t` is the minimum degree, and every leaf sits at the same depth. Inserts
/// split full nodes on the way down and deletes top up thin nodes on the way
/// down, so both finish in a single pass from the root.
///
/// `V` defaults to `bool` so the tree can serve as a presence-only set through
/// [`BTree::insert_key`].
pub struct BTree<K, V = bool> {
    root: Box<Node<K, V>>,
    min_degree: usize,
    count: usize,
}

/// A borrowed key/value pair handed out by [`BTree::for_each`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a, K, V> {
    pub key: &'a K,
    pub value: &'a V,
}

impl<K, V> BTree<K, V> {
    /// Makes an empty tree with minimum degree [`DEFAULT_MIN_DEGREE`].
    pub fn new() -> Self {
        BTree { root: Box::new(Node::empty_leaf()), min_degree: DEFAULT_MIN_DEGREE, count: 0 }
    }

    /// Makes an empty tree with minimum degree `t`.
    ///
    /// Fails with [`Error::InvalidMinDegree`] if `t < 2`.
    pub fn with_min_degree(min_degree: usize) -> Result<Self> {
        if min_degree < MIN_DEGREE {
            return Err(Error::InvalidMinDegree(min_degree));
        }
        Ok(BTree { root: Box::new(Node::empty_leaf()), min_degree, count: 0 })
    }

    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Number of records in the tree. Tracked on every insert and delete.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of edges between the root and the leaves. An empty tree has height 0.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    pub fn root(&self) -> &Node<K, V> {
        &self.root
    }

    /// Removes every record, leaving a single empty leaf root.
    pub fn clear(&mut self) {
        self.root = Box::new(Node::empty_leaf());
        self.count = 0;
    }

    /// Calls `f` with every record in ascending key order
    ///
    /// The callback also receives the record's rank and the tree itself.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(Record<'_, K, V>, usize, &Self),
    {
        let mut index = 0;
        self.root.walk(&mut |key, value| {
            f(Record { key, value }, index, self);
            index += 1;
        });
    }

    /// Splits the full child at `child_index` of `parent`, promoting its middle record
    ///
    /// Fails with [`Error::InvalidSplitTarget`] if `parent` is a leaf or
    /// already full, has no child at `child_index`, or that child does not
    /// hold exactly `2t-1` keys for this tree's minimum degree.
    pub fn split_child(&self, parent: &mut Node<K, V>, child_index: usize) -> Result<()> {
        parent.split_child(child_index, self.min_degree)?;
        Ok(())
    }
}

impl<K: Ord, V> BTree<K, V> {
    /// Looks up the value stored for `key`
    pub fn lookup<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.root.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.lookup(key).is_some()
    }

    /// Inserts a record into the b-tree
    ///
    /// If `key` is already present its value is replaced and the old value is
    /// returned; the count only grows for new keys.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.root.is_full(self.min_degree) {
            // Make a new root, make the old root its only child and split it
            let old_root = mem::replace(&mut self.root, Box::new(Node::empty_leaf()));
            let mut new_root = Node::internal(Vec::new(), Vec::new(), vec![*old_root]);
            new_root.split_full_child(0);
            self.root = Box::new(new_root);
            debug!("root split, height is now {}", self.root.height());
        }

        let replaced = self.root.insert_non_full(key, value, self.min_degree);
        if replaced.is_none() {
            self.count += 1;
        }
        replaced
    }

    /// Deletes the record for `key` from the b-tree, returning its value
    ///
    /// Returns `None` if the key is absent. Thin nodes met on the way down are
    /// still rebalanced in that case.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let removed = self.root.remove(key, self.min_degree);

        // Shrink tree if root is empty but has a child
        if let Some(child) = self.root.collapse() {
            self.root = child;
            debug!("root collapsed, height is now {}", self.root.height());
        }

        let (_, value) = removed?;
        self.count -= 1;
        Some(value)
    }
}

impl<K: Ord> BTree<K, bool> {
    /// Inserts `key` with the value `true`, for presence-only use.
    pub fn insert_key(&mut self, key: K) {
        self.insert(key, true);
    }
}

impl<K, V> Default for BTree<K, V> {
    fn default() -> Self {
        BTree::new()
    }
}

impl<K: Debug, V: Debug> Debug for BTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.root.walk(&mut |key, value| {
            map.entry(key, value);
        });
        map.finish()
    }
}

impl<K: Ord, V> Extend<(K, V)> for BTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut btree = BTree::new();
        btree.extend(iter);
        btree
    }
}
