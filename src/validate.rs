//! Structural checks for a [`BTree`].

use crate::b_tree::BTree;
use crate::config::{max_keys, min_keys};
use crate::error::{Error, Result};
use crate::node::Node;

fn corrupted(reason: String) -> Error {
    Error::Corrupted { reason }
}

impl<K: Ord, V> BTree<K, V> {
    /// Checks every B-tree invariant and that [`count`](BTree::count) matches
    /// the number of stored records
    ///
    /// Walks the whole tree, so this is meant for tests and debugging.
    pub fn validate(&self) -> Result<()> {
        let mut checker = Checker { min_degree: self.min_degree(), leaf_depth: None, records: 0 };
        checker.visit(self.root(), 0, None, None)?;

        if checker.records != self.count() {
            return Err(corrupted(format!(
                "count is {} but the tree holds {} records",
                self.count(),
                checker.records
            )));
        }
        Ok(())
    }
}

struct Checker {
    min_degree: usize,
    leaf_depth: Option<usize>,
    records: usize,
}

impl Checker {
    /// Checks the subtree at `node`, whose keys must all lie strictly
    /// between `lower` and `upper`
    fn visit<K: Ord, V>(&mut self, node: &Node<K, V>, depth: usize, lower: Option<&K>, upper: Option<&K>) -> Result<()> {
        let len = node.len();
        if node.values().len() != len {
            return Err(corrupted(format!(
                "node at depth {} has {} keys but {} values",
                depth,
                len,
                node.values().len()
            )));
        }
        if len > max_keys(self.min_degree) {
            return Err(corrupted(format!("node at depth {} overflows with {} keys", depth, len)));
        }
        if depth > 0 && len < min_keys(self.min_degree) {
            return Err(corrupted(format!("node at depth {} underflows with {} keys", depth, len)));
        }

        if node.keys().windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(corrupted(format!("keys at depth {} are not strictly ascending", depth)));
        }
        if let (Some(lower), Some(first)) = (lower, node.keys().first()) {
            if first <= lower {
                return Err(corrupted(format!("key at depth {} is not above its separator", depth)));
            }
        }
        if let (Some(upper), Some(last)) = (upper, node.keys().last()) {
            if last >= upper {
                return Err(corrupted(format!("key at depth {} is not below its separator", depth)));
            }
        }
        self.records += len;

        if node.is_leaf() {
            if !node.children().is_empty() {
                return Err(corrupted(format!("leaf at depth {} owns children", depth)));
            }
            match self.leaf_depth {
                None => self.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(corrupted(format!(
                        "leaf at depth {} but other leaves are at depth {}",
                        depth, expected
                    )));
                }
                Some(_) => {}
            }
            return Ok(());
        }

        if node.children().len() != len + 1 {
            return Err(corrupted(format!(
                "internal node at depth {} has {} keys but {} children",
                depth,
                len,
                node.children().len()
            )));
        }
        if depth == 0 && len == 0 {
            return Err(corrupted("internal root has no keys".to_string()));
        }

        let keys = node.keys();
        for (i, child) in node.children().iter().enumerate() {
            let child_lower = if i == 0 { lower } else { Some(&keys[i - 1]) };
            let child_upper = if i == len { upper } else { Some(&keys[i]) };
            self.visit(child, depth + 1, child_lower, child_upper)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(keys: &[i32]) -> Node<i32, i32> {
        Node::leaf(keys.to_vec(), keys.to_vec())
    }

    #[test]
    fn test_validate_empty_tree() {
        let btree: BTree<i32> = BTree::new();
        btree.validate().unwrap();
    }

    #[test]
    fn test_validate_after_inserts() {
        let btree: BTree<_, _> = (0..500).rev().map(|i| (i, i)).collect();
        btree.validate().unwrap();
    }

    #[test]
    fn test_checker_catches_unsorted_keys() {
        let mut checker = Checker { min_degree: 2, leaf_depth: None, records: 0 };
        let err = checker.visit(&leaf(&[3, 1]), 0, None, None).unwrap_err();
        assert!(err.to_string().contains("not strictly ascending"));
    }

    #[test]
    fn test_checker_catches_separator_violation() {
        let node = Node::internal(vec![5], vec![5], vec![leaf(&[1, 6]), leaf(&[7])]);
        let mut checker = Checker { min_degree: 2, leaf_depth: None, records: 0 };
        let err = checker.visit(&node, 0, None, None).unwrap_err();
        assert!(err.to_string().contains("not below its separator"));
    }

    #[test]
    fn test_checker_catches_underflow() {
        let node = Node::internal(vec![5], vec![5], vec![leaf(&[1]), leaf(&[])]);
        let mut checker = Checker { min_degree: 2, leaf_depth: None, records: 0 };
        let err = checker.visit(&node, 0, None, None).unwrap_err();
        assert!(err.to_string().contains("underflows"));
    }

    #[test]
    fn test_checker_catches_uneven_leaves() {
        let deep = Node::internal(vec![2], vec![2], vec![leaf(&[1]), leaf(&[3])]);
        let node = Node::internal(vec![5], vec![5], vec![deep, leaf(&[6])]);
        let mut checker = Checker { min_degree: 2, leaf_depth: None, records: 0 };
        let err = checker.visit(&node, 0, None, None).unwrap_err();
        assert!(err.to_string().contains("other leaves are at depth 2"));
    }

    #[test]
    fn test_checker_counts_records() {
        let node = Node::internal(vec![5], vec![5], vec![leaf(&[1, 2]), leaf(&[6])]);
        let mut checker = Checker { min_degree: 2, leaf_depth: None, records: 0 };
        checker.visit(&node, 0, None, None).unwrap();
        assert_eq!(checker.records, 4);
        assert_eq!(checker.leaf_depth, Some(1));
    }
}
