//! An in-memory ordered dictionary backed by a B-tree.
//!
//! Keys are unique and kept in ascending order. The tree is sized by its
//! minimum degree `t`: every node except the root holds `t-1` to `2t-1`
//! records, and every leaf sits at the same depth.
//!
//! # Example
//! ```
//! use btree_dict::BTree;
//!
//! let mut btree = BTree::with_min_degree(3).unwrap();
//! btree.insert("one", "first");
//! btree.insert("two", "second");
//!
//! assert_eq!(btree.lookup("one"), Some(&"first"));
//! assert_eq!(btree.delete("two"), Some("second"));
//! assert_eq!(btree.count(), 1);
//!
//! btree.for_each(|record, index, _| {
//!     println!("{index}: {} => {}", record.key, record.value);
//! });
//! ```
//!
//! The structure is single-threaded. Callers sharing a tree across threads
//! must wrap the whole tree in a lock.

pub mod b_tree;
pub mod config;
pub mod error;
pub mod node;
mod validate;

pub use b_tree::{BTree, Record};
pub use config::{DEFAULT_MIN_DEGREE, MIN_DEGREE};
pub use error::{Error, Result, SplitError};
pub use node::Node;
