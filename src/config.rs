//! Degree constants.

/// Smallest legal minimum degree `t`.
///
/// With `t = 2` non-root nodes hold 1 to 3 keys (a 2-3-4 tree).
pub const MIN_DEGREE: usize = 2;

/// Minimum degree used by `BTree::new()`.
pub const DEFAULT_MIN_DEGREE: usize = 2;

/// Largest number of keys a node may hold for minimum degree `t`.
pub const fn max_keys(min_degree: usize) -> usize {
    2 * min_degree - 1
}

/// Smallest number of keys a non-root node may hold for minimum degree `t`.
pub const fn min_keys(min_degree: usize) -> usize {
    min_degree - 1
}
