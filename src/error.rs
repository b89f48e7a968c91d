//! Error types for the B-tree dictionary.

use thiserror::Error;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the dictionary can report.
///
/// Every variant signals caller misuse or a broken structure. Looking up or
/// deleting an absent key is not an error; those return `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A split was requested on a parent/child pair that cannot be split.
    #[error("invalid split target: {0}")]
    InvalidSplitTarget(#[from] SplitError),

    /// The minimum degree must be at least 2.
    #[error("minimum degree must be at least 2, got {0}")]
    InvalidMinDegree(usize),

    /// A structural invariant does not hold.
    #[error("b-tree is corrupted: {reason}")]
    Corrupted { reason: String },
}

/// Why a split target was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SplitError {
    /// The parent has no children to split.
    #[error("parent is a leaf")]
    ParentIsLeaf,

    /// The parent does not have a child at this index.
    #[error("parent has no child at index {index}")]
    ChildNotFound { index: usize },

    /// Only children holding exactly `2t-1` keys can be split.
    #[error("child at index {index} holds {len} keys, a full node holds {full}")]
    ChildNotFull { index: usize, len: usize, full: usize },

    /// The parent has no room for the promoted key.
    #[error("parent is already full with {len} keys")]
    ParentFull { len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidMinDegree(1);
        assert_eq!(format!("{}", err), "minimum degree must be at least 2, got 1");

        let err: Error = SplitError::ChildNotFound { index: 5 }.into();
        assert_eq!(
            format!("{}", err),
            "invalid split target: parent has no child at index 5"
        );
    }

    #[test]
    fn test_split_error_conversion() {
        let err: Error = SplitError::ParentIsLeaf.into();
        match err {
            Error::InvalidSplitTarget(SplitError::ParentIsLeaf) => {}
            _ => panic!("Expected InvalidSplitTarget(ParentIsLeaf)"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<usize> {
            Err(Error::Corrupted {
                reason: "leaf depth mismatch".to_string(),
            })
        }

        assert_eq!(
            might_fail().unwrap_err().to_string(),
            "b-tree is corrupted: leaf depth mismatch"
        );
    }
}
