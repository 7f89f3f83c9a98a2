use thiserror::Error;

use crate::r#type::KDNum;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KDTreeError {
    /// An argument was outside of its allowed range, e.g. a negative axis index.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Two coordinates that must share a dimensionality did not.
    #[error("Mismatched number of dimensions: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality that was required.
        expected: usize,
        /// The dimensionality that was supplied.
        actual: usize,
    },

    /// A name-based query referenced a label that is not stored in the tree.
    #[error("No entity labeled {0:?}")]
    UnknownLabel(String),
}

/// Result type for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, KDTreeError>;

/// Fails with [`KDTreeError::DimensionMismatch`] unless `actual == expected`.
#[inline]
pub(crate) fn check_dimensions(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(KDTreeError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Fails with [`KDTreeError::InvalidArgument`] if any value of `coordinate` is NaN.
#[inline]
pub(crate) fn check_not_nan<N: KDNum>(coordinate: &[N]) -> Result<()> {
    match coordinate.iter().position(|value| value.is_nan()) {
        Some(axis) => Err(KDTreeError::InvalidArgument(format!(
            "Coordinate {:?} is NaN on axis {}.",
            coordinate, axis
        ))),
        None => Ok(()),
    }
}
