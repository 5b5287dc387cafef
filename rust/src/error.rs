//! Error handling and result types for BPlusTreeMap operations.
//!
//! Node-level overflow is not an error here: nodes report it through
//! [`Rejected`](crate::types::Rejected) and the tree turns it into a split.

use thiserror::Error;

/// Error type for B+ tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BPlusTreeError {
    /// Key not found in the tree.
    #[error("Key not found in tree")]
    KeyNotFound,
    /// Key already present where overwriting is not allowed.
    #[error("Key already exists and overwrite is not allowed")]
    DuplicateKey,
    /// Invalid degree specified.
    #[error("Invalid degree: {0}")]
    InvalidDegree(String),
    /// Structural assertion failed. Indicates a bug, not a runtime condition.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
    /// Bounded array accessed past its logical length.
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// Bounded array is already holding `capacity` items.
    #[error("Capacity {capacity} exceeded")]
    CapacityExceeded { capacity: usize },
}

impl BPlusTreeError {
    /// Create an InvalidDegree error with context
    pub fn invalid_degree(degree: usize, min_required: usize) -> Self {
        Self::InvalidDegree(format!(
            "Degree {} is invalid (minimum required: {})",
            degree, min_required
        ))
    }

    /// Create an InvariantViolation with context
    pub fn invariant(context: &str, details: &str) -> Self {
        Self::InvariantViolation(format!("{}: {}", context, details))
    }

    /// Bounded-array misuse inside node code is a broken invariant.
    pub fn into_invariant(self, context: &str) -> Self {
        match self {
            Self::IndexOutOfRange { .. } | Self::CapacityExceeded { .. } => {
                Self::invariant(context, &self.to_string())
            }
            other => other,
        }
    }

    /// Check if this error is a degree error
    pub fn is_degree_error(&self) -> bool {
        matches!(self, Self::InvalidDegree(_))
    }

    /// Check if this error reports a broken invariant
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

/// Internal result type for tree operations
pub(crate) type TreeResult<T> = Result<T, BPlusTreeError>;

/// Public result type for tree operations that may fail
pub type BTreeResult<T> = Result<T, BPlusTreeError>;

/// Result type for key lookup operations
pub type KeyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree modification operations
pub type ModifyResult<T> = Result<T, BPlusTreeError>;

/// Result type for tree construction
pub type InitResult<T> = Result<T, BPlusTreeError>;

/// Result extension trait for improved error handling
pub trait BTreeResultExt<T> {
    /// Convert to a BTreeResult with additional context
    fn with_context(self, context: &str) -> BTreeResult<T>;

    /// Convert to a BTreeResult with operation context
    fn with_operation(self, operation: &str) -> BTreeResult<T>;
}

impl<T> BTreeResultExt<T> for Result<T, BPlusTreeError> {
    fn with_context(self, context: &str) -> BTreeResult<T> {
        self.map_err(|e| match e {
            BPlusTreeError::InvalidDegree(msg) => {
                BPlusTreeError::InvalidDegree(format!("{}: {}", context, msg))
            }
            BPlusTreeError::InvariantViolation(msg) => BPlusTreeError::invariant(context, &msg),
            other => other,
        })
    }

    fn with_operation(self, operation: &str) -> BTreeResult<T> {
        self.with_context(&format!("Operation '{}'", operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(BPlusTreeError::KeyNotFound.to_string(), "Key not found in tree");
        assert_eq!(
            BPlusTreeError::invalid_degree(2, 4).to_string(),
            "Invalid degree: Degree 2 is invalid (minimum required: 4)"
        );
        assert_eq!(
            BPlusTreeError::IndexOutOfRange { index: 5, len: 3 }.to_string(),
            "Index 5 out of range for length 3"
        );
    }

    #[test]
    fn test_array_errors_become_invariant_violations() {
        let err = BPlusTreeError::CapacityExceeded { capacity: 4 }.into_invariant("leaf insert");
        assert!(err.is_invariant_violation());
        assert_eq!(
            err.to_string(),
            "Invariant violation: leaf insert: Capacity 4 exceeded"
        );

        // Non-array errors pass through untouched
        let err = BPlusTreeError::KeyNotFound.into_invariant("leaf insert");
        assert_eq!(err, BPlusTreeError::KeyNotFound);
    }

    #[test]
    fn test_with_operation_prefixes_context() {
        let result: BTreeResult<()> = Err(BPlusTreeError::invariant("split", "empty node"));
        let err = result.with_operation("insert").unwrap_err();
        assert_eq!(
            err,
            BPlusTreeError::InvariantViolation("Operation 'insert': split: empty node".to_string())
        );

        let result: BTreeResult<()> = Err(BPlusTreeError::KeyNotFound);
        assert_eq!(result.with_context("ctx").unwrap_err(), BPlusTreeError::KeyNotFound);
    }
}
