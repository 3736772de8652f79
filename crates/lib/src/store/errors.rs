//! Error types for identity-store operations.

use thiserror::Error;

/// Errors raised by the identity store itself.
///
/// Failures from the underlying document session are never wrapped into
/// these variants; they propagate verbatim as session errors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required argument was blank or absent. Caller bug; never retried.
    #[error("Invalid argument for '{operation}': {reason}")]
    InvalidArgument {
        operation: &'static str,
        reason: String,
    },

    /// The operation was attempted in a state that forbids it.
    #[error("Invalid operation '{operation}': {reason}")]
    InvalidOperation {
        operation: &'static str,
        reason: String,
    },
}

impl StoreError {
    /// Check if this error indicates a blank or absent required argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, StoreError::InvalidArgument { .. })
    }

    /// Check if this error indicates a forbidden-state operation
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, StoreError::InvalidOperation { .. })
    }

    /// Get the operation that raised this error
    pub fn operation(&self) -> &'static str {
        match self {
            StoreError::InvalidArgument { operation, .. }
            | StoreError::InvalidOperation { operation, .. } => operation,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
