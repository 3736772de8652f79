//! Error types for document-session operations.
//!
//! These errors propagate verbatim through the identity store: the store
//! never wraps or retries a session failure.

use thiserror::Error;

/// Errors raised by document-session implementations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// Serialization failed for a document
    #[error("Serialization failed in collection '{collection}': {reason}")]
    SerializationFailed { collection: String, reason: String },

    /// Deserialization failed for a document
    #[error("Deserialization failed in collection '{collection}': {reason}")]
    DeserializationFailed { collection: String, reason: String },

    /// Failure in the backing store (lock, I/O, transport)
    #[error("Session backend failure: {reason}")]
    Backend { reason: String },
}

impl SessionError {
    /// Check if this error is related to serialization
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            SessionError::SerializationFailed { .. } | SessionError::DeserializationFailed { .. }
        )
    }

    /// Check if this error came from the backing store itself
    pub fn is_backend_error(&self) -> bool {
        matches!(self, SessionError::Backend { .. })
    }

    /// Get the collection name associated with this error, if any
    pub fn collection(&self) -> Option<&str> {
        match self {
            SessionError::SerializationFailed { collection, .. }
            | SessionError::DeserializationFailed { collection, .. } => Some(collection),
            SessionError::Backend { .. } => None,
        }
    }
}

impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
