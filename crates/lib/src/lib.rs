//!
//! Identidoc: an identity persistence adapter for schemaless document stores.
//! This library maps user-identity operations (credentials, external logins,
//! claims, email confirmation, security stamps) onto a generic document-session
//! capability, without assuming a relational join engine.
//!
//! ## Core Concepts
//!
//! * **Documents (`session::Document`)**: serializable values persisted under a
//!   collection name and a stable key.
//! * **Sessions (`session::DocumentSession`)**: the consumed capability — a unit
//!   of work that stages stores/deletes and flushes them as one batch on
//!   `save_changes`. An in-memory implementation (`session::MemoryBackend`) is
//!   provided for tests and embedders.
//! * **User aggregate (`user::IdentityUser`)**: the identity-bearing document.
//!   A default `user::User` struct is provided; custom aggregates implement the
//!   trait.
//! * **Secondary indexes (`index`)**: denormalized side-documents for email
//!   lookup and email confirmation, keyed by pure functions of normalized input.
//! * **Store (`store::IdentityStore`)**: the single component exposing the
//!   identity operations, grouped into independent capability traits.
//!
//! Mutations to the aggregate's collections (logins, claims) are in-memory only;
//! they reach the backing store on the next commit-triggering call (`create`,
//! `update`, `delete`, `set_email`, `set_email_confirmed`). Callers relying on
//! batching must flush with `update`.

pub mod id;
pub mod index;
pub mod session;
pub mod store;
pub mod user;

pub use id::ID;
pub use session::{Document, DocumentSession};
pub use store::IdentityStore;
pub use user::{IdentityUser, User, UserClaim, UserLogin};

/// Result type used throughout the identidoc library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the identidoc library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured identity-store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured document-session errors from the session module
    #[error(transparent)]
    Session(session::SessionError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::Session(_) => "session",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a blank or absent required argument.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_invalid_argument(),
            _ => false,
        }
    }

    /// Check if this error indicates an operation attempted in a forbidding state.
    pub fn is_invalid_operation(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_invalid_operation(),
            _ => false,
        }
    }

    /// Check if this error was propagated from the underlying document session.
    pub fn is_session_error(&self) -> bool {
        matches!(self, Error::Session(_))
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Session(session_err) => session_err.is_serialization_error(),
            _ => false,
        }
    }
}
