//! Document-session capability consumed by the identity store.
//!
//! A session is one logical unit of work over a document store: stores and
//! deletes are staged in the session and flushed as a single batch by
//! `save_changes`. Reads see staged changes first, then committed state.
//! Sessions are not safe for concurrent sharing; open one per request scope.

pub mod errors;
pub mod memory;

pub use errors::SessionError;
pub use memory::{MemoryBackend, MemorySession};

use serde::{Deserialize, Serialize};

use crate::{ID, Result};

/// A value persistable as a standalone document.
///
/// Each document type lives under a fixed collection name. The key is
/// optional until the session assigns one at store time; derived documents
/// (secondary indexes) carry their key from construction.
pub trait Document: Serialize + for<'de> Deserialize<'de> + Clone {
    /// Collection (logical namespace) this document type is stored under.
    const COLLECTION: &'static str;

    /// The document's key, if one has been assigned.
    fn key(&self) -> Option<ID>;

    /// Records the key assigned by the session at store time.
    fn set_key(&mut self, key: ID);
}

/// The document-store capability the identity store consumes.
///
/// Implementations must provide staged-write semantics: `store` and `delete`
/// have no effect on other sessions until `save_changes` flushes the batch.
/// Within the same session, reads observe staged changes.
pub trait DocumentSession {
    /// Stages a document for persistence and returns its effective key.
    ///
    /// If the document has no key yet, a UUIDv4 key is generated and written
    /// back via [`Document::set_key`]. An existing key is never reassigned.
    fn store<T: Document>(&mut self, doc: &mut T) -> Result<ID>;

    /// Loads a document by key, staged changes first.
    ///
    /// # Returns
    /// * `Ok(Some(T))` - The document, if present
    /// * `Ok(None)` - No document under this key (never an error)
    fn load<T: Document>(&self, key: &ID) -> Result<Option<T>>;

    /// Scans all documents of a collection and returns those matching the
    /// predicate, as (key, document) pairs. Staged changes are merged into
    /// the committed state before filtering.
    fn query<T: Document>(&self, predicate: impl Fn(&T) -> bool) -> Result<Vec<(ID, T)>>;

    /// Stages a deletion by key. Deleting an absent key is a no-op at flush.
    fn delete<T: Document>(&mut self, key: &ID) -> Result<()>;

    /// Flushes all staged stores and deletes as one unit.
    fn save_changes(&mut self) -> Result<()>;

    /// Loads a document together with a document it references, as one
    /// logical round trip.
    ///
    /// The default implementation issues two loads; backends with a native
    /// include hint may override it to prefetch the referenced document.
    fn load_including<T, R>(
        &self,
        key: &ID,
        reference: impl Fn(&T) -> ID,
    ) -> Result<Option<(T, Option<R>)>>
    where
        T: Document,
        R: Document,
    {
        match self.load::<T>(key)? {
            Some(doc) => {
                let referenced = self.load::<R>(&reference(&doc))?;
                Ok(Some((doc, referenced)))
            }
            None => Ok(None),
        }
    }
}
