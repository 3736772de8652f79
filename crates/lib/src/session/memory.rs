//! In-memory document backend and session.
//!
//! `MemoryBackend` holds the committed state shared by all sessions:
//! JSON-serialized documents keyed per collection. `MemorySession` buffers
//! staged operations and applies them to the backend as one batch on
//! `save_changes`. Reads within a session overlay the staged buffer on the
//! committed state, so a session observes its own uncommitted writes while
//! fresh sessions do not.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use super::{Document, DocumentSession, errors::SessionError};
use crate::{ID, Result};

/// Committed documents: collection name -> key -> serialized document.
type Collections = HashMap<&'static str, BTreeMap<String, String>>;

/// Shared, committed document state.
///
/// Cheap to clone via `Arc`; open one [`MemorySession`] per unit of work.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: RwLock<Collections>,
}

/// A staged write, applied at `save_changes`.
#[derive(Debug, Clone)]
enum StagedOp {
    Store { key: String, document: String },
    Delete { key: String },
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Opens a new session over this backend.
    pub fn session(self: &Arc<Self>) -> MemorySession {
        MemorySession {
            backend: Arc::clone(self),
            staged: Vec::new(),
        }
    }

    fn read_document(&self, collection: &'static str, key: &str) -> Result<Option<String>> {
        let collections = self.lock_read()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    fn read_collection(&self, collection: &'static str) -> Result<BTreeMap<String, String>> {
        let collections = self.lock_read()?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    fn lock_read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>> {
        self.collections.read().map_err(|_| {
            SessionError::Backend {
                reason: "collection lock poisoned".to_string(),
            }
            .into()
        })
    }
}

/// One unit of work over a [`MemoryBackend`].
#[derive(Debug)]
pub struct MemorySession {
    backend: Arc<MemoryBackend>,
    /// Staged operations in submission order, keyed by (collection, op).
    staged: Vec<(&'static str, StagedOp)>,
}

impl MemorySession {
    /// Returns the latest staged operation for a (collection, key), if any.
    fn staged_for(&self, collection: &'static str, key: &str) -> Option<&StagedOp> {
        self.staged
            .iter()
            .rev()
            .find(|(c, op)| {
                *c == collection
                    && match op {
                        StagedOp::Store { key: k, .. } | StagedOp::Delete { key: k } => k == key,
                    }
            })
            .map(|(_, op)| op)
    }

    fn serialize<T: Document>(doc: &T) -> Result<String> {
        serde_json::to_string(doc).map_err(|e| {
            SessionError::SerializationFailed {
                collection: T::COLLECTION.to_string(),
                reason: format!("Failed to serialize document: {e}"),
            }
            .into()
        })
    }

    fn deserialize<T: Document>(key: &str, raw: &str) -> Result<T> {
        serde_json::from_str(raw).map_err(|e| {
            SessionError::DeserializationFailed {
                collection: T::COLLECTION.to_string(),
                reason: format!("Failed to deserialize document for key '{key}': {e}"),
            }
            .into()
        })
    }
}

impl DocumentSession for MemorySession {
    fn store<T: Document>(&mut self, doc: &mut T) -> Result<ID> {
        let key = match doc.key() {
            Some(key) => key,
            None => {
                let key = ID::new(Uuid::new_v4().to_string());
                doc.set_key(key.clone());
                key
            }
        };

        let serialized = Self::serialize(doc)?;
        self.staged.push((
            T::COLLECTION,
            StagedOp::Store {
                key: key.as_str().to_string(),
                document: serialized,
            },
        ));
        Ok(key)
    }

    fn load<T: Document>(&self, key: &ID) -> Result<Option<T>> {
        // Staged changes shadow committed state within this session.
        if let Some(op) = self.staged_for(T::COLLECTION, key.as_str()) {
            return match op {
                StagedOp::Store { document, .. } => {
                    Ok(Some(Self::deserialize(key.as_str(), document)?))
                }
                StagedOp::Delete { .. } => Ok(None),
            };
        }

        match self.backend.read_document(T::COLLECTION, key.as_str())? {
            Some(raw) => Ok(Some(Self::deserialize(key.as_str(), &raw)?)),
            None => Ok(None),
        }
    }

    fn query<T: Document>(&self, predicate: impl Fn(&T) -> bool) -> Result<Vec<(ID, T)>> {
        // Merge staged operations over the committed collection, in order.
        let mut merged = self.backend.read_collection(T::COLLECTION)?;
        for (collection, op) in &self.staged {
            if *collection != T::COLLECTION {
                continue;
            }
            match op {
                StagedOp::Store { key, document } => {
                    merged.insert(key.clone(), document.clone());
                }
                StagedOp::Delete { key } => {
                    merged.remove(key);
                }
            }
        }

        let mut result = Vec::new();
        for (key, raw) in &merged {
            let doc: T = Self::deserialize(key, raw)?;
            if predicate(&doc) {
                result.push((ID::new(key.clone()), doc));
            }
        }
        Ok(result)
    }

    fn delete<T: Document>(&mut self, key: &ID) -> Result<()> {
        self.staged.push((
            T::COLLECTION,
            StagedOp::Delete {
                key: key.as_str().to_string(),
            },
        ));
        Ok(())
    }

    fn save_changes(&mut self) -> Result<()> {
        if self.staged.is_empty() {
            return Ok(());
        }

        let mut collections = self.backend.collections.write().map_err(|_| {
            crate::Error::from(SessionError::Backend {
                reason: "collection lock poisoned".to_string(),
            })
        })?;

        let count = self.staged.len();
        for (collection, op) in self.staged.drain(..) {
            let docs = collections.entry(collection).or_default();
            match op {
                StagedOp::Store { key, document } => {
                    docs.insert(key, document);
                }
                StagedOp::Delete { key } => {
                    docs.remove(&key);
                }
            }
        }
        tracing::debug!(operations = count, "flushed staged session operations");
        Ok(())
    }
}
