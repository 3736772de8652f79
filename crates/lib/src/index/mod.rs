//! Secondary-index documents and deterministic key derivation.
//!
//! The backing store has no native secondary indexes, so email lookup and
//! email confirmation are denormalized into side-documents whose keys are
//! pure functions of normalized input: hex-encoded SHA-256 over the
//! trimmed, lower-cased fields. Equivalent inputs (case or surrounding
//! whitespace variants) always resolve to the same document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{ID, session::Document};

/// Normalizes an identity string for key derivation.
fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Hashes the given parts into a prefixed, hex-encoded key.
///
/// Parts are length-prefixed before hashing so that field boundaries
/// cannot collide ("ab"+"c" vs "a"+"bc").
fn digest_key(prefix: &str, parts: &[&str]) -> ID {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    ID::new(format!("{prefix}/{}", hex::encode(hasher.finalize())))
}

/// Derives the document key for the email lookup index.
pub fn email_index_key(email: &str) -> ID {
    digest_key("emails", &[&normalize(email)])
}

/// Derives the document key for an email-confirmation record.
///
/// Confirmation is keyed per (username, email) tuple: changing either field
/// makes an existing confirmation unreachable under the new key.
pub fn email_confirmation_key(user_name: &str, email: &str) -> ID {
    digest_key(
        "email-confirmations",
        &[&normalize(user_name), &normalize(email)],
    )
}

/// Lookup record mapping a normalized email to the owning user's key.
///
/// Created when an email is set. It is never removed automatically when the
/// email changes or the user is deleted; stale records keep resolving until
/// explicitly cleaned up.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmailIndexRecord {
    /// Derived document key
    pub id: ID,

    /// Normalized email this record indexes
    pub email: String,

    /// Key of the owning user document
    pub user_id: ID,
}

impl EmailIndexRecord {
    pub fn new(email: &str, user_id: ID) -> Self {
        Self {
            id: email_index_key(email),
            email: normalize(email),
            user_id,
        }
    }
}

impl Document for EmailIndexRecord {
    const COLLECTION: &'static str = "email-index";

    fn key(&self) -> Option<ID> {
        Some(self.id.clone())
    }

    fn set_key(&mut self, key: ID) {
        self.id = key;
    }
}

/// Email-confirmation record.
///
/// Existence of this document is the sole evidence of "confirmed" status;
/// no boolean field is consulted anywhere.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmailConfirmationRecord {
    /// Derived document key
    pub id: ID,

    /// Normalized username at confirmation time
    pub user_name: String,

    /// Normalized email at confirmation time
    pub email: String,

    /// When the confirmation was recorded (UTC)
    pub confirmed_at: DateTime<Utc>,
}

impl EmailConfirmationRecord {
    pub fn new(user_name: &str, email: &str) -> Self {
        Self {
            id: email_confirmation_key(user_name, email),
            user_name: normalize(user_name),
            email: normalize(email),
            confirmed_at: Utc::now(),
        }
    }
}

impl Document for EmailConfirmationRecord {
    const COLLECTION: &'static str = "email-confirmations";

    fn key(&self) -> Option<ID> {
        Some(self.id.clone())
    }

    fn set_key(&mut self, key: ID) {
        self.id = key;
    }
}
