//! The identity store: maps identity operations onto a document session.
//!
//! [`IdentityStore`] owns one session handle (one logical unit of work) and
//! exposes the identity operations grouped into independent capability
//! traits, all satisfied by the single backing implementation.
//!
//! ## Consistency contract
//!
//! Collection mutations (`add_login`, `remove_login`, `add_claim`,
//! `remove_claim`) and field setters touch only the in-memory aggregate.
//! They reach the backing store on the next commit-triggering call:
//! [`UserAccountStore::create`], [`UserAccountStore::update`],
//! [`UserAccountStore::delete`], [`UserEmailStore::set_email`] or
//! [`UserEmailStore::set_email_confirmed`], each of which flushes the whole
//! pending batch. Callers must `update` after mutating or changes are lost.
//!
//! ## Known index gaps (preserved deliberately)
//!
//! * `set_email` creates a new email-index record without removing the one
//!   for the previous address; the stale record keeps resolving.
//! * `delete` removes only the user document; its index and confirmation
//!   records stay behind.
//! * Confirmation is keyed per (username, email): changing either field
//!   resets effective confirmation under the new key and orphans the old
//!   record.

pub mod errors;

pub use errors::StoreError;

use crate::{
    ID, Result,
    index::{self, EmailConfirmationRecord, EmailIndexRecord},
    session::DocumentSession,
    user::{IdentityUser, UserClaim, UserLogin},
};

/// Account lifecycle operations.
pub trait UserAccountStore<U: IdentityUser> {
    /// Persists a new user and commits immediately.
    ///
    /// The session assigns the document key if the user has none; once
    /// assigned it is immutable. Username/email uniqueness is NOT enforced
    /// here.
    ///
    /// # Errors
    /// `InvalidArgument` if the username is blank.
    fn create(&mut self, user: &mut U) -> Result<()>;

    /// Loads a user by document key. Absent is `Ok(None)`, never an error.
    fn find_by_id(&self, id: &ID) -> Result<Option<U>>;

    /// Finds a user by exact (case-sensitive) username match.
    fn find_by_user_name(&self, user_name: &str) -> Result<Option<U>>;

    /// Re-stores the aggregate and commits all pending session changes.
    ///
    /// # Errors
    /// `InvalidOperation` if the user was never created (no key).
    fn update(&mut self, user: &U) -> Result<()>;

    /// Marks the user document for deletion and commits.
    ///
    /// Index and confirmation records referencing the user are left behind.
    ///
    /// # Errors
    /// `InvalidArgument` if the user has no key.
    fn delete(&mut self, user: &U) -> Result<()>;
}

/// External-login association operations.
pub trait UserLoginStore<U: IdentityUser> {
    /// Projects the user's logins, in insertion order.
    fn logins(&self, user: &U) -> Result<Vec<UserLogin>>;

    /// Queries across all persisted users for one whose login list contains
    /// a matching (provider, key). First match or `None`; non-deterministic
    /// if duplicates exist across users.
    fn find_by_login(&self, login: &UserLogin) -> Result<Option<U>>;

    /// Appends unconditionally (duplicates possible). In-memory only;
    /// persisted on the next commit.
    fn add_login(&self, user: &mut U, login: UserLogin) -> Result<()>;

    /// Removes the first association matching (provider, key); no-op if
    /// absent.
    fn remove_login(&self, user: &mut U, login: &UserLogin) -> Result<()>;
}

/// Claim association operations.
pub trait UserClaimStore<U: IdentityUser> {
    /// Projects the user's claims, in insertion order.
    fn claims(&self, user: &U) -> Result<Vec<UserClaim>>;

    /// Appends unconditionally (duplicates possible). In-memory only.
    fn add_claim(&self, user: &mut U, claim: UserClaim) -> Result<()>;

    /// Removes the first claim matching (type, value); no-op if absent.
    fn remove_claim(&self, user: &mut U, claim: &UserClaim) -> Result<()>;
}

/// Password-hash storage. Hashing and verification live in the caller.
pub trait UserPasswordStore<U: IdentityUser> {
    fn password_hash(&self, user: &U) -> Result<Option<String>>;

    /// Sets or clears the stored hash. In-memory only.
    ///
    /// # Errors
    /// `InvalidArgument` if `Some` but blank.
    fn set_password_hash(&self, user: &mut U, password_hash: Option<String>) -> Result<()>;

    /// Whether a hash is currently stored.
    fn has_password(&self, user: &U) -> Result<bool>;
}

/// Security-stamp storage.
pub trait UserSecurityStampStore<U: IdentityUser> {
    fn security_stamp(&self, user: &U) -> Result<Option<String>>;

    /// Sets or clears the stamp. In-memory only.
    ///
    /// # Errors
    /// `InvalidArgument` if `Some` but blank.
    fn set_security_stamp(&self, user: &mut U, security_stamp: Option<String>) -> Result<()>;
}

/// Two-factor flag storage.
pub trait UserTwoFactorStore<U: IdentityUser> {
    fn two_factor_enabled(&self, user: &U) -> Result<bool>;

    /// In-memory only; persisted on the next commit.
    fn set_two_factor_enabled(&self, user: &mut U, enabled: bool) -> Result<()>;
}

/// Email and email-confirmation management.
pub trait UserEmailStore<U: IdentityUser> {
    /// Resolves a user through the email index. The index record and the
    /// referenced user are fetched in one logical round trip.
    fn find_by_email(&self, email: &str) -> Result<Option<U>>;

    fn email(&self, user: &U) -> Result<Option<String>>;

    /// Sets the email, stores a new index record pointing at the user, and
    /// commits. A prior index record for an old address is NOT removed.
    ///
    /// # Errors
    /// * `InvalidArgument` if the email is blank.
    /// * `InvalidOperation` if the user was never created (the index record
    ///   needs a referent key).
    fn set_email(&mut self, user: &mut U, email: &str) -> Result<()>;

    /// Whether a confirmation record exists for the current
    /// (username, email) pair.
    ///
    /// # Errors
    /// `InvalidOperation` if the user has no email set.
    fn email_confirmed(&self, user: &U) -> Result<bool>;

    /// Confirming stores a confirmation record with a UTC timestamp and
    /// commits. Un-confirming deletes the record and commits when present,
    /// and is a no-op otherwise.
    ///
    /// # Errors
    /// `InvalidOperation` if the user has no email set.
    fn set_email_confirmed(&mut self, user: &U, confirmed: bool) -> Result<()>;
}

/// Identity store over a document session.
///
/// One logical unit of work: not safe for concurrent sharing. Construct one
/// per request scope around a fresh session.
pub struct IdentityStore<S> {
    session: S,
}

impl<S: DocumentSession> IdentityStore<S> {
    /// Creates a store over the given session.
    pub fn new(session: S) -> Self {
        Self { session }
    }

    /// Get a reference to the underlying session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Get a mutable reference to the underlying session.
    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Consumes the store, returning the session.
    pub fn into_session(self) -> S {
        self.session
    }
}

/// Rejects blank required string arguments.
fn require_text(operation: &'static str, name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidArgument {
            operation,
            reason: format!("{name} must not be blank"),
        }
        .into());
    }
    Ok(())
}

/// Requires the user to have been created (key assigned).
fn require_created<U: IdentityUser>(operation: &'static str, user: &U) -> Result<ID> {
    user.key().ok_or_else(|| {
        StoreError::InvalidOperation {
            operation,
            reason: "user has not been created".to_string(),
        }
        .into()
    })
}

impl<U: IdentityUser, S: DocumentSession> UserAccountStore<U> for IdentityStore<S> {
    fn create(&mut self, user: &mut U) -> Result<()> {
        require_text("create", "user_name", user.user_name())?;
        let key = self.session.store(user)?;
        self.session.save_changes()?;
        tracing::debug!(user = %key, "created user document");
        Ok(())
    }

    fn find_by_id(&self, id: &ID) -> Result<Option<U>> {
        require_text("find_by_id", "id", id.as_str())?;
        self.session.load::<U>(id)
    }

    fn find_by_user_name(&self, user_name: &str) -> Result<Option<U>> {
        require_text("find_by_user_name", "user_name", user_name)?;
        let mut matches = self
            .session
            .query::<U>(|candidate| candidate.user_name() == user_name)?;
        if matches.is_empty() {
            return Ok(None);
        }
        Ok(Some(matches.swap_remove(0).1))
    }

    fn update(&mut self, user: &U) -> Result<()> {
        let key = require_created("update", user)?;
        let mut doc = user.clone();
        self.session.store(&mut doc)?;
        self.session.save_changes()?;
        tracing::debug!(user = %key, "committed user document");
        Ok(())
    }

    fn delete(&mut self, user: &U) -> Result<()> {
        let key = user.key().ok_or_else(|| {
            crate::Error::from(StoreError::InvalidArgument {
                operation: "delete",
                reason: "user has no document key".to_string(),
            })
        })?;
        // Index and confirmation records pointing at this user stay behind.
        self.session.delete::<U>(&key)?;
        self.session.save_changes()?;
        tracing::debug!(user = %key, "deleted user document");
        Ok(())
    }
}

impl<U: IdentityUser, S: DocumentSession> UserLoginStore<U> for IdentityStore<S> {
    fn logins(&self, user: &U) -> Result<Vec<UserLogin>> {
        Ok(user.logins().to_vec())
    }

    fn find_by_login(&self, login: &UserLogin) -> Result<Option<U>> {
        require_text("find_by_login", "login_provider", &login.login_provider)?;
        require_text("find_by_login", "provider_key", &login.provider_key)?;
        let mut matches = self
            .session
            .query::<U>(|candidate| candidate.logins().contains(login))?;
        if matches.is_empty() {
            return Ok(None);
        }
        Ok(Some(matches.swap_remove(0).1))
    }

    fn add_login(&self, user: &mut U, login: UserLogin) -> Result<()> {
        require_text("add_login", "login_provider", &login.login_provider)?;
        require_text("add_login", "provider_key", &login.provider_key)?;
        user.logins_mut().push(login);
        Ok(())
    }

    fn remove_login(&self, user: &mut U, login: &UserLogin) -> Result<()> {
        let logins = user.logins_mut();
        if let Some(position) = logins.iter().position(|existing| existing == login) {
            logins.remove(position);
        }
        Ok(())
    }
}

impl<U: IdentityUser, S: DocumentSession> UserClaimStore<U> for IdentityStore<S> {
    fn claims(&self, user: &U) -> Result<Vec<UserClaim>> {
        Ok(user.claims().to_vec())
    }

    fn add_claim(&self, user: &mut U, claim: UserClaim) -> Result<()> {
        require_text("add_claim", "claim_type", &claim.claim_type)?;
        user.claims_mut().push(claim);
        Ok(())
    }

    fn remove_claim(&self, user: &mut U, claim: &UserClaim) -> Result<()> {
        let claims = user.claims_mut();
        if let Some(position) = claims.iter().position(|existing| existing == claim) {
            claims.remove(position);
        }
        Ok(())
    }
}

impl<U: IdentityUser, S: DocumentSession> UserPasswordStore<U> for IdentityStore<S> {
    fn password_hash(&self, user: &U) -> Result<Option<String>> {
        Ok(user.password_hash().map(str::to_string))
    }

    fn set_password_hash(&self, user: &mut U, password_hash: Option<String>) -> Result<()> {
        if let Some(hash) = &password_hash {
            require_text("set_password_hash", "password_hash", hash)?;
        }
        user.set_password_hash(password_hash);
        Ok(())
    }

    fn has_password(&self, user: &U) -> Result<bool> {
        Ok(user.password_hash().is_some())
    }
}

impl<U: IdentityUser, S: DocumentSession> UserSecurityStampStore<U> for IdentityStore<S> {
    fn security_stamp(&self, user: &U) -> Result<Option<String>> {
        Ok(user.security_stamp().map(str::to_string))
    }

    fn set_security_stamp(&self, user: &mut U, security_stamp: Option<String>) -> Result<()> {
        if let Some(stamp) = &security_stamp {
            require_text("set_security_stamp", "security_stamp", stamp)?;
        }
        user.set_security_stamp(security_stamp);
        Ok(())
    }
}

impl<U: IdentityUser, S: DocumentSession> UserTwoFactorStore<U> for IdentityStore<S> {
    fn two_factor_enabled(&self, user: &U) -> Result<bool> {
        Ok(user.two_factor_enabled())
    }

    fn set_two_factor_enabled(&self, user: &mut U, enabled: bool) -> Result<()> {
        user.set_two_factor_enabled(enabled);
        Ok(())
    }
}

impl<U: IdentityUser, S: DocumentSession> UserEmailStore<U> for IdentityStore<S> {
    fn find_by_email(&self, email: &str) -> Result<Option<U>> {
        require_text("find_by_email", "email", email)?;
        let key = index::email_index_key(email);
        match self
            .session
            .load_including::<EmailIndexRecord, U>(&key, |record| record.user_id.clone())?
        {
            Some((_, user)) => Ok(user),
            None => Ok(None),
        }
    }

    fn email(&self, user: &U) -> Result<Option<String>> {
        Ok(user.email().map(str::to_string))
    }

    fn set_email(&mut self, user: &mut U, email: &str) -> Result<()> {
        require_text("set_email", "email", email)?;
        let user_key = require_created("set_email", user)?;

        user.set_email(Some(email.to_string()));
        let mut record = EmailIndexRecord::new(email, user_key.clone());
        // The previous address's index record, if any, is left in place.
        self.session.store(&mut record)?;
        let mut doc = user.clone();
        self.session.store(&mut doc)?;
        self.session.save_changes()?;
        tracing::debug!(user = %user_key, index = %record.id, "updated email index");
        Ok(())
    }

    fn email_confirmed(&self, user: &U) -> Result<bool> {
        let email = user.email().ok_or_else(|| {
            crate::Error::from(StoreError::InvalidOperation {
                operation: "email_confirmed",
                reason: "user has no email set".to_string(),
            })
        })?;
        let key = index::email_confirmation_key(user.user_name(), email);
        Ok(self.session.load::<EmailConfirmationRecord>(&key)?.is_some())
    }

    fn set_email_confirmed(&mut self, user: &U, confirmed: bool) -> Result<()> {
        let email = user
            .email()
            .ok_or_else(|| {
                crate::Error::from(StoreError::InvalidOperation {
                    operation: "set_email_confirmed",
                    reason: "user has no email set".to_string(),
                })
            })?
            .to_string();
        let key = index::email_confirmation_key(user.user_name(), &email);

        if confirmed {
            let mut record = EmailConfirmationRecord::new(user.user_name(), &email);
            self.session.store(&mut record)?;
            self.session.save_changes()?;
            tracing::debug!(record = %key, "confirmed email");
        } else if self.session.load::<EmailConfirmationRecord>(&key)?.is_some() {
            self.session.delete::<EmailConfirmationRecord>(&key)?;
            self.session.save_changes()?;
            tracing::debug!(record = %key, "removed email confirmation");
        }
        Ok(())
    }
}
