//! User aggregate types for the identity store.
//!
//! The store is parameterized over any aggregate implementing
//! [`IdentityUser`]; the [`User`] struct is the provided default.

use serde::{Deserialize, Serialize};

use crate::{ID, session::Document};

/// An external login bound to a user, identified by (provider, key).
///
/// Uniqueness per (provider, key) is not enforced at this layer; callers
/// that need it must check before adding.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserLogin {
    /// Name of the external login provider
    pub login_provider: String,

    /// Provider-scoped key identifying the credential
    pub provider_key: String,
}

impl UserLogin {
    pub fn new(login_provider: impl Into<String>, provider_key: impl Into<String>) -> Self {
        Self {
            login_provider: login_provider.into(),
            provider_key: provider_key.into(),
        }
    }
}

/// A claim attached to a user, matched by (type, value).
///
/// Same non-uniqueness caveat as [`UserLogin`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserClaim {
    pub claim_type: String,
    pub claim_value: String,
}

impl UserClaim {
    pub fn new(claim_type: impl Into<String>, claim_value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }
}

/// Contract the identity store requires of a user aggregate.
///
/// The aggregate is an identity-bearing document: its key is assigned at
/// creation and immutable afterward. Logins and claims keep insertion order;
/// removal matches by value and removes the first match.
pub trait IdentityUser: Document {
    /// Login identifier. Uniqueness is the caller's responsibility.
    fn user_name(&self) -> &str;

    fn set_user_name(&mut self, user_name: String);

    fn email(&self) -> Option<&str>;

    fn set_email(&mut self, email: Option<String>);

    fn password_hash(&self) -> Option<&str>;

    fn set_password_hash(&mut self, password_hash: Option<String>);

    fn security_stamp(&self) -> Option<&str>;

    fn set_security_stamp(&mut self, security_stamp: Option<String>);

    fn two_factor_enabled(&self) -> bool;

    fn set_two_factor_enabled(&mut self, enabled: bool);

    fn logins(&self) -> &[UserLogin];

    fn logins_mut(&mut self) -> &mut Vec<UserLogin>;

    fn claims(&self) -> &[UserClaim];

    fn claims_mut(&mut self) -> &mut Vec<UserClaim>;
}

/// Default user aggregate.
///
/// Passwordless users have `None` for `password_hash`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    /// Document key, `None` until assigned at creation
    pub id: Option<ID>,

    /// Unique username (login identifier)
    pub user_name: String,

    /// Email address, if one has been set
    pub email: Option<String>,

    /// Password hash (hashing itself lives in the caller)
    pub password_hash: Option<String>,

    /// Security stamp, rotated by the caller on credential changes
    pub security_stamp: Option<String>,

    /// Whether two-factor authentication is enabled
    pub two_factor_enabled: bool,

    /// External logins, in insertion order
    pub logins: Vec<UserLogin>,

    /// Claims, in insertion order
    pub claims: Vec<UserClaim>,
}

impl User {
    /// Creates a new, not-yet-persisted user with the given username.
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            id: None,
            user_name: user_name.into(),
            email: None,
            password_hash: None,
            security_stamp: None,
            two_factor_enabled: false,
            logins: Vec::new(),
            claims: Vec::new(),
        }
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn key(&self) -> Option<ID> {
        self.id.clone()
    }

    fn set_key(&mut self, key: ID) {
        self.id = Some(key);
    }
}

impl IdentityUser for User {
    fn user_name(&self) -> &str {
        &self.user_name
    }

    fn set_user_name(&mut self, user_name: String) {
        self.user_name = user_name;
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    fn set_email(&mut self, email: Option<String>) {
        self.email = email;
    }

    fn password_hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    fn set_password_hash(&mut self, password_hash: Option<String>) {
        self.password_hash = password_hash;
    }

    fn security_stamp(&self) -> Option<&str> {
        self.security_stamp.as_deref()
    }

    fn set_security_stamp(&mut self, security_stamp: Option<String>) {
        self.security_stamp = security_stamp;
    }

    fn two_factor_enabled(&self) -> bool {
        self.two_factor_enabled
    }

    fn set_two_factor_enabled(&mut self, enabled: bool) {
        self.two_factor_enabled = enabled;
    }

    fn logins(&self) -> &[UserLogin] {
        &self.logins
    }

    fn logins_mut(&mut self) -> &mut Vec<UserLogin> {
        &mut self.logins
    }

    fn claims(&self) -> &[UserClaim] {
        &self.claims
    }

    fn claims_mut(&mut self) -> &mut Vec<UserClaim> {
        &mut self.claims
    }
}
