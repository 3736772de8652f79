use identidoc::{
    User,
    index::{EmailConfirmationRecord, EmailIndexRecord, email_confirmation_key, email_index_key},
    session::DocumentSession,
    store::{UserAccountStore, UserEmailStore},
};

use crate::helpers::{backend, created_user, store};

#[test]
fn set_email_then_find_by_email() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");

    store.set_email(&mut user, "Alice@Example.COM").unwrap();
    assert_eq!(store.email(&user).unwrap().as_deref(), Some("Alice@Example.COM"));

    // The index key is normalized: case and whitespace variants resolve.
    let found: Option<User> = store.find_by_email("alice@example.com").unwrap();
    assert_eq!(found.unwrap().id, user.id);

    // set_email commits, so a fresh session resolves too and sees the email
    // field on the user document.
    let fresh = crate::helpers::store(&backend);
    let found: User = fresh.find_by_email(" alice@example.com ").unwrap().unwrap();
    assert_eq!(found.email.as_deref(), Some("Alice@Example.COM"));
}

#[test]
fn find_by_email_of_unknown_address_returns_none() {
    let backend = backend();
    let store = store(&backend);
    let found: Option<User> = store.find_by_email("nobody@example.com").unwrap();
    assert!(found.is_none());
}

// Known gap, locked as a regression test: setting a second address does not
// remove the index record for the first, so the old address still resolves.
#[test]
fn stale_email_index_still_resolves() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");

    store.set_email(&mut user, "old@example.com").unwrap();
    store.set_email(&mut user, "new@example.com").unwrap();

    let found: Option<User> = store.find_by_email("new@example.com").unwrap();
    assert_eq!(found.unwrap().id, user.id);

    let found: Option<User> = store.find_by_email("old@example.com").unwrap();
    assert_eq!(found.unwrap().id, user.id);
}

// Known gap, locked as a regression test: deleting a user leaves its index
// record behind. The lookup then dead-ends on the missing user document.
#[test]
fn orphaned_index_survives_user_deletion() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");
    store.set_email(&mut user, "alice@example.com").unwrap();

    store.delete(&user).unwrap();

    let session = backend.session();
    let record = session
        .load::<EmailIndexRecord>(&email_index_key("alice@example.com"))
        .unwrap();
    assert!(record.is_some());

    let found: Option<User> = store.find_by_email("alice@example.com").unwrap();
    assert!(found.is_none());
}

#[test]
fn email_confirmation_round_trip() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");
    store.set_email(&mut user, "alice@example.com").unwrap();

    assert!(!store.email_confirmed(&user).unwrap());

    store.set_email_confirmed(&user, true).unwrap();
    assert!(store.email_confirmed(&user).unwrap());

    // Confirmation survives the session: existence of the record is the
    // sole evidence, visible to a fresh store.
    let fresh = crate::helpers::store(&backend);
    assert!(fresh.email_confirmed(&user).unwrap());

    store.set_email_confirmed(&user, false).unwrap();
    assert!(!store.email_confirmed(&user).unwrap());
}

#[test]
fn unconfirming_without_a_record_is_noop() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");
    store.set_email(&mut user, "alice@example.com").unwrap();

    store.set_email_confirmed(&user, false).unwrap();
    assert!(!store.email_confirmed(&user).unwrap());
}

// Confirmation is keyed per (username, email): a new address starts
// unconfirmed and the old record is orphaned, not removed.
#[test]
fn changing_email_resets_confirmation_under_new_key() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");
    store.set_email(&mut user, "old@example.com").unwrap();
    store.set_email_confirmed(&user, true).unwrap();

    store.set_email(&mut user, "new@example.com").unwrap();
    assert!(!store.email_confirmed(&user).unwrap());

    let session = backend.session();
    let orphan = session
        .load::<EmailConfirmationRecord>(&email_confirmation_key("alice", "old@example.com"))
        .unwrap();
    assert!(orphan.is_some());
}

#[test]
fn renaming_user_resets_confirmation_under_new_key() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");
    store.set_email(&mut user, "alice@example.com").unwrap();
    store.set_email_confirmed(&user, true).unwrap();

    user.user_name = "alice-renamed".to_string();
    store.update(&user).unwrap();

    assert!(!store.email_confirmed(&user).unwrap());

    let session = backend.session();
    let orphan = session
        .load::<EmailConfirmationRecord>(&email_confirmation_key("alice", "alice@example.com"))
        .unwrap();
    assert!(orphan.is_some());
}
