use identidoc::{ID, User, store::UserAccountStore};

use crate::helpers::{backend, created_user, store};

#[test]
fn create_then_find_by_id_round_trips() {
    let backend = backend();
    let mut store = store(&backend);

    let user = created_user(&mut store, "alice");
    let id = user.id.clone().unwrap();

    let found: User = store.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.user_name, "alice");
    assert!(found.email.is_none());
    assert!(found.logins.is_empty());
    assert!(found.claims.is_empty());

    // Committed state is visible to a fresh session too.
    let fresh = crate::helpers::store(&backend);
    let found: Option<User> = fresh.find_by_id(&id).unwrap();
    assert!(found.is_some());
}

#[test]
fn find_by_id_of_unknown_key_returns_none() {
    let backend = backend();
    let store = store(&backend);
    let found: Option<User> = store.find_by_id(&ID::new("nope")).unwrap();
    assert!(found.is_none());
}

#[test]
fn find_by_user_name_matches_exactly() {
    let backend = backend();
    let mut store = store(&backend);
    created_user(&mut store, "Alice");

    let found: Option<User> = store.find_by_user_name("Alice").unwrap();
    assert!(found.is_some());

    // Case-sensitive: a differently-cased name does not match.
    let found: Option<User> = store.find_by_user_name("alice").unwrap();
    assert!(found.is_none());
}

#[test]
fn created_id_is_stable_across_updates() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");
    let id = user.id.clone();

    user.user_name = "alice-renamed".to_string();
    store.update(&user).unwrap();
    assert_eq!(user.id, id);

    let found: Option<User> = store.find_by_user_name("alice-renamed").unwrap();
    assert_eq!(found.unwrap().id, id);
}

#[test]
fn update_persists_in_memory_mutations() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");

    user.two_factor_enabled = true;
    // Not yet committed: a fresh session sees the old state.
    let fresh = crate::helpers::store(&backend);
    let found: User = fresh.find_by_id(user.id.as_ref().unwrap()).unwrap().unwrap();
    assert!(!found.two_factor_enabled);

    store.update(&user).unwrap();
    let fresh = crate::helpers::store(&backend);
    let found: User = fresh.find_by_id(user.id.as_ref().unwrap()).unwrap().unwrap();
    assert!(found.two_factor_enabled);
}

#[test]
fn delete_then_find_by_id_returns_none() {
    let backend = backend();
    let mut store = store(&backend);
    let user = created_user(&mut store, "alice");
    let id = user.id.clone().unwrap();

    store.delete(&user).unwrap();

    let found: Option<User> = store.find_by_id(&id).unwrap();
    assert!(found.is_none());
    let fresh = crate::helpers::store(&backend);
    let found: Option<User> = fresh.find_by_id(&id).unwrap();
    assert!(found.is_none());
}
