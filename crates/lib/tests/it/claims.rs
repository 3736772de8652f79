use identidoc::{
    User, UserClaim,
    store::{UserAccountStore, UserClaimStore},
};

use crate::helpers::{backend, created_user, store};

#[test]
fn claims_project_in_insertion_order() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");

    store
        .add_claim(&mut user, UserClaim::new("role", "admin"))
        .unwrap();
    store
        .add_claim(&mut user, UserClaim::new("scope", "read"))
        .unwrap();

    let claims = store.claims(&user).unwrap();
    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0].claim_type, "role");
    assert_eq!(claims[1].claim_type, "scope");
}

#[test]
fn claims_persist_only_after_update() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");
    store
        .add_claim(&mut user, UserClaim::new("role", "admin"))
        .unwrap();

    let fresh = crate::helpers::store(&backend);
    let found: User = fresh
        .find_by_id(user.id.as_ref().unwrap())
        .unwrap()
        .unwrap();
    assert!(found.claims.is_empty());

    store.update(&user).unwrap();
    let fresh = crate::helpers::store(&backend);
    let found: User = fresh
        .find_by_id(user.id.as_ref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(found.claims.len(), 1);
}

#[test]
fn duplicate_claims_are_appended() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");
    let claim = UserClaim::new("role", "admin");

    store.add_claim(&mut user, claim.clone()).unwrap();
    store.add_claim(&mut user, claim).unwrap();
    assert_eq!(user.claims.len(), 2);
}

#[test]
fn remove_claim_matches_on_type_and_value() {
    let backend = backend();
    let mut store = store(&backend);
    let mut user = created_user(&mut store, "alice");
    store
        .add_claim(&mut user, UserClaim::new("role", "admin"))
        .unwrap();

    // Same type, different value: no match, no-op.
    store
        .remove_claim(&mut user, &UserClaim::new("role", "user"))
        .unwrap();
    assert_eq!(user.claims.len(), 1);

    store
        .remove_claim(&mut user, &UserClaim::new("role", "admin"))
        .unwrap();
    assert!(user.claims.is_empty());
}
