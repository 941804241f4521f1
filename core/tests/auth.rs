//! Registration, login and password-reset tests.

use loandesk_core::{
    auth::{self, Registration},
    error::BankError,
    store::BankStore,
    types::Role,
};

fn store() -> BankStore {
    let store = BankStore::in_memory().unwrap();
    store.migrate().unwrap();
    store
}

fn reg<'a>(username: &'a str, password: &'a str) -> Registration<'a> {
    Registration {
        username,
        password,
        role: Role::User,
        city: "Pune",
        mobile: "9000000001",
    }
}

#[test]
fn register_then_login() {
    let store = store();
    let session = auth::register(&store, &reg("asha", "hunter2")).unwrap();
    assert_eq!(session.user_id, "U0001");
    assert_eq!(session.role, Role::User);

    let again = auth::authenticate(&store, "asha", "hunter2").unwrap();
    assert_eq!(again.user_id, session.user_id);
}

#[test]
fn wrong_password_rejected() {
    let store = store();
    auth::register(&store, &reg("asha", "hunter2")).unwrap();
    assert!(matches!(
        auth::authenticate(&store, "asha", "hunter3"),
        Err(BankError::InvalidCredentials)
    ));
    assert!(matches!(
        auth::authenticate(&store, "nobody", "hunter2"),
        Err(BankError::InvalidCredentials)
    ));
}

/// A rejected duplicate registration must leave the user table untouched.
#[test]
fn duplicate_username_rejected_with_no_partial_row() {
    let store = store();
    auth::register(&store, &reg("asha", "hunter2")).unwrap();

    let err = auth::register(&store, &reg("asha", "other")).unwrap_err();
    assert!(matches!(err, BankError::UsernameTaken(_)));
    assert!(err.is_rejection());
    assert_eq!(store.user_count().unwrap(), 1);
    // The original password still works; nothing was overwritten.
    auth::authenticate(&store, "asha", "hunter2").unwrap();
}

#[test]
fn passwords_are_stored_hashed() {
    let store = store();
    auth::register(&store, &reg("asha", "hunter2")).unwrap();
    let user = store.user_by_username("asha").unwrap().unwrap();
    assert_ne!(user.password_hash, "hunter2");
    assert!(user.password_hash.starts_with("$2"));
}

#[test]
fn reset_requires_matching_mobile() {
    let store = store();
    auth::register(&store, &reg("asha", "hunter2")).unwrap();

    assert!(matches!(
        auth::reset_password(&store, "asha", "9999999999", "newpass"),
        Err(BankError::ResetMismatch)
    ));
    // Old password untouched by the failed reset.
    auth::authenticate(&store, "asha", "hunter2").unwrap();

    auth::reset_password(&store, "asha", "9000000001", "newpass").unwrap();
    auth::authenticate(&store, "asha", "newpass").unwrap();
    assert!(auth::authenticate(&store, "asha", "hunter2").is_err());
}

#[test]
fn registration_creates_account_row() {
    let store = store();
    let session = auth::register(&store, &reg("asha", "hunter2")).unwrap();
    let account = store.account_for_user(&session.user_id).unwrap().unwrap();
    assert_eq!(account.address, "Pune");
    assert_eq!(account.mobile, "9000000001");
    assert_eq!(account.balance, 0.0);
    assert!(account.account_no.starts_with("XXXXXXX"));
}

#[test]
fn user_ids_are_sequential() {
    let store = store();
    let a = auth::register(&store, &reg("asha", "pw")).unwrap();
    let mut r = reg("binod", "pw");
    r.mobile = "9000000002";
    let b = auth::register(&store, &r).unwrap();
    assert_eq!(a.user_id, "U0001");
    assert_eq!(b.user_id, "U0002");
}
