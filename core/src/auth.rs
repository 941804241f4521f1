//! Registration, login and password reset.
//!
//! Passwords are stored as bcrypt hashes only. Login yields a `Session`
//! value that callers pass into every subsequent handler; nothing here holds
//! global login state, and there is no lockout or expiry.

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Local;
use rand::Rng;

use crate::{
    error::{BankError, BankResult},
    store::{Account, BankStore, User},
    types::{Role, Session},
};

pub struct Registration<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub role: Role,
    pub city: &'a str,
    pub mobile: &'a str,
}

/// Create a user and their account in one transaction. A duplicate username
/// is rejected before anything is written, so a failed registration leaves
/// no partial row behind.
pub fn register(store: &BankStore, reg: &Registration<'_>) -> BankResult<Session> {
    if reg.username.trim().is_empty() {
        return Err(BankError::InvalidField {
            field: "username",
            value: reg.username.to_string(),
        });
    }
    if store.username_exists(reg.username)? {
        return Err(BankError::UsernameTaken(reg.username.to_string()));
    }

    let user_id = format!("U{:04}", store.next_counter("user")?);
    let account_no = generate_account_no();
    let user = User {
        user_id: user_id.clone(),
        username: reg.username.to_string(),
        password_hash: hash(reg.password, DEFAULT_COST)?,
        role: reg.role,
        created_at: Local::now().date_naive(),
    };
    let account = Account {
        user_id: user_id.clone(),
        account_no,
        address: reg.city.to_string(),
        mobile: reg.mobile.to_string(),
        balance: 0.0,
    };
    store.insert_user_with_account(&user, &account)?;
    log::info!("registered {} as {}", user.username, user.user_id);

    Ok(Session {
        user_id,
        username: user.username,
        role: user.role,
    })
}

/// Equality match on username plus bcrypt verification of the password.
pub fn authenticate(store: &BankStore, username: &str, password: &str) -> BankResult<Session> {
    let user = store
        .user_by_username(username)?
        .ok_or(BankError::InvalidCredentials)?;
    if !verify(password, &user.password_hash)? {
        return Err(BankError::InvalidCredentials);
    }
    Ok(Session {
        user_id: user.user_id,
        username: user.username,
        role: user.role,
    })
}

/// Reset a password when username and registered mobile number match.
pub fn reset_password(
    store: &BankStore,
    username: &str,
    mobile: &str,
    new_password: &str,
) -> BankResult<()> {
    let user_id = store
        .user_id_by_username_and_mobile(username, mobile)?
        .ok_or(BankError::ResetMismatch)?;
    store.set_password_hash(&user_id, &hash(new_password, DEFAULT_COST)?)?;
    log::info!("password reset for {user_id}");
    Ok(())
}

/// Display account number: masked prefix plus three random digits, as the
/// old system printed them. Not unique by construction; user_id is the key.
fn generate_account_no() -> String {
    let mut rng = rand::thread_rng();
    format!("XXXXXXX{}", rng.gen_range(100..1000))
}
