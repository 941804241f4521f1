use super::{parse_date, Account, BankStore, User, DATE_FMT};
use crate::{error::BankResult, types::Role};
use rusqlite::{params, OptionalExtension};

impl BankStore {
    // ── Users ─────────────────────────────────────────────────

    /// Insert a user together with their account, atomically.
    /// Registration must never leave a user without an account row.
    pub fn insert_user_with_account(&self, user: &User, account: &Account) -> BankResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO users (user_id, username, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.user_id,
                user.username,
                user.password_hash,
                user.role.as_str(),
                user.created_at.format(DATE_FMT).to_string(),
            ],
        )?;
        tx.execute(
            "INSERT INTO accounts (user_id, account_no, address, mobile, balance)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                account.user_id,
                account.account_no,
                account.address,
                account.mobile,
                account.balance,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn user_by_username(&self, username: &str) -> BankResult<Option<User>> {
        self.conn
            .query_row(
                "SELECT user_id, username, password_hash, role, created_at
                 FROM users WHERE username = ?1",
                [username],
                row_to_user,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn username_exists(&self, username: &str) -> BankResult<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            [username],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    pub fn user_id_exists(&self, user_id: &str) -> BankResult<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    pub fn user_count(&self) -> BankResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(Into::into)
    }

    pub fn set_password_hash(&self, user_id: &str, hash: &str) -> BankResult<()> {
        self.conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE user_id = ?2",
            params![hash, user_id],
        )?;
        Ok(())
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: Role::parse(&row.get::<_, String>(3)?).unwrap_or(Role::User),
        created_at: parse_date(&row.get::<_, String>(4)?),
    })
}
