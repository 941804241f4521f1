use super::{Account, BankStore};
use crate::error::BankResult;
use rusqlite::{params, OptionalExtension};

impl BankStore {
    // ── Accounts ──────────────────────────────────────────────

    pub fn account_for_user(&self, user_id: &str) -> BankResult<Option<Account>> {
        self.conn
            .query_row(
                "SELECT user_id, account_no, address, mobile, balance
                 FROM accounts WHERE user_id = ?1",
                [user_id],
                row_to_account,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Whether a username + mobile pair identifies a registered user.
    /// Used by the password-reset path.
    pub fn user_id_by_username_and_mobile(
        &self,
        username: &str,
        mobile: &str,
    ) -> BankResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT u.user_id
                 FROM users u JOIN accounts a ON a.user_id = u.user_id
                 WHERE u.username = ?1 AND a.mobile = ?2",
                params![username, mobile],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

}

fn row_to_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        user_id: row.get(0)?,
        account_no: row.get(1)?,
        address: row.get(2)?,
        mobile: row.get(3)?,
        balance: row.get(4)?,
    })
}
