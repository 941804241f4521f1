//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! Workflow code calls store methods — it never executes SQL directly.
//!
//! All mutations are keyed updates or single-row inserts; nothing rewrites a
//! whole table. Display identifiers come from the persisted `counters` table.

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::{
    error::BankResult,
    types::{LoanId, LoanStatus, PaymentMethod, Role, UserId},
};

mod account;
mod loan;
mod transaction;
mod user;

pub struct BankStore {
    conn: Connection,
}

impl BankStore {
    pub fn open(path: &str) -> BankResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> BankResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> BankResult<()> {
        self.conn
            .execute_batch(include_str!("../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Counters ──────────────────────────────────────────────

    /// Bump the named counter and return its new value.
    pub(crate) fn next_counter(&self, name: &str) -> BankResult<i64> {
        self.conn.execute(
            "UPDATE counters SET value = value + 1 WHERE name = ?1",
            [name],
        )?;
        let value: i64 = self.conn.query_row(
            "SELECT value FROM counters WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(value)
    }

    /// Raise the named counter to at least `value`. Used by legacy import so
    /// freshly issued ids never collide with imported ones.
    pub(crate) fn raise_counter(&self, name: &str, value: i64) -> BankResult<()> {
        self.conn.execute(
            "UPDATE counters SET value = MAX(value, ?1) WHERE name = ?2",
            rusqlite::params![value, name],
        )?;
        Ok(())
    }
}

// ── Row types ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: UserId,
    pub account_no: String,
    pub address: String,
    pub mobile: String,
    pub balance: f64,
}

#[derive(Debug, Clone)]
pub struct LoanApplication {
    pub loan_id: LoanId,
    pub user_id: UserId,
    pub amount: f64,
    pub purpose: String,
    pub income: f64,
    pub status: LoanStatus,
    pub application_date: NaiveDate,
    pub remarks: String,
    pub interest_rate_pct: f64,
    pub tenure_months: u32,
}

#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub txn_id: String,
    pub user_id: UserId,
    pub loan_id: Option<LoanId>,
    pub amount: f64,
    pub method: PaymentMethod,
    pub date: NaiveDate,
}

pub(crate) const DATE_FMT: &str = "%Y-%m-%d";

pub(crate) fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FMT).unwrap_or_default()
}
