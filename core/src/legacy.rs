//! One-shot import of a legacy flat-file data directory into the store.
//!
//! The old system kept users.csv, accounts.csv, loan_applications.csv,
//! loan_status.csv and transactions.csv, rewritten wholesale on every
//! interaction. Import reads them through the tolerant `csv_table` loader,
//! hashes any plaintext passwords, collapses the loan_status mirror into the
//! single loans table, and raises the id counters past every imported id.

use std::path::Path;

use bcrypt::{hash, DEFAULT_COST};
use uuid::Uuid;

use crate::{
    config::BankConfig,
    csv_table,
    error::BankResult,
    store::{parse_date, Account, BankStore, LoanApplication, TransactionRecord, User},
    types::{LoanStatus, PaymentMethod, Role},
};

#[derive(Debug, Default)]
pub struct ImportReport {
    pub users: usize,
    pub loans: usize,
    pub transactions: usize,
    /// Rows referencing a user or loan the files never defined. Legacy data
    /// drifted this way (out-of-band deletions, the loan_status mirror);
    /// such rows are skipped with a warning, never a hard failure.
    pub skipped: usize,
}

pub fn import_data_dir(
    store: &BankStore,
    config: &BankConfig,
    dir: &Path,
) -> BankResult<ImportReport> {
    let users = csv_table::load(&dir.join("users.csv"), csv_table::USERS);
    // The login path cannot tolerate a users file without credentials.
    users.require_columns(&["username", "password"])?;
    let accounts = csv_table::load(&dir.join("accounts.csv"), csv_table::ACCOUNTS);
    let loans = csv_table::load(&dir.join("loan_applications.csv"), csv_table::LOANS);
    let txns = csv_table::load(&dir.join("transactions.csv"), csv_table::TRANSACTIONS);
    // loan_status.csv was a second, independently mutated copy of the loans
    // table. The loans file is the source of truth; the mirror is dropped.

    let mut report = ImportReport::default();

    for i in 0..users.rows.len() {
        let user_id = users.get(i, "user_id").to_string();
        let password = users.get(i, "password");
        let user = User {
            user_id: user_id.clone(),
            username: users.get(i, "username").to_string(),
            password_hash: hash_if_plaintext(password)?,
            role: Role::parse(users.get(i, "role")).unwrap_or(Role::User),
            created_at: chrono::Local::now().date_naive(),
        };
        let account = accounts
            .rows
            .iter()
            .position(|r| r.get("user_id").map(String::as_str) == Some(user_id.as_str()))
            .map(|j| Account {
                user_id: user_id.clone(),
                account_no: accounts.get(j, "account_no").to_string(),
                address: accounts.get(j, "address").to_string(),
                mobile: accounts.get(j, "mobile").to_string(),
                balance: accounts.get(j, "balance").parse().unwrap_or(0.0),
            })
            .unwrap_or(Account {
                user_id: user_id.clone(),
                account_no: String::new(),
                address: String::new(),
                mobile: String::new(),
                balance: 0.0,
            });
        store.insert_user_with_account(&user, &account)?;
        raise_for_id(store, "user", &user_id)?;
        report.users += 1;
    }

    for i in 0..loans.rows.len() {
        let loan_id = loans.get(i, "loan_id").to_string();
        let user_id = loans.get(i, "user_id");
        if !store.user_id_exists(user_id)? {
            log::warn!("skipping loan {loan_id}: user {user_id} not in users file");
            report.skipped += 1;
            continue;
        }
        let loan = LoanApplication {
            loan_id: loan_id.clone(),
            user_id: user_id.to_string(),
            amount: loans.get(i, "amount").parse().unwrap_or(0.0),
            purpose: loans.get(i, "purpose").to_string(),
            income: loans.get(i, "income").parse().unwrap_or(0.0),
            status: LoanStatus::parse(loans.get(i, "status")).unwrap_or(LoanStatus::Pending),
            application_date: parse_date(loans.get(i, "application_date")),
            remarks: loans.get(i, "remarks").to_string(),
            // The old files never carried repayment terms; imported loans
            // take the configured defaults.
            interest_rate_pct: config.default_interest_rate_pct,
            tenure_months: config.default_tenure_months,
        };
        store.insert_loan(&loan)?;
        raise_for_id(store, "loan", &loan_id)?;
        report.loans += 1;
    }

    for i in 0..txns.rows.len() {
        let user_id = txns.get(i, "user_id");
        if !store.user_id_exists(user_id)? {
            log::warn!("skipping transaction row {i}: user {user_id} not in users file");
            report.skipped += 1;
            continue;
        }
        let loan_id = txns.get(i, "loan_id");
        if !loan_id.is_empty() && !store.loan_exists(loan_id)? {
            log::warn!("skipping transaction row {i}: loan {loan_id} not in loans file");
            report.skipped += 1;
            continue;
        }
        let txn = TransactionRecord {
            txn_id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            loan_id: (!loan_id.is_empty()).then(|| loan_id.to_string()),
            amount: txns.get(i, "amount").parse().unwrap_or(0.0),
            method: PaymentMethod::parse(txns.get(i, "method")).unwrap_or(PaymentMethod::Upi),
            date: parse_date(txns.get(i, "date")),
        };
        store.append_transaction(&txn)?;
        report.transactions += 1;
    }

    log::info!(
        "imported {} users, {} loans, {} transactions ({} rows skipped) from {}",
        report.users,
        report.loans,
        report.transactions,
        report.skipped,
        dir.display()
    );
    Ok(report)
}

/// Legacy files held passwords both ways; anything that is not already a
/// bcrypt hash gets hashed on the way in. No plaintext survives import.
fn hash_if_plaintext(password: &str) -> BankResult<String> {
    if password.starts_with("$2") {
        Ok(password.to_string())
    } else {
        Ok(hash(password, DEFAULT_COST)?)
    }
}

/// "U0042" / "L0007" → raise the counter to the numeric suffix.
fn raise_for_id(store: &BankStore, counter: &str, id: &str) -> BankResult<()> {
    if let Some(n) = id.get(1..).and_then(|s| s.parse::<i64>().ok()) {
        store.raise_counter(counter, n)?;
    }
    Ok(())
}
