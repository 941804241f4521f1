//! Admin analytics: status counts, disbursal totals, date-range filters and
//! CSV export of the filtered applications.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;

use crate::{
    csv_table::{self, CsvTable},
    error::{BankError, BankResult},
    store::{Account, BankStore, LoanApplication, User},
    types::{LoanStatus, Session},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoanCounts {
    pub pending: i64,
    pub approved: i64,
    pub declined: i64,
    pub closed: i64,
}

impl LoanCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.approved + self.declined + self.closed
    }
}

pub fn loan_counts(store: &BankStore, session: &Session) -> BankResult<LoanCounts> {
    require_admin(session)?;
    Ok(LoanCounts {
        pending: store.loan_count_with_status(LoanStatus::Pending)?,
        approved: store.loan_count_with_status(LoanStatus::Approved)?,
        declined: store.loan_count_with_status(LoanStatus::Declined)?,
        closed: store.loan_count_with_status(LoanStatus::Closed)?,
    })
}

/// Sum of amounts across approved and closed loans.
pub fn total_disbursed(store: &BankStore, session: &Session) -> BankResult<f64> {
    require_admin(session)?;
    let total = store
        .all_loans()?
        .iter()
        .filter(|l| matches!(l.status, LoanStatus::Approved | LoanStatus::Closed))
        .map(|l| l.amount)
        .sum();
    Ok(total)
}

pub fn applications_between(
    store: &BankStore,
    session: &Session,
    from: NaiveDate,
    to: NaiveDate,
) -> BankResult<Vec<LoanApplication>> {
    require_admin(session)?;
    store.loans_in_date_range(from, to)
}

/// Admin user lookup by username: the user row plus their account.
pub fn lookup_user(
    store: &BankStore,
    session: &Session,
    username: &str,
) -> BankResult<(User, Option<Account>)> {
    require_admin(session)?;
    let user = store
        .user_by_username(username)?
        .ok_or_else(|| BankError::UserNotFound(username.to_string()))?;
    let account = store.account_for_user(&user.user_id)?;
    Ok((user, account))
}

/// Write the given applications to a CSV file in the legacy loan table
/// layout, for spreadsheet consumption.
pub fn export_loans_csv(
    session: &Session,
    loans: &[LoanApplication],
    path: &Path,
) -> BankResult<()> {
    require_admin(session)?;
    let mut table = CsvTable::empty(csv_table::LOANS);
    for loan in loans {
        let mut row = HashMap::new();
        row.insert("loan_id".into(), loan.loan_id.clone());
        row.insert("user_id".into(), loan.user_id.clone());
        row.insert("amount".into(), loan.amount.to_string());
        row.insert("purpose".into(), loan.purpose.clone());
        row.insert("income".into(), loan.income.to_string());
        row.insert("status".into(), loan.status.as_str().to_string());
        row.insert("application_date".into(), loan.application_date.to_string());
        row.insert("remarks".into(), loan.remarks.clone());
        table.rows.push(row);
    }
    csv_table::save(path, &table)?;
    log::info!("exported {} applications to {}", loans.len(), path.display());
    Ok(())
}

fn require_admin(session: &Session) -> BankResult<()> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(BankError::NotAuthorized)
    }
}
