//! Loan application workflow: submission and the per-user views.

use chrono::Local;

use crate::{
    config::BankConfig,
    error::{BankError, BankResult},
    store::{BankStore, LoanApplication},
    types::{LoanStatus, Session},
};

/// Submit a new application. It enters the queue as `pending` and stays
/// untouched until a review cycle routes it.
pub fn submit(
    store: &BankStore,
    config: &BankConfig,
    session: &Session,
    amount: f64,
    purpose: &str,
    income: f64,
) -> BankResult<LoanApplication> {
    if amount < config.min_loan_amount {
        return Err(BankError::AmountBelowMinimum {
            min: config.min_loan_amount,
            got: amount,
        });
    }
    if income < 0.0 {
        return Err(BankError::NegativeIncome(income));
    }

    let loan = LoanApplication {
        loan_id: format!("L{:04}", store.next_counter("loan")?),
        user_id: session.user_id.clone(),
        amount,
        purpose: purpose.to_string(),
        income,
        status: LoanStatus::Pending,
        application_date: Local::now().date_naive(),
        remarks: "Awaiting review".to_string(),
        interest_rate_pct: config.default_interest_rate_pct,
        tenure_months: config.default_tenure_months,
    };
    store.insert_loan(&loan)?;
    log::info!(
        "loan {} submitted by {} for {:.2}",
        loan.loan_id,
        session.user_id,
        amount
    );
    Ok(loan)
}

/// The caller's own applications — the "loan status" screen.
pub fn my_loans(store: &BankStore, session: &Session) -> BankResult<Vec<LoanApplication>> {
    store.loans_for_user(&session.user_id)
}

/// Admin-only listing of every application.
pub fn all_loans(store: &BankStore, session: &Session) -> BankResult<Vec<LoanApplication>> {
    if !session.is_admin() {
        return Err(BankError::NotAuthorized);
    }
    store.all_loans()
}
