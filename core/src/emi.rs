//! EMI computation and the repayment ledger.
//!
//! An approved loan is repaid in `tenure_months` equal monthly installments.
//! Each payment appends one transaction; the paid count against the tenure
//! decides how much is left. The closing payment moves the loan to `closed`
//! exactly once.

use chrono::Local;
use uuid::Uuid;

use crate::{
    error::{BankError, BankResult},
    store::{BankStore, LoanApplication, TransactionRecord},
    types::{LoanStatus, PaymentMethod, Session},
};

/// Reducing-balance monthly installment:
/// `P·r·(1+r)^n / ((1+r)^n − 1)` with `r = annual_rate_pct / 1200`.
/// A zero rate degenerates to straight division. A zero tenure has no
/// installment to compute and is rejected.
pub fn compute_emi(principal: f64, annual_rate_pct: f64, tenure_months: u32) -> BankResult<f64> {
    if tenure_months == 0 {
        return Err(BankError::InvalidField {
            field: "tenure",
            value: tenure_months.to_string(),
        });
    }
    let n = tenure_months as f64;
    if annual_rate_pct == 0.0 {
        return Ok(principal / n);
    }
    let r = annual_rate_pct / 1200.0;
    let growth = (1.0 + r).powf(n);
    Ok(principal * r * growth / (growth - 1.0))
}

/// Where a loan's repayment stands.
#[derive(Debug, Clone)]
pub struct RepaymentStatus {
    pub loan: LoanApplication,
    pub emi: f64,
    pub paid: u32,
    pub remaining: u32,
}

pub fn repayment_status(
    store: &BankStore,
    session: &Session,
    loan_id: &str,
) -> BankResult<RepaymentStatus> {
    let loan = owned_loan(store, session, loan_id)?;
    let paid = store.paid_count(&loan.user_id, &loan.loan_id)?;
    Ok(RepaymentStatus {
        emi: compute_emi(loan.amount, loan.interest_rate_pct, loan.tenure_months)?,
        remaining: loan.tenure_months.saturating_sub(paid),
        paid,
        loan,
    })
}

/// Pay exactly one installment. Rejected when the loan is not approved or
/// nothing is due. The payment that clears the last installment also closes
/// the loan; a closed loan can never be paid again, so closure happens once.
pub fn pay(
    store: &BankStore,
    session: &Session,
    loan_id: &str,
    method: PaymentMethod,
) -> BankResult<TransactionRecord> {
    let loan = owned_loan(store, session, loan_id)?;
    match loan.status {
        LoanStatus::Approved => {}
        LoanStatus::Closed => return Err(BankError::NothingDue(loan.loan_id)),
        other => {
            return Err(BankError::WrongStatus {
                loan_id: loan.loan_id,
                status: other.as_str(),
                expected: "approved",
            })
        }
    }

    let paid = store.paid_count(&loan.user_id, &loan.loan_id)?;
    if paid >= loan.tenure_months {
        // Ledger says fully repaid but the row never closed (legacy data).
        // Close it now rather than take another payment.
        close(store, &loan)?;
        return Err(BankError::NothingDue(loan.loan_id));
    }

    let txn = TransactionRecord {
        txn_id: Uuid::new_v4().to_string(),
        user_id: loan.user_id.clone(),
        loan_id: Some(loan.loan_id.clone()),
        amount: compute_emi(loan.amount, loan.interest_rate_pct, loan.tenure_months)?,
        method,
        date: Local::now().date_naive(),
    };
    store.append_transaction(&txn)?;
    log::info!(
        "EMI payment {}/{} on {} by {}",
        paid + 1,
        loan.tenure_months,
        loan.loan_id,
        session.user_id
    );

    if paid + 1 >= loan.tenure_months {
        close(store, &loan)?;
    }
    Ok(txn)
}

fn close(store: &BankStore, loan: &LoanApplication) -> BankResult<()> {
    let today = Local::now().date_naive();
    store.transition_loan(
        &loan.loan_id,
        LoanStatus::Closed,
        &format!("Loan fully repaid on {today}"),
    )?;
    log::info!("loan {} closed", loan.loan_id);
    Ok(())
}

fn owned_loan(
    store: &BankStore,
    session: &Session,
    loan_id: &str,
) -> BankResult<LoanApplication> {
    let loan = store
        .loan_by_id(loan_id)?
        .ok_or_else(|| BankError::LoanNotFound(loan_id.to_string()))?;
    if loan.user_id != session.user_id && !session.is_admin() {
        return Err(BankError::LoanNotFound(loan_id.to_string()));
    }
    Ok(loan)
}
