use super::{parse_date, BankStore, LoanApplication, DATE_FMT};
use crate::{
    error::{BankError, BankResult},
    types::LoanStatus,
};
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

impl BankStore {
    // ── Loans ─────────────────────────────────────────────────

    pub fn insert_loan(&self, loan: &LoanApplication) -> BankResult<()> {
        self.conn.execute(
            "INSERT INTO loans (loan_id, user_id, amount, purpose, income, status,
                                application_date, remarks, interest_rate_pct, tenure_months)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                loan.loan_id,
                loan.user_id,
                loan.amount,
                loan.purpose,
                loan.income,
                loan.status.as_str(),
                loan.application_date.format(DATE_FMT).to_string(),
                loan.remarks,
                loan.interest_rate_pct,
                loan.tenure_months,
            ],
        )?;
        Ok(())
    }

    pub fn loan_by_id(&self, loan_id: &str) -> BankResult<Option<LoanApplication>> {
        self.conn
            .query_row(
                &format!("{SELECT_LOAN} WHERE loan_id = ?1"),
                [loan_id],
                row_to_loan,
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn loans_for_user(&self, user_id: &str) -> BankResult<Vec<LoanApplication>> {
        self.query_loans(&format!("{SELECT_LOAN} WHERE user_id = ?1 ORDER BY loan_id"), &[&user_id])
    }

    pub fn loans_with_status(&self, status: LoanStatus) -> BankResult<Vec<LoanApplication>> {
        self.query_loans(
            &format!("{SELECT_LOAN} WHERE status = ?1 ORDER BY loan_id"),
            &[&status.as_str()],
        )
    }

    /// All loans already resolved one way or the other — the training set.
    pub fn resolved_loans(&self) -> BankResult<Vec<LoanApplication>> {
        self.query_loans(
            &format!("{SELECT_LOAN} WHERE status != 'pending' ORDER BY loan_id"),
            &[],
        )
    }

    pub fn all_loans(&self) -> BankResult<Vec<LoanApplication>> {
        self.query_loans(&format!("{SELECT_LOAN} ORDER BY loan_id"), &[])
    }

    pub fn loans_in_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> BankResult<Vec<LoanApplication>> {
        self.query_loans(
            &format!(
                "{SELECT_LOAN} WHERE application_date >= ?1 AND application_date <= ?2
                 ORDER BY application_date, loan_id"
            ),
            &[
                &from.format(DATE_FMT).to_string(),
                &to.format(DATE_FMT).to_string(),
            ],
        )
    }

    /// Keyed status update, enforcing the status machine.
    /// The remark replaces the previous one; remarks are the audit trail.
    pub fn transition_loan(
        &self,
        loan_id: &str,
        to: LoanStatus,
        remarks: &str,
    ) -> BankResult<()> {
        let loan = self
            .loan_by_id(loan_id)?
            .ok_or_else(|| BankError::LoanNotFound(loan_id.to_string()))?;
        if !loan.status.can_transition_to(to) {
            return Err(BankError::IllegalTransition {
                loan_id: loan_id.to_string(),
                from: loan.status.as_str(),
                to: to.as_str(),
            });
        }
        self.conn.execute(
            "UPDATE loans SET status = ?1, remarks = ?2 WHERE loan_id = ?3",
            params![to.as_str(), remarks, loan_id],
        )?;
        Ok(())
    }

    pub fn loan_exists(&self, loan_id: &str) -> BankResult<bool> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM loans WHERE loan_id = ?1",
            [loan_id],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    pub fn loan_count_with_status(&self, status: LoanStatus) -> BankResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM loans WHERE status = ?1",
                [status.as_str()],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }

    fn query_loans(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> BankResult<Vec<LoanApplication>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_loan)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

const SELECT_LOAN: &str = "SELECT loan_id, user_id, amount, purpose, income, status,
        application_date, remarks, interest_rate_pct, tenure_months FROM loans";

fn row_to_loan(row: &rusqlite::Row<'_>) -> rusqlite::Result<LoanApplication> {
    Ok(LoanApplication {
        loan_id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        purpose: row.get(3)?,
        income: row.get(4)?,
        status: LoanStatus::parse(&row.get::<_, String>(5)?).unwrap_or(LoanStatus::Pending),
        application_date: parse_date(&row.get::<_, String>(6)?),
        remarks: row.get(7)?,
        interest_rate_pct: row.get(8)?,
        tenure_months: row.get::<_, i64>(9)? as u32,
    })
}
