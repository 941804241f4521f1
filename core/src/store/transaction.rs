use super::{parse_date, BankStore, TransactionRecord, DATE_FMT};
use crate::{error::BankResult, types::PaymentMethod};
use rusqlite::params;

impl BankStore {
    // ── Transactions ──────────────────────────────────────────

    pub fn append_transaction(&self, txn: &TransactionRecord) -> BankResult<()> {
        self.conn.execute(
            "INSERT INTO transactions (txn_id, user_id, loan_id, amount, method, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                txn.txn_id,
                txn.user_id,
                txn.loan_id,
                txn.amount,
                txn.method.as_str(),
                txn.date.format(DATE_FMT).to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn transactions_for_user(&self, user_id: &str) -> BankResult<Vec<TransactionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT txn_id, user_id, loan_id, amount, method, date
             FROM transactions WHERE user_id = ?1 ORDER BY date, txn_id",
        )?;
        let rows = stmt.query_map([user_id], row_to_txn)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// EMI installments recorded against a loan so far.
    pub fn paid_count(&self, user_id: &str, loan_id: &str) -> BankResult<u32> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?1 AND loan_id = ?2",
            params![user_id, loan_id],
            |row| row.get(0),
        )?;
        Ok(n as u32)
    }
}

fn row_to_txn(row: &rusqlite::Row<'_>) -> rusqlite::Result<TransactionRecord> {
    Ok(TransactionRecord {
        txn_id: row.get(0)?,
        user_id: row.get(1)?,
        loan_id: row.get(2)?,
        amount: row.get(3)?,
        method: PaymentMethod::parse(&row.get::<_, String>(4)?).unwrap_or(PaymentMethod::Upi),
        date: parse_date(&row.get::<_, String>(5)?),
    })
}
