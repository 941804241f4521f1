use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Username '{0}' already exists")]
    UsernameTaken(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Username and mobile number do not match any account")]
    ResetMismatch,

    #[error("No such user: {0}")]
    UserNotFound(String),

    #[error("No such loan: {0}")]
    LoanNotFound(String),

    #[error("Loan amount must be at least {min}, got {got}")]
    AmountBelowMinimum { min: f64, got: f64 },

    #[error("Monthly income cannot be negative, got {0}")]
    NegativeIncome(f64),

    #[error("Loan {loan_id} is {status}, expected {expected}")]
    WrongStatus {
        loan_id: String,
        status: &'static str,
        expected: &'static str,
    },

    #[error("Illegal status transition {from} → {to} for loan {loan_id}")]
    IllegalTransition {
        loan_id: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("Loan {0} is fully repaid; nothing due")]
    NothingDue(String),

    #[error("Not enough resolved loans to train the risk model (need both approved and declined history)")]
    InsufficientTrainingData,

    #[error("Required column '{column}' missing from {table} table")]
    MissingColumn { table: &'static str, column: String },

    #[error("Invalid {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("Admin role required")]
    NotAuthorized,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type BankResult<T> = Result<T, BankError>;

impl BankError {
    /// True for errors that are ordinary user-facing rejections rather than
    /// faults — the console prints these inline and keeps going.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            BankError::Database(_)
                | BankError::Serialization(_)
                | BankError::Csv(_)
                | BankError::Hashing(_)
                | BankError::Other(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A user who simply hasn't logged in is told so, not accused of
    /// bad credentials.
    #[test]
    fn missing_session_is_its_own_rejection() {
        let err = BankError::NotLoggedIn;
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "Not logged in");
        assert_ne!(err.to_string(), BankError::InvalidCredentials.to_string());
    }
}
