//! Shared primitive types used across the whole bank core.

use serde::{Deserialize, Serialize};

use crate::error::BankError;

/// Display identifier for a user ("U0001").
pub type UserId = String;

/// Display identifier for a loan application ("L0001").
pub type LoanId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Result<Self, BankError> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(BankError::InvalidField {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle of a loan application.
///
/// pending → approved | declined, approved → closed.
/// declined and closed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Pending,
    Approved,
    Declined,
    Closed,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Declined => "declined",
            LoanStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Result<Self, BankError> {
        match s {
            "pending" => Ok(LoanStatus::Pending),
            "approved" => Ok(LoanStatus::Approved),
            "declined" => Ok(LoanStatus::Declined),
            "closed" => Ok(LoanStatus::Closed),
            other => Err(BankError::InvalidField {
                field: "status",
                value: other.to_string(),
            }),
        }
    }

    /// Whether `next` is a legal successor state.
    pub fn can_transition_to(self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Pending, LoanStatus::Approved)
                | (LoanStatus::Pending, LoanStatus::Declined)
                | (LoanStatus::Approved, LoanStatus::Closed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Upi,
    NetBanking,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::NetBanking => "Net Banking",
        }
    }

    pub fn parse(s: &str) -> Result<Self, BankError> {
        match s {
            "UPI" | "upi" => Ok(PaymentMethod::Upi),
            "Net Banking" | "netbanking" | "online" => Ok(PaymentMethod::NetBanking),
            other => Err(BankError::InvalidField {
                field: "method",
                value: other.to_string(),
            }),
        }
    }
}

/// Authenticated identity, constructed by `auth::authenticate` and passed
/// explicitly into every handler. There is no ambient logged-in state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
