//! LoanDesk core — accounts, loan review and repayment for a small bank.
//!
//! RULES:
//!   - Only the store modules execute SQL.
//!   - Handlers take an explicit `Session`; there is no ambient login state.
//!   - Domain rejections are typed errors the console prints inline;
//!     storage faults propagate.

pub mod analytics;
pub mod auth;
pub mod config;
pub mod csv_table;
pub mod emi;
pub mod error;
pub mod legacy;
pub mod loan;
pub mod scoring;
pub mod store;
pub mod types;
