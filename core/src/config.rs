//! Bank-wide configuration, loaded from a JSON file.
//!
//! Every field has a default so a missing config file is not an error; the
//! console can run against an empty data directory out of the box.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Smallest loan amount a user may apply for.
    pub min_loan_amount: f64,
    /// Risk score at or below which a pending loan auto-approves.
    pub auto_approve_risk: f64,
    /// Risk score at or above which a pending loan auto-declines.
    pub auto_decline_risk: f64,
    /// Annual interest rate applied to new loans, percent.
    pub default_interest_rate_pct: f64,
    /// Repayment tenure applied to new loans, months.
    pub default_tenure_months: u32,
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub epochs: u32,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            min_loan_amount: 1000.0,
            auto_approve_risk: 39.0,
            auto_decline_risk: 61.0,
            default_interest_rate_pct: 10.0,
            default_tenure_months: 12,
            training: TrainingConfig::default(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 500,
        }
    }
}

impl BankConfig {
    /// Load from a JSON file; absent file falls back to defaults.
    pub fn load(path: &Path) -> crate::error::BankResult<Self> {
        if !path.exists() {
            log::info!("config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = BankConfig::default();
        assert!(cfg.auto_approve_risk < cfg.auto_decline_risk);
        assert!(cfg.min_loan_amount > 0.0);
        assert!(cfg.training.epochs > 0);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: BankConfig = serde_json::from_str(r#"{"min_loan_amount": 500.0}"#).unwrap();
        assert_eq!(cfg.min_loan_amount, 500.0);
        assert_eq!(cfg.default_tenure_months, 12);
    }
}
