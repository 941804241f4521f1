//! Risk scoring and routing for pending loan applications.
//!
//! Every review cycle trains a fresh two-feature logistic regression on the
//! loans resolved so far (label: approved), scores each pending application,
//! and routes it:
//!
//!   risk <= auto_approve_risk  → approved, remark records the score
//!   risk >= auto_decline_risk  → declined, remark records the score
//!   otherwise                  → held for manual review
//!
//! Because the model is refit from whatever history exists at that moment,
//! the same application can route differently in a later cycle. That is the
//! intended behavior of the product, not an accident.

use crate::{
    config::{BankConfig, TrainingConfig},
    error::{BankError, BankResult},
    store::{BankStore, LoanApplication},
    types::{LoanId, LoanStatus, Session},
};

const N_FEATURES: usize = 2;

/// A fitted logistic regression over standardized [amount, income].
#[derive(Debug, Clone)]
pub struct RiskModel {
    weights: [f64; N_FEATURES],
    bias: f64,
    mean: [f64; N_FEATURES],
    std: [f64; N_FEATURES],
}

#[derive(Debug, Clone, Copy)]
pub struct TrainSample {
    pub amount: f64,
    pub income: f64,
    pub approved: bool,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl RiskModel {
    /// Fit by batch gradient descent. Zero-initialized weights and a fixed
    /// epoch count keep a single fit deterministic for a given training set.
    /// Requires both label classes; one-sided history cannot be fit.
    pub fn train(samples: &[TrainSample], cfg: &TrainingConfig) -> BankResult<Self> {
        let positives = samples.iter().filter(|s| s.approved).count();
        if positives == 0 || positives == samples.len() {
            return Err(BankError::InsufficientTrainingData);
        }

        let n = samples.len() as f64;
        let mut mean = [0.0; N_FEATURES];
        let mut std = [0.0; N_FEATURES];
        for s in samples {
            mean[0] += s.amount;
            mean[1] += s.income;
        }
        mean[0] /= n;
        mean[1] /= n;
        for s in samples {
            std[0] += (s.amount - mean[0]).powi(2);
            std[1] += (s.income - mean[1]).powi(2);
        }
        for v in &mut std {
            *v = (*v / n).sqrt();
            if *v == 0.0 {
                *v = 1.0; // constant feature carries no signal
            }
        }

        let features: Vec<[f64; N_FEATURES]> = samples
            .iter()
            .map(|s| {
                [
                    (s.amount - mean[0]) / std[0],
                    (s.income - mean[1]) / std[1],
                ]
            })
            .collect();

        let mut weights = [0.0; N_FEATURES];
        let mut bias = 0.0;
        for _ in 0..cfg.epochs {
            let mut grad_w = [0.0; N_FEATURES];
            let mut grad_b = 0.0;
            for (x, s) in features.iter().zip(samples) {
                let y = if s.approved { 1.0 } else { 0.0 };
                let err = sigmoid(weights[0] * x[0] + weights[1] * x[1] + bias) - y;
                grad_w[0] += err * x[0];
                grad_w[1] += err * x[1];
                grad_b += err;
            }
            weights[0] -= cfg.learning_rate * grad_w[0] / n;
            weights[1] -= cfg.learning_rate * grad_w[1] / n;
            bias -= cfg.learning_rate * grad_b / n;
        }

        Ok(Self {
            weights,
            bias,
            mean,
            std,
        })
    }

    /// Probability that a loan with these fields would be approved.
    pub fn probability_of_approval(&self, amount: f64, income: f64) -> f64 {
        let x0 = (amount - self.mean[0]) / self.std[0];
        let x1 = (income - self.mean[1]) / self.std[1];
        sigmoid(self.weights[0] * x0 + self.weights[1] * x1 + self.bias)
    }

    /// Risk score on a 0–100 scale, two decimal places. High means risky.
    pub fn risk_score(&self, amount: f64, income: f64) -> f64 {
        round2((1.0 - self.probability_of_approval(amount, income)) * 100.0)
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Where one review cycle routed a pending application.
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    AutoApproved { loan_id: LoanId, risk: f64 },
    AutoDeclined { loan_id: LoanId, risk: f64 },
    NeedsReview { loan: LoanApplication, risk: f64 },
}

/// Train from resolved history, score every pending loan and apply the
/// routing thresholds. Errors with `InsufficientTrainingData` (and touches
/// nothing) when history has only one class.
pub fn run_review_cycle(
    store: &BankStore,
    config: &BankConfig,
    session: &Session,
) -> BankResult<Vec<ReviewOutcome>> {
    if !session.is_admin() {
        return Err(BankError::NotAuthorized);
    }

    let pending = store.loans_with_status(LoanStatus::Pending)?;
    if pending.is_empty() {
        return Ok(Vec::new());
    }

    let samples: Vec<TrainSample> = store
        .resolved_loans()?
        .into_iter()
        .map(|l| TrainSample {
            amount: l.amount,
            income: l.income,
            approved: l.status == LoanStatus::Approved,
        })
        .collect();
    let model = RiskModel::train(&samples, &config.training)?;
    log::info!(
        "review cycle: {} training rows, {} pending",
        samples.len(),
        pending.len()
    );

    let mut outcomes = Vec::with_capacity(pending.len());
    for loan in pending {
        let risk = model.risk_score(loan.amount, loan.income);
        if risk <= config.auto_approve_risk {
            store.transition_loan(
                &loan.loan_id,
                LoanStatus::Approved,
                &format!("Auto-approved with risk {risk}%"),
            )?;
            log::info!("loan {} auto-approved at risk {risk}", loan.loan_id);
            outcomes.push(ReviewOutcome::AutoApproved {
                loan_id: loan.loan_id,
                risk,
            });
        } else if risk >= config.auto_decline_risk {
            store.transition_loan(
                &loan.loan_id,
                LoanStatus::Declined,
                &format!("Auto-declined with risk {risk}%"),
            )?;
            log::info!("loan {} auto-declined at risk {risk}", loan.loan_id);
            outcomes.push(ReviewOutcome::AutoDeclined {
                loan_id: loan.loan_id,
                risk,
            });
        } else {
            outcomes.push(ReviewOutcome::NeedsReview { loan, risk });
        }
    }
    Ok(outcomes)
}

/// Operator decision on a loan the cycle held for manual review.
pub fn decide(
    store: &BankStore,
    session: &Session,
    loan_id: &str,
    approve: bool,
    risk: f64,
) -> BankResult<()> {
    if !session.is_admin() {
        return Err(BankError::NotAuthorized);
    }
    let (status, tag) = if approve {
        (LoanStatus::Approved, "Admin-approved")
    } else {
        (LoanStatus::Declined, "Admin-declined")
    };
    store.transition_loan(loan_id, status, &format!("{tag} with risk {risk}%"))?;
    log::info!("loan {loan_id} {tag} by {}", session.user_id);
    Ok(())
}
