//! Repayment ledger tests: paying installments, closure, idempotence.

use loandesk_core::{
    auth::{self, Registration},
    config::BankConfig,
    emi, loan,
    error::BankError,
    store::BankStore,
    types::{LoanStatus, PaymentMethod, Role, Session},
};

/// Short tenure keeps these tests to a couple of payments.
fn setup() -> (BankStore, BankConfig, Session) {
    let store = BankStore::in_memory().unwrap();
    store.migrate().unwrap();
    let cfg = BankConfig {
        default_tenure_months: 2,
        ..BankConfig::default()
    };
    let session = auth::register(
        &store,
        &Registration {
            username: "asha",
            password: "pw",
            role: Role::User,
            city: "Pune",
            mobile: "9000000001",
        },
    )
    .unwrap();
    (store, cfg, session)
}

fn approved_loan(store: &BankStore, cfg: &BankConfig, session: &Session) -> String {
    let loan = loan::submit(store, cfg, session, 12_000.0, "bike", 2000.0).unwrap();
    store
        .transition_loan(&loan.loan_id, LoanStatus::Approved, "test approval")
        .unwrap();
    loan.loan_id
}

#[test]
fn each_payment_is_one_emi() {
    let (store, cfg, session) = setup();
    let loan_id = approved_loan(&store, &cfg, &session);

    let txn = emi::pay(&store, &session, &loan_id, PaymentMethod::Upi).unwrap();
    let expected = emi::compute_emi(12_000.0, cfg.default_interest_rate_pct, 2).unwrap();
    assert!((txn.amount - expected).abs() < 1e-9);
    assert_eq!(txn.loan_id.as_deref(), Some(loan_id.as_str()));

    let status = emi::repayment_status(&store, &session, &loan_id).unwrap();
    assert_eq!(status.paid, 1);
    assert_eq!(status.remaining, 1);
}

#[test]
fn final_payment_closes_the_loan_exactly_once() {
    let (store, cfg, session) = setup();
    let loan_id = approved_loan(&store, &cfg, &session);

    emi::pay(&store, &session, &loan_id, PaymentMethod::Upi).unwrap();
    emi::pay(&store, &session, &loan_id, PaymentMethod::NetBanking).unwrap();

    let closed = store.loan_by_id(&loan_id).unwrap().unwrap();
    assert_eq!(closed.status, LoanStatus::Closed);
    assert!(closed.remarks.starts_with("Loan fully repaid on"));
    let closure_remark = closed.remarks.clone();

    // Paying a closed loan is a visible rejection and mutates nothing.
    let err = emi::pay(&store, &session, &loan_id, PaymentMethod::Upi).unwrap_err();
    assert!(matches!(err, BankError::NothingDue(_)));
    assert!(err.is_rejection());

    let after = store.loan_by_id(&loan_id).unwrap().unwrap();
    assert_eq!(after.status, LoanStatus::Closed);
    assert_eq!(after.remarks, closure_remark, "no duplicate closure remark");
    assert_eq!(store.paid_count(&session.user_id, &loan_id).unwrap(), 2);
}

#[test]
fn pending_loan_cannot_be_paid() {
    let (store, cfg, session) = setup();
    let pending = loan::submit(&store, &cfg, &session, 12_000.0, "bike", 2000.0).unwrap();

    assert!(matches!(
        emi::pay(&store, &session, &pending.loan_id, PaymentMethod::Upi),
        Err(BankError::WrongStatus { .. })
    ));
    assert_eq!(
        store.paid_count(&session.user_id, &pending.loan_id).unwrap(),
        0
    );
}

#[test]
fn repayment_status_counts_down() {
    let (store, cfg, session) = setup();
    let loan_id = approved_loan(&store, &cfg, &session);

    let before = emi::repayment_status(&store, &session, &loan_id).unwrap();
    assert_eq!((before.paid, before.remaining), (0, 2));

    emi::pay(&store, &session, &loan_id, PaymentMethod::Upi).unwrap();
    let after = emi::repayment_status(&store, &session, &loan_id).unwrap();
    assert_eq!((after.paid, after.remaining), (1, 1));
}

#[test]
fn payments_show_up_in_transaction_history() {
    let (store, cfg, session) = setup();
    let loan_id = approved_loan(&store, &cfg, &session);
    emi::pay(&store, &session, &loan_id, PaymentMethod::Upi).unwrap();

    let history = store.transactions_for_user(&session.user_id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].method, PaymentMethod::Upi);
}

#[test]
fn strangers_cannot_see_or_pay_someone_elses_loan() {
    let (store, cfg, session) = setup();
    let loan_id = approved_loan(&store, &cfg, &session);

    let other = auth::register(
        &store,
        &Registration {
            username: "binod",
            password: "pw",
            role: Role::User,
            city: "Pune",
            mobile: "9000000002",
        },
    )
    .unwrap();

    assert!(matches!(
        emi::pay(&store, &other, &loan_id, PaymentMethod::Upi),
        Err(BankError::LoanNotFound(_))
    ));
}
