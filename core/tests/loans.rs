//! Loan application workflow tests.

use loandesk_core::{
    auth::{self, Registration},
    config::BankConfig,
    error::BankError,
    loan,
    store::BankStore,
    types::{LoanStatus, Role, Session},
};

fn setup() -> (BankStore, BankConfig) {
    let store = BankStore::in_memory().unwrap();
    store.migrate().unwrap();
    (store, BankConfig::default())
}

fn user(store: &BankStore, username: &str, role: Role) -> Session {
    auth::register(
        store,
        &Registration {
            username,
            password: "pw",
            role,
            city: "Pune",
            mobile: "9000000001",
        },
    )
    .unwrap()
}

#[test]
fn submission_enters_review_queue() {
    let (store, cfg) = setup();
    let session = user(&store, "asha", Role::User);

    let loan = loan::submit(&store, &cfg, &session, 25_000.0, "laptop", 1800.0).unwrap();
    assert_eq!(loan.loan_id, "L0001");
    assert_eq!(loan.status, LoanStatus::Pending);
    assert_eq!(loan.remarks, "Awaiting review");
    assert_eq!(loan.tenure_months, cfg.default_tenure_months);

    let stored = store.loan_by_id("L0001").unwrap().unwrap();
    assert_eq!(stored.status, LoanStatus::Pending);
    assert_eq!(stored.amount, 25_000.0);
}

#[test]
fn amount_below_minimum_rejected() {
    let (store, cfg) = setup();
    let session = user(&store, "asha", Role::User);

    let err = loan::submit(&store, &cfg, &session, 999.0, "snacks", 1800.0).unwrap_err();
    assert!(matches!(err, BankError::AmountBelowMinimum { .. }));
    assert!(store.all_loans().unwrap().is_empty());
}

#[test]
fn negative_income_rejected() {
    let (store, cfg) = setup();
    let session = user(&store, "asha", Role::User);
    assert!(matches!(
        loan::submit(&store, &cfg, &session, 5000.0, "bike", -1.0),
        Err(BankError::NegativeIncome(_))
    ));
}

#[test]
fn users_see_only_their_own_loans() {
    let (store, cfg) = setup();
    let asha = user(&store, "asha", Role::User);
    let binod = user(&store, "binod", Role::User);

    loan::submit(&store, &cfg, &asha, 5000.0, "bike", 1500.0).unwrap();
    loan::submit(&store, &cfg, &binod, 9000.0, "fridge", 2100.0).unwrap();

    let mine = loan::my_loans(&store, &asha).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].user_id, asha.user_id);
}

#[test]
fn listing_everything_needs_admin() {
    let (store, cfg) = setup();
    let asha = user(&store, "asha", Role::User);
    let admin = user(&store, "boss", Role::Admin);

    loan::submit(&store, &cfg, &asha, 5000.0, "bike", 1500.0).unwrap();

    assert!(matches!(
        loan::all_loans(&store, &asha),
        Err(BankError::NotAuthorized)
    ));
    assert_eq!(loan::all_loans(&store, &admin).unwrap().len(), 1);
}

#[test]
fn loan_ids_come_from_the_persisted_counter() {
    let (store, cfg) = setup();
    let session = user(&store, "asha", Role::User);

    loan::submit(&store, &cfg, &session, 5000.0, "bike", 1500.0).unwrap();
    loan::submit(&store, &cfg, &session, 6000.0, "sofa", 1500.0).unwrap();

    let next = loan::submit(&store, &cfg, &session, 7000.0, "tv", 1500.0).unwrap();
    assert_eq!(next.loan_id, "L0003");
}
