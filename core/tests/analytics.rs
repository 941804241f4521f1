//! Admin analytics: counts, date filters, CSV export, user lookup.

use chrono::NaiveDate;
use loandesk_core::{
    analytics,
    auth::{self, Registration},
    config::BankConfig,
    csv_table,
    error::BankError,
    loan,
    store::BankStore,
    types::{LoanStatus, Role, Session},
};

fn setup() -> (BankStore, BankConfig, Session, Session) {
    let store = BankStore::in_memory().unwrap();
    store.migrate().unwrap();
    let user = auth::register(
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
    let admin = auth::register(
        &store,
        &Registration {
            username: "boss",
            password: "pw",
            role: Role::Admin,
            city: "Pune",
            mobile: "9000000002",
        },
    )
    .unwrap();
    (store, BankConfig::default(), user, admin)
}

#[test]
fn counts_track_statuses() {
    let (store, cfg, user, admin) = setup();
    let a = loan::submit(&store, &cfg, &user, 5000.0, "bike", 2000.0).unwrap();
    let b = loan::submit(&store, &cfg, &user, 9000.0, "sofa", 2000.0).unwrap();
    loan::submit(&store, &cfg, &user, 7000.0, "tv", 2000.0).unwrap();
    store
        .transition_loan(&a.loan_id, LoanStatus::Approved, "seed")
        .unwrap();
    store
        .transition_loan(&b.loan_id, LoanStatus::Declined, "seed")
        .unwrap();

    let counts = analytics::loan_counts(&store, &admin).unwrap();
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.approved, 1);
    assert_eq!(counts.declined, 1);
    assert_eq!(counts.closed, 0);
    assert_eq!(counts.total(), 3);

    let disbursed = analytics::total_disbursed(&store, &admin).unwrap();
    assert_eq!(disbursed, 5000.0);
}

#[test]
fn analytics_are_admin_only() {
    let (store, _cfg, user, _admin) = setup();
    assert!(matches!(
        analytics::loan_counts(&store, &user),
        Err(BankError::NotAuthorized)
    ));
    assert!(matches!(
        analytics::lookup_user(&store, &user, "boss"),
        Err(BankError::NotAuthorized)
    ));
}

#[test]
fn date_range_filters_applications() {
    let (store, cfg, user, admin) = setup();
    loan::submit(&store, &cfg, &user, 5000.0, "bike", 2000.0).unwrap();

    let today = chrono::Local::now().date_naive();
    let hits = analytics::applications_between(&store, &admin, today, today).unwrap();
    assert_eq!(hits.len(), 1);

    let long_ago = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
    let misses =
        analytics::applications_between(&store, &admin, long_ago, long_ago).unwrap();
    assert!(misses.is_empty());
}

#[test]
fn export_writes_legacy_layout() {
    let (store, cfg, user, admin) = setup();
    loan::submit(&store, &cfg, &user, 5000.0, "bike", 2000.0).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.csv");
    let loans = store.all_loans().unwrap();
    analytics::export_loans_csv(&admin, &loans, &path).unwrap();

    let table = csv_table::load(&path, csv_table::LOANS);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.get(0, "loan_id"), "L0001");
    assert_eq!(table.get(0, "status"), "pending");
    assert_eq!(table.get(0, "remarks"), "Awaiting review");
}

#[test]
fn lookup_returns_user_and_account() {
    let (store, _cfg, user, admin) = setup();
    let (found, account) = analytics::lookup_user(&store, &admin, "asha").unwrap();
    assert_eq!(found.user_id, user.user_id);
    assert_eq!(account.unwrap().mobile, "9000000001");

    assert!(matches!(
        analytics::lookup_user(&store, &admin, "ghost"),
        Err(BankError::UserNotFound(_))
    ));
}
