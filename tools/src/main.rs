//! bank-desk: line-oriented operator console for the LoanDesk core.
//!
//! Usage:
//!   bank-desk --db bank.db
//!   bank-desk --db bank.db --config config.json --import-legacy ./data
//!
//! Commands are read one per line from stdin; `help` lists them. A session
//! is held only inside this loop and passed explicitly to every handler.

use anyhow::Result;
use chrono::NaiveDate;
use loandesk_core::{
    analytics,
    auth::{self, Registration},
    config::BankConfig,
    emi, error::BankError, legacy, loan, scoring,
    scoring::ReviewOutcome,
    store::BankStore,
    types::{PaymentMethod, Role, Session},
};
use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = flag_value(&args, "--db").unwrap_or("bank.db");
    let config_path = flag_value(&args, "--config").unwrap_or("config.json");
    let legacy_dir = flag_value(&args, "--import-legacy");

    let store = BankStore::open(db)?;
    store.migrate()?;
    let config = BankConfig::load(Path::new(config_path))?;

    if let Some(dir) = legacy_dir {
        let report = legacy::import_data_dir(&store, &config, Path::new(dir))?;
        println!(
            "imported {} users, {} loans, {} transactions",
            report.users, report.loans, report.transactions
        );
    }

    println!("bank-desk — db: {db} (type 'help')");
    repl(&store, &config)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn repl(store: &BankStore, config: &BankConfig) -> Result<()> {
    let stdin = io::stdin();
    let mut session: Option<Session> = None;
    // Last review cycle's manual queue: loan_id → risk score.
    let mut review_queue: HashMap<String, f64> = HashMap::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts[0] == "quit" || parts[0] == "exit" {
            break;
        }
        match dispatch(store, config, &mut session, &mut review_queue, &parts) {
            Ok(()) => {}
            Err(e) if e.is_rejection() => println!("rejected: {e}"),
            Err(e) => return Err(e.into()),
        }
        io::stdout().flush()?;
    }
    Ok(())
}

fn dispatch(
    store: &BankStore,
    config: &BankConfig,
    session: &mut Option<Session>,
    review_queue: &mut HashMap<String, f64>,
    parts: &[&str],
) -> Result<(), BankError> {
    match parts {
        ["help"] => print_help(),

        // ── Anyone ────────────────────────────────────────────
        ["register", username, password, role, city, mobile] => {
            let s = auth::register(
                store,
                &Registration {
                    username,
                    password,
                    role: Role::parse(role)?,
                    city,
                    mobile,
                },
            )?;
            println!("account created: {} ({})", s.user_id, s.username);
        }
        ["login", username, password] => {
            let s = auth::authenticate(store, username, password)?;
            println!("logged in as {} [{}]", s.username, s.role.as_str());
            *session = Some(s);
        }
        ["logout"] => {
            *session = None;
            println!("logged out");
        }
        ["whoami"] => match session {
            Some(s) => println!("{}", serde_json::to_string_pretty(s)?),
            None => println!("not logged in"),
        },
        ["reset", username, mobile, new_password] => {
            auth::reset_password(store, username, mobile, new_password)?;
            println!("password reset");
        }
        ["emi", principal, rate, months] => {
            let p: f64 = parse(principal, "principal")?;
            let r: f64 = parse(rate, "rate")?;
            let n: u32 = parse(months, "months")?;
            println!("monthly installment: {:.2}", emi::compute_emi(p, r, n)?);
        }

        // ── Logged-in users ───────────────────────────────────
        ["summary"] => {
            let s = need_login(session)?;
            match store.account_for_user(&s.user_id)? {
                Some(a) => println!(
                    "account {} | address {} | mobile {} | balance {:.2}",
                    a.account_no, a.address, a.mobile, a.balance
                ),
                None => println!("no account on file"),
            }
        }
        ["apply", amount, purpose, income] => {
            let s = need_login(session)?;
            let l = loan::submit(
                store,
                config,
                s,
                parse(amount, "amount")?,
                purpose,
                parse(income, "income")?,
            )?;
            println!("loan application submitted: {}", l.loan_id);
        }
        ["loans"] => {
            let s = need_login(session)?;
            for l in loan::my_loans(store, s)? {
                println!(
                    "{} {:>10.2} {:<9} {} — {}",
                    l.loan_id,
                    l.amount,
                    l.status.as_str(),
                    l.application_date,
                    l.remarks
                );
            }
        }
        ["transactions"] => {
            let s = need_login(session)?;
            for t in store.transactions_for_user(&s.user_id)? {
                println!(
                    "{} {:>10.2} {:<12} loan {}",
                    t.date,
                    t.amount,
                    t.method.as_str(),
                    t.loan_id.as_deref().unwrap_or("-")
                );
            }
        }
        ["due", loan_id] => {
            let s = need_login(session)?;
            let r = emi::repayment_status(store, s, loan_id)?;
            println!(
                "{}: EMI {:.2}, paid {}/{}, remaining {}",
                loan_id, r.emi, r.paid, r.loan.tenure_months, r.remaining
            );
        }
        ["pay", loan_id, method] => {
            let s = need_login(session)?;
            let t = emi::pay(store, s, loan_id, PaymentMethod::parse(method)?)?;
            println!("paid {:.2} via {}", t.amount, t.method.as_str());
        }

        // ── Admin ─────────────────────────────────────────────
        ["review"] => {
            let s = need_login(session)?;
            review_queue.clear();
            for outcome in scoring::run_review_cycle(store, config, s)? {
                match outcome {
                    ReviewOutcome::AutoApproved { loan_id, risk } => {
                        println!("{loan_id}: auto-approved (risk {risk}%)")
                    }
                    ReviewOutcome::AutoDeclined { loan_id, risk } => {
                        println!("{loan_id}: auto-declined (risk {risk}%)")
                    }
                    ReviewOutcome::NeedsReview { loan, risk } => {
                        println!(
                            "{}: manual review (risk {risk}%) — {} amount {:.2} income {:.2}",
                            loan.loan_id, loan.user_id, loan.amount, loan.income
                        );
                        review_queue.insert(loan.loan_id, risk);
                    }
                }
            }
            if review_queue.is_empty() {
                println!("manual queue empty");
            }
        }
        ["approve", loan_id] | ["decline", loan_id] => {
            let s = need_login(session)?;
            let approve = parts[0] == "approve";
            let risk = review_queue
                .get(*loan_id)
                .copied()
                .ok_or_else(|| BankError::LoanNotFound(format!("{loan_id} (run 'review' first)")))?;
            scoring::decide(store, s, loan_id, approve, risk)?;
            review_queue.remove(*loan_id);
            println!("{loan_id}: {}", if approve { "approved" } else { "declined" });
        }
        ["all"] => {
            let s = need_login(session)?;
            for l in loan::all_loans(store, s)? {
                println!(
                    "{} {} {:>10.2} {:<9} {}",
                    l.loan_id,
                    l.user_id,
                    l.amount,
                    l.status.as_str(),
                    l.remarks
                );
            }
        }
        ["counts"] => {
            let s = need_login(session)?;
            let c = analytics::loan_counts(store, s)?;
            println!(
                "pending {} | approved {} | declined {} | closed {} | total {}",
                c.pending, c.approved, c.declined, c.closed, c.total()
            );
            println!("disbursed: {:.2}", analytics::total_disbursed(store, s)?);
        }
        ["range", from, to] => {
            let s = need_login(session)?;
            for l in analytics::applications_between(store, s, date(from)?, date(to)?)? {
                println!("{} {} {:.2} {}", l.application_date, l.loan_id, l.amount, l.status.as_str());
            }
        }
        ["export", from, to, path] => {
            let s = need_login(session)?;
            let loans = analytics::applications_between(store, s, date(from)?, date(to)?)?;
            analytics::export_loans_csv(s, &loans, Path::new(path))?;
            println!("wrote {} rows to {path}", loans.len());
        }
        ["lookup", username] => {
            let s = need_login(session)?;
            let (user, account) = analytics::lookup_user(store, s, username)?;
            println!("{} {} [{}]", user.user_id, user.username, user.role.as_str());
            if let Some(a) = account {
                println!("  account {} mobile {} balance {:.2}", a.account_no, a.mobile, a.balance);
            }
        }

        other => {
            log::warn!("unknown command: {}", other.join(" "));
            println!("unknown command (type 'help')");
        }
    }
    Ok(())
}

fn need_login<'a>(session: &'a Option<Session>) -> Result<&'a Session, BankError> {
    session.as_ref().ok_or(BankError::NotLoggedIn)
}

fn parse<T: std::str::FromStr>(raw: &str, field: &'static str) -> Result<T, BankError> {
    raw.parse().map_err(|_| BankError::InvalidField {
        field,
        value: raw.to_string(),
    })
}

fn date(raw: &str) -> Result<NaiveDate, BankError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| BankError::InvalidField {
        field: "date",
        value: raw.to_string(),
    })
}

fn print_help() {
    println!(
        "\
  register <user> <pass> <user|admin> <city> <mobile>
  login <user> <pass> | logout | whoami
  reset <user> <mobile> <newpass>
  emi <principal> <annual-rate-pct> <months>
  summary | loans | transactions
  apply <amount> <purpose> <income>
  due <loan-id> | pay <loan-id> <upi|netbanking>
  admin: review | approve <loan-id> | decline <loan-id>
  admin: all | counts | range <from> <to> | export <from> <to> <path>
  admin: lookup <username>
  quit"
    );
}
