#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, TimeZone, Utc};
use repairtimer::models::Ticket;
use repairtimer::store::SqliteTicketStore;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rtm() -> Command {
    cargo_bin_cmd!("repairtimer")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_repairtimer.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Unique local timer state file, removed if left over from a previous run
pub fn setup_state(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_active_timer.json", name));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
}

/// Store with tickets T1..T5, a privileged `admin` and a standard `tech`.
pub fn seeded_store(db_path: &str) -> SqliteTicketStore {
    let store = SqliteTicketStore::open(db_path).expect("open store");
    for (i, id) in ["T1", "T2", "T3", "T4", "T5"].iter().enumerate() {
        store
            .add_ticket(&Ticket {
                id: id.to_string(),
                ticket_number: Some(format!("10{}", i + 1)),
                customer_name: Some(format!("Customer {}", i + 1)),
            })
            .expect("add ticket");
    }
    store.add_user("admin", true).expect("add admin");
    store.add_user("tech", false).expect("add tech");
    store
}

/// Initialize DB through the CLI and register tickets T1/T2 plus an admin.
pub fn init_cli_db(db_path: &str) {
    rtm()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    for (id, number, customer) in [("T1", "1001", "Ada"), ("T2", "1002", "Grace")] {
        rtm()
            .args([
                "--db",
                db_path,
                "ticket",
                "add",
                id,
                "--number",
                number,
                "--customer",
                customer,
            ])
            .assert()
            .success();
    }

    rtm()
        .args(["--db", db_path, "user", "add", "admin", "--privileged"])
        .assert()
        .success();
}
