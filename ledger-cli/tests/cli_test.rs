//! End-to-end tests for the `ledger` binary
//!
//! Each test runs the real binary against its own data directory.
//!
//! Run with: cargo test -p ledger-cli --test cli_test -- --nocapture

use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn ledger(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ledger"))
        .args(args)
        .env("LEDGER_DIR", dir.path())
        .env_remove("LEDGER_DATABASE_FILE")
        .env_remove("LEDGER_DB_KEY")
        .env_remove("LEDGER_LOG")
        .output()
        .expect("failed to run ledger binary")
}

/// Run a command that must succeed and parse its JSON output
fn ledger_json(dir: &TempDir, args: &[&str]) -> Value {
    let output = ledger(dir, args);
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn exit_code(output: &Output) -> i32 {
    output.status.code().expect("terminated by signal")
}

/// A user with accounts 1001 (balance 500) and 1002 (balance 50)
fn seeded(dir: &TempDir) -> (i64, i64) {
    let user = ledger_json(dir, &["user", "add", "--first", "Ada", "--last", "Lovelace", "--json"]);
    let user_id = user["id"].as_i64().unwrap().to_string();

    let a = ledger_json(
        dir,
        &["account", "open", "--user", &user_id, "--number", "1001", "--name", "A", "--json"],
    );
    let b = ledger_json(
        dir,
        &["account", "open", "--user", &user_id, "--number", "1002", "--name", "B", "--json"],
    );
    let a_id = a["id"].as_i64().unwrap();
    let b_id = b["id"].as_i64().unwrap();

    ledger_json(dir, &["deposit", &a_id.to_string(), "500", "--json"]);
    ledger_json(dir, &["deposit", &b_id.to_string(), "50", "--json"]);
    (a_id, b_id)
}

#[test]
fn test_transfer_scenario_and_exit_codes() {
    let dir = TempDir::new().unwrap();
    let (a_id, _) = seeded(&dir);

    let receipt = ledger_json(
        &dir,
        &["transfer", "--from", "1001", "--to", "1002", "--amount", "100", "--json"],
    );
    assert_eq!(receipt["from_balance"], 400);
    assert_eq!(receipt["to_balance"], 150);
    assert_eq!(receipt["state"], "COMMITTED");

    let overdraft = ledger(&dir, &["withdraw", &a_id.to_string(), "1000"]);
    assert_eq!(exit_code(&overdraft), 5);

    let self_transfer = ledger(
        &dir,
        &["transfer", "--from", "1001", "--to", "1001", "--amount", "50"],
    );
    assert_eq!(exit_code(&self_transfer), 2);

    let account = ledger_json(&dir, &["account", "show", "1001", "--json"]);
    assert_eq!(account["balance"], 400);

    let status = ledger_json(&dir, &["status", "--json"]);
    assert_eq!(status["ledger_total"], 550);
}

#[test]
fn test_not_found_and_conflict_exit_codes() {
    let dir = TempDir::new().unwrap();
    seeded(&dir);

    assert_eq!(exit_code(&ledger(&dir, &["account", "show", "4242"])), 3);
    assert_eq!(exit_code(&ledger(&dir, &["deposit", "4242", "10"])), 3);

    let users = ledger_json(&dir, &["user", "list", "--json"]);
    let user_id = users[0]["id"].as_i64().unwrap().to_string();
    let duplicate = ledger(
        &dir,
        &["account", "open", "--user", &user_id, "--number", "1001", "--name", "Again"],
    );
    assert_eq!(exit_code(&duplicate), 4);
}

#[test]
fn test_invalid_input_exit_codes() {
    let dir = TempDir::new().unwrap();
    let (a_id, _) = seeded(&dir);

    assert_eq!(exit_code(&ledger(&dir, &["deposit", &a_id.to_string(), "0"])), 2);
    assert_eq!(exit_code(&ledger(&dir, &["withdraw", &a_id.to_string(), "-5"])), 2);
    assert_eq!(exit_code(&ledger(&dir, &["account", "show", "12ab"])), 2);
    assert_eq!(
        exit_code(&ledger(&dir, &["account", "show", "1234567890123456789"])),
        2
    );
}

#[test]
fn test_amounts_are_plain_digits() {
    let dir = TempDir::new().unwrap();
    let (a_id, _) = seeded(&dir);
    let a_id = a_id.to_string();

    for amount in ["+5", "12.50", "1,000", "1e3", " 5"] {
        let deposit = ledger(&dir, &["deposit", &a_id, amount]);
        assert_eq!(exit_code(&deposit), 2, "deposit accepted {:?}", amount);
    }
    let transfer = ledger(
        &dir,
        &["transfer", "--from", "1001", "--to", "1002", "--amount", "+5"],
    );
    assert_eq!(exit_code(&transfer), 2);

    let account = ledger_json(&dir, &["account", "show", "1001", "--json"]);
    assert_eq!(account["balance"], 500);
}

#[test]
fn test_user_remove_cascades_and_is_logged() {
    let dir = TempDir::new().unwrap();
    seeded(&dir);

    let users = ledger_json(&dir, &["user", "list", "--json"]);
    let user_id = users[0]["id"].as_i64().unwrap().to_string();

    let removed = ledger_json(&dir, &["user", "remove", &user_id, "--force", "--json"]);
    assert_eq!(removed["accounts_removed"], 2);

    let status = ledger_json(&dir, &["status", "--json"]);
    assert_eq!(status["total_accounts"], 0);

    let doctor = ledger_json(&dir, &["doctor", "--json"]);
    assert_eq!(doctor["summary"]["errors"], 0);

    let logs = ledger_json(&dir, &["logs", "list", "--json"]);
    let commands: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["command"].as_str())
        .collect();
    assert!(commands.contains(&"user"));
    assert!(commands.contains(&"deposit"));
}

#[test]
fn test_failed_command_log_hides_amounts() {
    let dir = TempDir::new().unwrap();
    let (a_id, _) = seeded(&dir);

    ledger(&dir, &["withdraw", &a_id.to_string(), "987654"]);

    let errors = ledger_json(&dir, &["logs", "list", "--errors", "--json"]);
    let entry = &errors[0];
    assert_eq!(entry["command"], "withdraw");
    assert_eq!(entry["error_kind"], "insufficient_funds");
    assert!(!entry.to_string().contains("987654"));
}
