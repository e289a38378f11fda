//! Transfer atomicity under injected storage failures
//!
//! `FlakyStore` wraps the real DuckDB store and makes one leg of a transfer
//! fail inside the unit of work, the way a dropped connection or a failed
//! write would. Whatever already happened in that unit must be rolled back.
//!
//! Run with: cargo test --test transfer_atomicity_test -- --nocapture

use std::cell::Cell;
use std::sync::Arc;

use ledger_core::adapters::DuckDbStore;
use ledger_core::domain::result::Result;
use ledger_core::ports::{AccountStore, BalanceWriter, UserDirectory};
use ledger_core::services::TransferEngine;
use ledger_core::{Account, AccountNumber, Error, ErrorKind, TransferIntent, UserName};

// ============================================================================
// Fault-injecting store
// ============================================================================

/// Delegates to DuckDB, failing the Nth balance change inside `atomically`
struct FlakyStore {
    inner: Arc<DuckDbStore>,
    fail_on_call: usize,
}

struct FlakyWriter<'a> {
    inner: &'a dyn BalanceWriter,
    calls: Cell<usize>,
    fail_on_call: usize,
}

impl BalanceWriter for FlakyWriter<'_> {
    fn adjust_balance(&self, account_id: i64, delta: i64) -> Result<i64> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if call == self.fail_on_call {
            return Err(Error::storage("injected failure: connection lost"));
        }
        self.inner.adjust_balance(account_id, delta)
    }
}

impl AccountStore for FlakyStore {
    fn create_account(
        &self,
        user_id: i64,
        account_number: AccountNumber,
        name: &str,
    ) -> Result<Account> {
        self.inner.create_account(user_id, account_number, name)
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        self.inner.list_accounts()
    }

    fn list_accounts_by_user(&self, user_id: i64) -> Result<Vec<Account>> {
        self.inner.list_accounts_by_user(user_id)
    }

    fn get_account_by_id(&self, id: i64) -> Result<Account> {
        self.inner.get_account_by_id(id)
    }

    fn get_account_by_number(&self, account_number: AccountNumber) -> Result<Account> {
        self.inner.get_account_by_number(account_number)
    }

    fn delete_account(&self, id: i64) -> Result<()> {
        self.inner.delete_account(id)
    }

    fn delete_accounts_by_user(&self, user_id: i64) -> Result<usize> {
        self.inner.delete_accounts_by_user(user_id)
    }

    fn adjust_balance(&self, account_id: i64, delta: i64) -> Result<i64> {
        self.inner.adjust_balance(account_id, delta)
    }

    fn atomically(&self, work: &mut dyn FnMut(&dyn BalanceWriter) -> Result<()>) -> Result<()> {
        self.inner.atomically(&mut |writer: &dyn BalanceWriter| {
            let flaky = FlakyWriter {
                inner: writer,
                calls: Cell::new(0),
                fail_on_call: self.fail_on_call,
            };
            work(&flaky)
        })
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

struct Fixture {
    store: Arc<DuckDbStore>,
    a: Account,
    b: Account,
}

/// A=500, B=50 on a fresh in-memory store
fn fixture() -> Fixture {
    let store = Arc::new(DuckDbStore::open_in_memory().unwrap());
    store.ensure_schema().unwrap();
    let user = store
        .create_user(&UserName::new("Ada", "Lovelace").unwrap())
        .unwrap();
    let a = store
        .create_account(user.id, AccountNumber::new(1).unwrap(), "A")
        .unwrap();
    let b = store
        .create_account(user.id, AccountNumber::new(2).unwrap(), "B")
        .unwrap();
    store.adjust_balance(a.id, 500).unwrap();
    store.adjust_balance(b.id, 50).unwrap();
    Fixture { store, a, b }
}

fn flaky_engine(store: &Arc<DuckDbStore>, fail_on_call: usize) -> TransferEngine {
    TransferEngine::new(Arc::new(FlakyStore {
        inner: Arc::clone(store),
        fail_on_call,
    }))
}

fn balances(f: &Fixture) -> (i64, i64) {
    (
        f.store.get_account_by_id(f.a.id).unwrap().balance,
        f.store.get_account_by_id(f.b.id).unwrap().balance,
    )
}

// ============================================================================
// Atomicity
// ============================================================================

#[test]
fn test_failure_after_debit_rolls_back_debit() {
    let f = fixture();
    let engine = flaky_engine(&f.store, 2);

    let err = engine
        .transfer(f.a.account_number, f.b.account_number, 100)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(balances(&f), (500, 50));
}

#[test]
fn test_failure_on_debit_changes_nothing() {
    let f = fixture();
    let engine = flaky_engine(&f.store, 1);

    let err = engine
        .transfer(f.a.account_number, f.b.account_number, 100)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(balances(&f), (500, 50));
}

#[test]
fn test_store_usable_after_rolled_back_transfer() {
    let f = fixture();

    flaky_engine(&f.store, 2)
        .transfer(f.a.account_number, f.b.account_number, 100)
        .unwrap_err();

    // The connection is not left inside an open transaction
    let engine = TransferEngine::new(f.store.clone());
    let intent = TransferIntent::new(f.a.account_number, f.b.account_number, 100).unwrap();
    let receipt = engine.execute(&intent).unwrap();
    assert_eq!((receipt.from_balance, receipt.to_balance), (400, 150));
    assert_eq!(balances(&f), (400, 150));
}

#[test]
fn test_unreached_failure_commits_normally() {
    let f = fixture();
    // A transfer makes two balance changes; a third never happens
    let engine = flaky_engine(&f.store, 3);

    engine
        .transfer(f.a.account_number, f.b.account_number, 100)
        .unwrap();
    assert_eq!(balances(&f), (400, 150));
}

#[test]
fn test_error_is_returned_unchanged() {
    let f = fixture();
    let engine = flaky_engine(&f.store, 2);

    match engine.transfer(f.a.account_number, f.b.account_number, 100) {
        Err(Error::Storage(message)) => assert!(message.contains("injected failure")),
        other => panic!("expected storage error, got {:?}", other),
    }
}
