//! DuckDB store implementation
//!
//! One connection per store, guarded by a mutex. Every balance change runs
//! inside a DuckDB transaction while the guard is held, so read-modify-write
//! on an account is serialized and a failed unit of work rolls back before
//! the guard is released.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use duckdb::{params, Connection};
use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountNumber, User, UserName};
use crate::migrations::MIGRATIONS;
use crate::ports::{AccountStore, BalanceWriter, UserDirectory};
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of attempts when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const ACCOUNT_COLUMNS: &str = "id, user_id, account_number, name, balance, created_at, updated_at";

const USER_COLUMNS: &str = "id, first_name, last_name, created_at, updated_at";

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
        || lower.contains("file is already open")
}

/// Call `open` until it succeeds, backing off while the file is locked.
/// Errors that are not about locking are returned immediately.
fn open_with_retry<T, E: fmt::Display>(
    mut open: impl FnMut() -> std::result::Result<T, E>,
) -> std::result::Result<T, E> {
    let mut attempt = 0;
    loop {
        match open() {
            Ok(value) => return Ok(value),
            Err(e) => {
                let err_msg = e.to_string();
                attempt += 1;
                if !is_retryable_error(&err_msg) || attempt >= MAX_RETRIES {
                    return Err(e);
                }
                let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt - 1));
                warn!(
                    attempt,
                    max_attempts = MAX_RETRIES,
                    delay_ms = delay.as_millis() as u64,
                    error = %err_msg,
                    "database busy, retrying"
                );
                thread::sleep(delay);
            }
        }
    }
}

/// Escape text for use inside a single-quoted SQL literal
fn sql_literal(text: &str) -> String {
    text.replace('\'', "''")
}

fn is_unique_violation(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("duplicate key") || lower.contains("unique constraint")
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

/// Treat "no rows" as absence rather than failure
fn optional<T>(result: duckdb::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// DuckDB-backed account store and user directory
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbStore {
    /// Open (or create) a database file
    ///
    /// For encrypted databases, uses DuckDB's ATTACH with ENCRYPTION_KEY.
    /// Retries with exponential backoff while another process holds the file.
    pub fn new(db_path: &Path, encryption_key: Option<&str>) -> Result<Self> {
        let conn = open_with_retry(|| Self::try_open_connection(db_path, encryption_key))?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        })
    }

    fn try_open_connection(
        db_path: &Path,
        encryption_key: Option<&str>,
    ) -> duckdb::Result<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        match encryption_key {
            Some(key) => {
                let conn = Connection::open_in_memory_with_flags(config)?;
                conn.execute(
                    &format!(
                        "ATTACH '{}' AS ledger_db (ENCRYPTION_KEY '{}')",
                        sql_literal(&db_path.to_string_lossy()),
                        sql_literal(key)
                    ),
                    [],
                )?;
                conn.execute("USE ledger_db", [])?;
                Ok(conn)
            }
            None => Connection::open_with_flags(db_path, config),
        }
    }

    /// Path of the backing file, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::storage(format!("connection lock poisoned: {}", e)))
    }

    /// Run pending migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        let result = self.run_migrations()?;
        if !result.applied.is_empty() {
            debug!(applied = ?result.applied, "schema migrated");
        }
        Ok(())
    }

    // === Integrity checks ===

    /// Accounts whose balance is below zero, as (account id, balance)
    pub fn find_negative_balances(&self) -> Result<Vec<(i64, i64)>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, balance FROM accounts WHERE balance < 0 ORDER BY id")?;
        let rows = stmt.query_map(params![], |row| Ok((row.get(0)?, row.get(1)?)))?;
        collect_rows(rows)
    }

    /// Accounts pointing at a user that does not exist, as (account id, user id)
    pub fn find_orphaned_accounts(&self) -> Result<Vec<(i64, i64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT a.id, a.user_id FROM accounts a
             LEFT JOIN users u ON u.id = a.user_id
             WHERE u.id IS NULL
             ORDER BY a.id",
        )?;
        let rows = stmt.query_map(params![], |row| Ok((row.get(0)?, row.get(1)?)))?;
        collect_rows(rows)
    }

    /// Account numbers held by more than one row, as (number, count)
    pub fn find_duplicate_account_numbers(&self) -> Result<Vec<(i64, i64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT account_number, COUNT(*) FROM accounts
             GROUP BY account_number HAVING COUNT(*) > 1
             ORDER BY account_number",
        )?;
        let rows = stmt.query_map(params![], |row| Ok((row.get(0)?, row.get(1)?)))?;
        collect_rows(rows)
    }
}

fn collect_rows<T, I>(rows: I) -> Result<Vec<T>>
where
    I: Iterator<Item = duckdb::Result<T>>,
{
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::storage(format!("corrupt timestamp {:?}: {}", s, e)))
}

/// Raw `accounts` row before domain validation
struct AccountRow {
    id: i64,
    user_id: i64,
    account_number: i64,
    name: String,
    balance: i64,
    created_at: String,
    updated_at: String,
}

impl AccountRow {
    fn from_row(row: &duckdb::Row) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            account_number: row.get(2)?,
            name: row.get(3)?,
            balance: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_account(self) -> Result<Account> {
        let account_number = AccountNumber::new(self.account_number).map_err(|_| {
            Error::storage(format!(
                "account {} holds an out-of-range account number {}",
                self.id, self.account_number
            ))
        })?;
        Ok(Account {
            id: self.id,
            user_id: self.user_id,
            account_number,
            name: self.name,
            balance: self.balance,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn select_accounts<P: duckdb::Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Vec<Account>> {
    let sql = format!("SELECT {} FROM accounts {} ORDER BY id", ACCOUNT_COLUMNS, filter);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, AccountRow::from_row)?;
    let mut accounts = Vec::new();
    for row in rows {
        accounts.push(row?.into_account()?);
    }
    Ok(accounts)
}

fn row_to_user(row: &duckdb::Row) -> duckdb::Result<(i64, String, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn select_users<P: duckdb::Params>(conn: &Connection, filter: &str, params: P) -> Result<Vec<User>> {
    let sql = format!("SELECT {} FROM users {} ORDER BY id", USER_COLUMNS, filter);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, row_to_user)?;
    let mut users = Vec::new();
    for row in rows {
        let (id, first_name, last_name, created_at, updated_at) = row?;
        users.push(User {
            id,
            first_name,
            last_name,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        });
    }
    Ok(users)
}

/// The single read-modify-write primitive behind every balance change.
///
/// Must run inside an open transaction on a connection the caller holds
/// exclusively. The update is a compare-and-set on the balance that was read,
/// so a lost update surfaces as a storage error instead of a wrong balance.
fn adjust_balance_in(conn: &Connection, account_id: i64, delta: i64) -> Result<i64> {
    let current: i64 = optional(conn.query_row(
        "SELECT balance FROM accounts WHERE id = ?",
        params![account_id],
        |row| row.get(0),
    ))?
    .ok_or_else(|| Error::not_found(format!("account {}", account_id)))?;

    let new_balance = current
        .checked_add(delta)
        .ok_or_else(|| Error::validation(format!("balance overflow on account {}", account_id)))?;

    if new_balance < 0 {
        debug!(account_id, "debit rejected: insufficient funds");
        return Err(Error::InsufficientFunds {
            account_id,
            balance: current,
            requested: delta.checked_neg().unwrap_or(i64::MAX),
        });
    }

    let updated = conn.execute(
        "UPDATE accounts SET balance = ?, updated_at = ? WHERE id = ? AND balance = ?",
        params![new_balance, now(), account_id, current],
    )?;
    if updated != 1 {
        return Err(Error::storage(format!(
            "balance of account {} changed during update",
            account_id
        )));
    }

    Ok(new_balance)
}

/// Balance writer bound to one open transaction
struct TxWriter<'a> {
    conn: &'a Connection,
}

impl BalanceWriter for TxWriter<'_> {
    fn adjust_balance(&self, account_id: i64, delta: i64) -> Result<i64> {
        adjust_balance_in(self.conn, account_id, delta)
    }
}

impl AccountStore for DuckDbStore {
    fn create_account(
        &self,
        user_id: i64,
        account_number: AccountNumber,
        name: &str,
    ) -> Result<Account> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        // Owner check and insert share one transaction
        let owner: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        if owner == 0 {
            return Err(Error::not_found(format!("user {}", user_id)));
        }

        let taken: i64 = tx.query_row(
            "SELECT COUNT(*) FROM accounts WHERE account_number = ?",
            params![account_number.value()],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Err(Error::conflict(format!(
                "account number {} already exists",
                account_number
            )));
        }

        let id: i64 = tx.query_row("SELECT nextval('seq_account_id')", params![], |row| {
            row.get(0)
        })?;
        let timestamp = now();
        tx.execute(
            "INSERT INTO accounts (id, user_id, account_number, name, balance, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
            params![id, user_id, account_number.value(), name, timestamp, timestamp],
        )
        .map_err(|e| {
            if is_unique_violation(&e.to_string()) {
                Error::conflict(format!("account number {} already exists", account_number))
            } else {
                e.into()
            }
        })?;
        tx.commit()?;

        let created_at = parse_timestamp(&timestamp)?;
        Ok(Account {
            id,
            user_id,
            account_number,
            name: name.to_string(),
            balance: 0,
            created_at,
            updated_at: created_at,
        })
    }

    fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.lock()?;
        select_accounts(&conn, "", params![])
    }

    fn list_accounts_by_user(&self, user_id: i64) -> Result<Vec<Account>> {
        let conn = self.lock()?;
        select_accounts(&conn, "WHERE user_id = ?", params![user_id])
    }

    fn get_account_by_id(&self, id: i64) -> Result<Account> {
        let conn = self.lock()?;
        select_accounts(&conn, "WHERE id = ?", params![id])?
            .pop()
            .ok_or_else(|| Error::not_found(format!("account {}", id)))
    }

    fn get_account_by_number(&self, account_number: AccountNumber) -> Result<Account> {
        let conn = self.lock()?;
        select_accounts(
            &conn,
            "WHERE account_number = ?",
            params![account_number.value()],
        )?
        .pop()
        .ok_or_else(|| Error::not_found(format!("account number {}", account_number)))
    }

    fn delete_account(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM accounts WHERE id = ?", params![id])?;
        if removed == 0 {
            return Err(Error::not_found(format!("account {}", id)));
        }
        Ok(())
    }

    fn delete_accounts_by_user(&self, user_id: i64) -> Result<usize> {
        let conn = self.lock()?;
        Ok(conn.execute("DELETE FROM accounts WHERE user_id = ?", params![user_id])?)
    }

    fn adjust_balance(&self, account_id: i64, delta: i64) -> Result<i64> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        // Dropping `tx` on the error path rolls back
        let new_balance = adjust_balance_in(&tx, account_id, delta)?;
        tx.commit()
            .map_err(|e| Error::storage(format!("commit failed: {}", e)))?;
        Ok(new_balance)
    }

    fn atomically(&self, work: &mut dyn FnMut(&dyn BalanceWriter) -> Result<()>) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let outcome = work(&TxWriter { conn: &tx });
        match outcome {
            Ok(()) => tx
                .commit()
                .map_err(|e| Error::storage(format!("commit failed: {}", e))),
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl UserDirectory for DuckDbStore {
    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.lock()?;
        select_users(&conn, "", params![])
    }

    fn get_user(&self, id: i64) -> Result<User> {
        let conn = self.lock()?;
        select_users(&conn, "WHERE id = ?", params![id])?
            .pop()
            .ok_or_else(|| Error::not_found(format!("user {}", id)))
    }

    fn create_user(&self, name: &UserName) -> Result<User> {
        let conn = self.lock()?;
        let id: i64 =
            conn.query_row("SELECT nextval('seq_user_id')", params![], |row| row.get(0))?;
        let timestamp = now();
        conn.execute(
            "INSERT INTO users (id, first_name, last_name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            params![id, name.first_name, name.last_name, timestamp, timestamp],
        )?;

        let created_at = parse_timestamp(&timestamp)?;
        Ok(User {
            id,
            first_name: name.first_name.clone(),
            last_name: name.last_name.clone(),
            created_at,
            updated_at: created_at,
        })
    }

    fn update_user(&self, id: i64, name: &UserName) -> Result<User> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE users SET first_name = ?, last_name = ?, updated_at = ? WHERE id = ?",
            params![name.first_name, name.last_name, now(), id],
        )?;
        if updated == 0 {
            return Err(Error::not_found(format!("user {}", id)));
        }
        select_users(&conn, "WHERE id = ?", params![id])?
            .pop()
            .ok_or_else(|| Error::not_found(format!("user {}", id)))
    }

    fn delete_user(&self, id: i64) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE id = ?",
            params![id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(Error::not_found(format!("user {}", id)));
        }

        let accounts_removed = tx.execute("DELETE FROM accounts WHERE user_id = ?", params![id])?;
        tx.execute("DELETE FROM users WHERE id = ?", params![id])?;
        tx.commit()?;

        Ok(accounts_removed)
    }
}
