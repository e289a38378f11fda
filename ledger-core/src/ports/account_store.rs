//! Account store port - durable accounts and atomic balance arithmetic

use crate::domain::result::Result;
use crate::domain::{Account, AccountNumber};

/// Balance mutation available inside a unit of work
///
/// Every call made through one writer belongs to the same storage
/// transaction. Nothing it does is visible to other operations until the
/// enclosing [`AccountStore::atomically`] call commits.
pub trait BalanceWriter {
    /// Apply `delta` to the account's balance and return the new balance.
    ///
    /// Fails with `InsufficientFunds` (and writes nothing) if the result
    /// would be negative, `NotFound` if the account does not exist.
    fn adjust_balance(&self, account_id: i64, delta: i64) -> Result<i64>;
}

/// Account storage abstraction
///
/// Implementations own all mutual exclusion: concurrent adjustments of the
/// same account must serialize, and a unit of work passed to
/// [`atomically`](AccountStore::atomically) is all-or-nothing.
pub trait AccountStore: Send + Sync {
    /// Create an account with a zero balance.
    ///
    /// Fails with `Conflict` if the account number is already taken.
    fn create_account(
        &self,
        user_id: i64,
        account_number: AccountNumber,
        name: &str,
    ) -> Result<Account>;

    /// All accounts, ordered by id
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Accounts owned by a user, ordered by id. Empty when there are none.
    fn list_accounts_by_user(&self, user_id: i64) -> Result<Vec<Account>>;

    fn get_account_by_id(&self, id: i64) -> Result<Account>;

    fn get_account_by_number(&self, account_number: AccountNumber) -> Result<Account>;

    /// Delete one account. `NotFound` if no row was removed.
    fn delete_account(&self, id: i64) -> Result<()>;

    /// Delete every account of a user, returning how many were removed.
    /// Succeeds with 0 when the user has none.
    fn delete_accounts_by_user(&self, user_id: i64) -> Result<usize>;

    /// Atomic read-modify-write of a single balance, committed on success
    fn adjust_balance(&self, account_id: i64, delta: i64) -> Result<i64>;

    /// Run `work` inside one storage transaction.
    ///
    /// Commits when `work` returns `Ok`; rolls back and returns the error
    /// unchanged when it returns `Err`. A failed commit is a `Storage` error
    /// and leaves no changes behind.
    fn atomically(&self, work: &mut dyn FnMut(&dyn BalanceWriter) -> Result<()>) -> Result<()>;
}
