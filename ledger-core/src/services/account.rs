//! Account service - account lifecycle in front of the store

use std::sync::Arc;

use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{ensure_id, Account, AccountNumber};
use crate::ports::{AccountStore, UserDirectory};

/// Opens, looks up and closes accounts
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    users: Arc<dyn UserDirectory>,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { accounts, users }
    }

    /// Open a zero-balance account for an existing user
    pub fn open_account(
        &self,
        user_id: i64,
        account_number: AccountNumber,
        name: &str,
    ) -> Result<Account> {
        let user_id = ensure_id("user", user_id)?;
        let name = Account::normalize_name(name)?;
        self.users.get_user(user_id)?;
        let account = self.accounts.create_account(user_id, account_number, &name)?;
        debug!(account_id = account.id, user_id, "account opened");
        Ok(account)
    }

    /// Accounts of an existing user, ordered by id
    pub fn accounts_for_user(&self, user_id: i64) -> Result<Vec<Account>> {
        let user_id = ensure_id("user", user_id)?;
        self.users.get_user(user_id)?;
        self.accounts.list_accounts_by_user(user_id)
    }

    pub fn account(&self, account_number: AccountNumber) -> Result<Account> {
        self.accounts.get_account_by_number(account_number)
    }

    pub fn account_by_id(&self, id: i64) -> Result<Account> {
        self.accounts.get_account_by_id(ensure_id("account", id)?)
    }

    /// Close an account, failing with `NotFound` if it does not exist
    pub fn close_account(&self, id: i64) -> Result<()> {
        self.accounts.delete_account(ensure_id("account", id)?)?;
        debug!(account_id = id, "account closed");
        Ok(())
    }

    /// Close an account if it still exists
    ///
    /// Returns whether a row was removed. Removing an account that is already
    /// gone is not an error.
    pub fn remove_account(&self, id: i64) -> Result<bool> {
        match self.close_account(id) {
            Ok(()) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Close every account a user holds. Succeeds when there are none.
    pub fn close_all_for_user(&self, user_id: i64) -> Result<usize> {
        let user_id = ensure_id("user", user_id)?;
        self.accounts.delete_accounts_by_user(user_id)
    }
}
