//! Status service - ledger summary

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::AccountNumber;
use crate::ports::{AccountStore, UserDirectory};

pub struct StatusService {
    accounts: Arc<dyn AccountStore>,
    users: Arc<dyn UserDirectory>,
}

impl StatusService {
    pub fn new(accounts: Arc<dyn AccountStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { accounts, users }
    }

    /// Counts plus the ledger total (sum of every balance)
    pub fn get_status(&self) -> Result<StatusSummary> {
        let users = self.users.list_users()?;
        let accounts = self.accounts.list_accounts()?;
        let ledger_total: i128 = accounts.iter().map(|a| i128::from(a.balance)).sum();

        Ok(StatusSummary {
            total_users: users.len(),
            total_accounts: accounts.len(),
            ledger_total,
            accounts: accounts
                .into_iter()
                .map(|a| AccountSummary {
                    id: a.id,
                    user_id: a.user_id,
                    account_number: a.account_number,
                    name: a.name,
                    balance: a.balance,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_users: usize,
    pub total_accounts: usize,
    pub ledger_total: i128,
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub id: i64,
    pub user_id: i64,
    pub account_number: AccountNumber,
    pub name: String,
    pub balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DuckDbStore;
    use crate::domain::UserName;

    #[test]
    fn test_status_totals() {
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
        store.adjust_balance(a.id, i64::MAX).unwrap();
        store.adjust_balance(b.id, 10).unwrap();

        let status = StatusService::new(store.clone(), store).get_status().unwrap();
        assert_eq!(status.total_users, 1);
        assert_eq!(status.total_accounts, 2);
        // Summing must not overflow i64
        assert_eq!(status.ledger_total, i128::from(i64::MAX) + 10);
    }
}
