//! Transfer engine - deposit, withdraw and all-or-nothing transfers

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::result::{Error, Result};
use crate::domain::{
    ensure_id, AccountNumber, Amount, TransferIntent, TransferReceipt, TransferState,
};
use crate::ports::{AccountStore, BalanceWriter};

/// Moves money between accounts
///
/// Holds no locks of its own. Every balance change goes through
/// [`AccountStore::adjust_balance`], either on its own or inside one
/// [`AccountStore::atomically`] unit for the two legs of a transfer.
pub struct TransferEngine {
    store: Arc<dyn AccountStore>,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Credit an account, returning the new balance
    pub fn deposit(&self, account_id: i64, amount: i64) -> Result<i64> {
        let amount = Amount::new(amount)?;
        let account_id = ensure_id("account", account_id)?;
        let balance = self.store.adjust_balance(account_id, amount.as_credit())?;
        debug!(account_id, "deposit applied");
        Ok(balance)
    }

    /// Debit an account, returning the new balance
    ///
    /// Fails with `InsufficientFunds` when the balance does not cover the
    /// amount; the balance is left untouched in that case.
    pub fn withdraw(&self, account_id: i64, amount: i64) -> Result<i64> {
        let amount = Amount::new(amount)?;
        let account_id = ensure_id("account", account_id)?;
        let balance = self.store.adjust_balance(account_id, amount.as_debit())?;
        debug!(account_id, "withdrawal applied");
        Ok(balance)
    }

    /// Move `amount` from one account number to another
    pub fn transfer(
        &self,
        from: AccountNumber,
        to: AccountNumber,
        amount: i64,
    ) -> Result<TransferReceipt> {
        let intent = TransferIntent::new(from, to, amount)?;
        self.execute(&intent)
    }

    /// Execute a transfer intent
    ///
    /// Checks run in order: distinct accounts, both accounts exist, debit
    /// covered by the source balance. The debit and credit are applied in one
    /// storage transaction; any failure leaves both balances as they were.
    pub fn execute(&self, intent: &TransferIntent) -> Result<TransferReceipt> {
        // Fields are public, so an intent may not have come through `new`
        if intent.from == intent.to {
            return Err(Error::validation(format!(
                "cannot transfer from account {} to itself",
                intent.from
            )));
        }

        let source = self.store.get_account_by_number(intent.from)?;
        let destination = self.store.get_account_by_number(intent.to)?;

        let mut state = TransferState::Validated;
        let mut from_balance = source.balance;
        let mut to_balance = destination.balance;

        let outcome = self.store.atomically(&mut |writer: &dyn BalanceWriter| {
            from_balance = writer.adjust_balance(source.id, intent.amount.as_debit())?;
            state = advance(state, TransferState::Debited);
            to_balance = writer.adjust_balance(destination.id, intent.amount.as_credit())?;
            state = advance(state, TransferState::Credited);
            Ok(())
        });

        match outcome {
            Ok(()) => {
                let state = advance(state, TransferState::Committed);
                info!(
                    from_account = source.id,
                    to_account = destination.id,
                    "transfer committed"
                );
                Ok(TransferReceipt {
                    from: intent.from,
                    to: intent.to,
                    amount: intent.amount,
                    from_balance,
                    to_balance,
                    state,
                })
            }
            Err(err) => {
                advance(state, TransferState::Aborted);
                debug!(
                    from_account = source.id,
                    to_account = destination.id,
                    kind = %err.kind(),
                    "transfer aborted"
                );
                Err(err)
            }
        }
    }
}

fn advance(current: TransferState, next: TransferState) -> TransferState {
    debug_assert!(
        current.can_transition_to(next),
        "illegal transfer transition {} -> {}",
        current,
        next
    );
    debug!(from = %current, to = %next, "transfer state");
    next
}
