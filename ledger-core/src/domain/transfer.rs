//! Transfer intent, state machine and receipt

use std::fmt;

use serde::{Deserialize, Serialize};

use super::account::AccountNumber;
use super::amount::Amount;
use super::result::{Error, Result};

/// A request to move money between two accounts
///
/// Not persisted. Construction validates the amount first, then that the two
/// sides differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    pub from: AccountNumber,
    pub to: AccountNumber,
    pub amount: Amount,
}

impl TransferIntent {
    pub fn new(from: AccountNumber, to: AccountNumber, amount: i64) -> Result<Self> {
        let amount = Amount::new(amount)?;
        if from == to {
            return Err(Error::validation(format!(
                "cannot transfer from account {} to itself",
                from
            )));
        }
        Ok(Self { from, to, amount })
    }
}

/// Transfer states
///
/// `Debited` and `Credited` only exist inside an open storage transaction;
/// nothing between `Validated` and `Committed` is ever visible to readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferState {
    Validated,
    Debited,
    Credited,
    /// Terminal: both legs applied
    Committed,
    /// Terminal: nothing applied
    Aborted,
}

impl TransferState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Committed | TransferState::Aborted)
    }

    /// Forward edges plus the single rollback edge from any live state
    pub fn can_transition_to(&self, next: TransferState) -> bool {
        use TransferState::*;
        match (self, next) {
            (Validated, Debited) | (Debited, Credited) | (Credited, Committed) => true,
            (state, Aborted) => !state.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Validated => "VALIDATED",
            TransferState::Debited => "DEBITED",
            TransferState::Credited => "CREDITED",
            TransferState::Committed => "COMMITTED",
            TransferState::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub from: AccountNumber,
    pub to: AccountNumber,
    pub amount: Amount,
    pub from_balance: i64,
    pub to_balance: i64,
    pub state: TransferState,
}
