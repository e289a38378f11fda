//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
pub mod amount;
pub mod result;
mod transfer;
mod user;

pub use account::{Account, AccountNumber};
pub use amount::{ensure_id, Amount};
pub use transfer::{TransferIntent, TransferReceipt, TransferState};
pub use user::{User, UserName};
