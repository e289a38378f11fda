//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The services
//! depend only on these traits, not on concrete implementations.

mod account_store;
mod user_directory;

pub use account_store::{AccountStore, BalanceWriter};
pub use user_directory::UserDirectory;
