//! Ledger Core - atomic balance mutation for a small banking ledger
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (User, Account, Amount, TransferIntent)
//! - **ports**: Trait definitions for storage (AccountStore, UserDirectory)
//! - **services**: Business logic orchestration (TransferEngine, AccountService, ...)
//! - **adapters**: Concrete implementations (DuckDB)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::DuckDbStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, ErrorKind};
pub use domain::{
    Account, AccountNumber, Amount, TransferIntent, TransferReceipt, TransferState, User,
    UserName,
};
pub use services::{EntryPoint, LogEntry, LogEvent, LoggingService};

/// Main context for ledger operations
///
/// This is the primary entry point for all business logic. It holds
/// the database store, configuration, and all services. Every service
/// shares the same store, so balance changes made through any of them
/// are serialized by the same connection guard.
pub struct LedgerContext {
    pub config: Config,
    pub store: Arc<DuckDbStore>,
    pub user_service: UserService,
    pub account_service: AccountService,
    pub transfer_engine: TransferEngine,
    pub status_service: StatusService,
    pub doctor_service: DoctorService,
}

impl LedgerContext {
    /// Open the ledger stored in `data_dir`
    pub fn new(data_dir: &Path, encryption_key: Option<&str>) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let db_path = config.database_path(data_dir);
        let store = Arc::new(DuckDbStore::new(&db_path, encryption_key)?);
        store.ensure_schema()?;
        Ok(Self::with_store(config, store))
    }

    /// A throwaway ledger backed by an in-memory database
    pub fn in_memory() -> Result<Self> {
        let store = Arc::new(DuckDbStore::open_in_memory()?);
        store.ensure_schema()?;
        Ok(Self::with_store(Config::default(), store))
    }

    /// Wire services around an already migrated store
    pub fn with_store(config: Config, store: Arc<DuckDbStore>) -> Self {
        Self {
            user_service: UserService::new(store.clone()),
            account_service: AccountService::new(store.clone(), store.clone()),
            transfer_engine: TransferEngine::new(store.clone()),
            status_service: StatusService::new(store.clone(), store.clone()),
            doctor_service: DoctorService::new(store.clone()),
            config,
            store,
        }
    }
}
