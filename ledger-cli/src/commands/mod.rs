//! CLI command implementations

pub mod account;
pub mod doctor;
pub mod logs;
pub mod money;
pub mod status;
pub mod user;

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::Confirm;
use ledger_core::{EntryPoint, LedgerContext, LogEvent, LoggingService};

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let ledger_dir = get_ledger_dir().ok()?;
    std::fs::create_dir_all(&ledger_dir).ok()?;
    LoggingService::new(&ledger_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the ledger directory from environment or default
pub fn get_ledger_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("LEDGER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".ledger"))
        .context("Could not find home directory; set LEDGER_DIR")
}

/// Open the ledger in the data directory, creating it on first use
pub fn get_context() -> Result<LedgerContext> {
    let ledger_dir = get_ledger_dir()?;

    std::fs::create_dir_all(&ledger_dir)
        .with_context(|| format!("Failed to create ledger directory: {:?}", ledger_dir))?;

    let encryption_key = std::env::var("LEDGER_DB_KEY")
        .ok()
        .filter(|key| !key.is_empty());
    if encryption_key.is_some() {
        tracing::debug!("opening encrypted database");
    }

    LedgerContext::new(&ledger_dir, encryption_key.as_deref())
        .context("Failed to open ledger")
}

/// Ask before a destructive change unless forced or running non-interactively
pub fn confirm(prompt: &str, force: bool, json: bool) -> Result<bool> {
    if force || json {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
