//! Diagnostic logging for the CLI
//!
//! Core operations emit `tracing` events; this installs the subscriber that
//! prints them to stderr so stdout stays clean for `--json` output.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ledger_core::config::DEFAULT_LOG_LEVEL;

pub fn init_logging(log_level: &str) {
    let filter =
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second init (tests) is harmless
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}
