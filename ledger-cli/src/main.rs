//! Ledger CLI - accounts and transfers in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod output;

use commands::{account, doctor, logs, money, status, user};
use ledger_core::config::{Config, DEFAULT_LOG_LEVEL};
use ledger_core::{ErrorKind, LogEvent};

/// Ledger - accounts and transfers in your terminal
#[derive(Parser)]
#[command(name = "ledger", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// Manage accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Credit an account
    Deposit {
        /// Account ID
        account_id: i64,
        /// Amount in minor units (e.g. cents)
        #[arg(allow_negative_numbers = true)]
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Debit an account
    Withdraw {
        /// Account ID
        account_id: i64,
        /// Amount in minor units (e.g. cents)
        #[arg(allow_negative_numbers = true)]
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move money between two accounts
    Transfer {
        /// Source account number
        #[arg(long)]
        from: String,
        /// Destination account number
        #[arg(long)]
        to: String,
        /// Amount in minor units (e.g. cents)
        #[arg(long, allow_negative_numbers = true)]
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show ledger status and summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run ledger integrity checks
    Doctor {
        /// Show verbose output
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::User { .. } => "user",
            Commands::Account { .. } => "account",
            Commands::Deposit { .. } => "deposit",
            Commands::Withdraw { .. } => "withdraw",
            Commands::Transfer { .. } => "transfer",
            Commands::Status { .. } => "status",
            Commands::Doctor { .. } => "doctor",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init_logging(&log_level());

    let command = cli.command.name();
    // The event log does not record reads of itself
    let logger = if command == "logs" {
        None
    } else {
        commands::get_logger()
    };

    match run(cli) {
        Ok(()) => {
            commands::log_event(&logger, LogEvent::new("command_executed").with_command(command));
            ExitCode::SUCCESS
        }
        Err(e) => {
            let event = LogEvent::new("command_failed").with_command(command);
            let event = match core_error(&e) {
                Some(core) => event.with_failure(core),
                None => event
                    .with_error(e.to_string())
                    .with_error_details(format!("{:#}", e)),
            };
            commands::log_event(&logger, event);

            output::error(&format!("Error: {:#}", e));
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::User { command } => user::run(command),
        Commands::Account { command } => account::run(command),
        Commands::Deposit {
            account_id,
            amount,
            json,
        } => money::deposit(account_id, &amount, json),
        Commands::Withdraw {
            account_id,
            amount,
            json,
        } => money::withdraw(account_id, &amount, json),
        Commands::Transfer {
            from,
            to,
            amount,
            json,
        } => money::transfer(&from, &to, &amount, json),
        Commands::Status { json } => status::run(json),
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Logs { command } => logs::run(command),
    }
}

/// Log filter from settings.json / LEDGER_LOG, falling back to the default
fn log_level() -> String {
    commands::get_ledger_dir()
        .ok()
        .and_then(|dir| Config::load(&dir).ok())
        .map(|config| config.log_level)
        .or_else(|| std::env::var("LEDGER_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// The ledger error somewhere in the chain, if any
fn core_error(err: &anyhow::Error) -> Option<&ledger_core::Error> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ledger_core::Error>())
}

/// Process exit code for a failed command
fn exit_code(err: &anyhow::Error) -> u8 {
    match core_error(err).map(ledger_core::Error::kind) {
        Some(ErrorKind::Validation) => 2,
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Conflict) => 4,
        Some(ErrorKind::InsufficientFunds) => 5,
        Some(ErrorKind::Storage) | Some(ErrorKind::Other) | None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let cases = [
            (ledger_core::Error::validation("bad amount"), 2),
            (ledger_core::Error::not_found("account 9"), 3),
            (ledger_core::Error::conflict("account number 1"), 4),
            (
                ledger_core::Error::InsufficientFunds {
                    account_id: 1,
                    balance: 0,
                    requested: 5,
                },
                5,
            ),
            (ledger_core::Error::storage("disk full"), 1),
        ];
        for (err, code) in cases {
            assert_eq!(exit_code(&anyhow::Error::new(err)), code);
        }
    }

    #[test]
    fn test_exit_code_sees_through_context() {
        let err = Err::<(), _>(ledger_core::Error::not_found("user 3"))
            .context("Failed to open ledger")
            .unwrap_err();
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_non_ledger_errors_exit_with_one() {
        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
    }

    #[test]
    fn test_cli_parses_transfer() {
        let cli = Cli::try_parse_from([
            "ledger", "transfer", "--from", "1001", "--to", "1002", "--amount", "100",
        ])
        .unwrap();
        assert_eq!(cli.command.name(), "transfer");
    }

    #[test]
    fn test_cli_accepts_negative_amounts_for_validation() {
        let cli = Cli::try_parse_from(["ledger", "withdraw", "3", "-5"]).unwrap();
        match cli.command {
            Commands::Withdraw { amount, .. } => assert_eq!(amount, "-5"),
            _ => panic!("expected withdraw"),
        }
    }

    #[test]
    fn test_signed_amount_is_rejected_as_validation() {
        let cli = Cli::try_parse_from(["ledger", "deposit", "1", "+5"]).unwrap();
        let err = run(cli).unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }
}
