//! Account command - open, inspect and close accounts

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::Cell;
use serde_json::json;

use super::{confirm, get_context};
use crate::output;
use ledger_core::{Account, AccountNumber};

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open a zero-balance account for a user
    Open {
        /// Owning user ID
        #[arg(long)]
        user: i64,
        /// Account number (up to 18 digits)
        #[arg(long)]
        number: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's accounts
    List {
        /// Owning user ID
        #[arg(long)]
        user: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show an account by number
    Show {
        /// Account number
        number: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Close an account
    Close {
        /// Account ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AccountCommands) -> Result<()> {
    let ctx = get_context()?;
    let accounts = &ctx.account_service;

    match command {
        AccountCommands::Open {
            user,
            number,
            name,
            json,
        } => {
            let number: AccountNumber = number.parse()?;
            let account = accounts.open_account(user, number, &name)?;
            if json {
                return output::print_json(&account);
            }
            output::success(&format!(
                "Opened account {} ({}) for user {}",
                account.account_number, account.id, user
            ));
        }
        AccountCommands::List { user, json } => {
            let list = accounts.accounts_for_user(user)?;
            if json {
                return output::print_json(&list);
            }
            if list.is_empty() {
                output::info(&format!("User {} has no accounts", user));
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Number", "Name", "Balance"]);
            for account in &list {
                table.add_row(vec![
                    Cell::new(account.id),
                    Cell::new(account.account_number),
                    Cell::new(&account.name),
                    output::amount_cell(account.balance),
                ]);
            }
            println!("{}", table);
        }
        AccountCommands::Show { number, json } => {
            let number: AccountNumber = number.parse()?;
            let account = accounts.account(number)?;
            if json {
                return output::print_json(&account);
            }
            print_account(&account);
        }
        AccountCommands::Close { id, force, json } => {
            let account = accounts.account_by_id(id)?;
            if account.balance > 0 && !json {
                output::warning(&format!(
                    "Account {} still holds {} (minor units).",
                    account.account_number, account.balance
                ));
            }
            if !confirm("Close this account?", force, json)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            accounts.close_account(id)?;
            if json {
                return output::print_json(&json!({ "deleted": id }));
            }
            output::success(&format!("Closed account {}", account.account_number));
        }
    }

    Ok(())
}

fn print_account(account: &Account) {
    let mut table = output::create_table();
    table.add_row(vec![Cell::new("ID"), Cell::new(account.id)]);
    table.add_row(vec![Cell::new("Number"), Cell::new(account.account_number)]);
    table.add_row(vec![Cell::new("Name"), Cell::new(&account.name)]);
    table.add_row(vec![Cell::new("Owner"), Cell::new(account.user_id)]);
    table.add_row(vec![Cell::new("Balance"), output::amount_cell(account.balance)]);
    table.add_row(vec![
        Cell::new("Updated"),
        Cell::new(account.updated_at.format("%Y-%m-%d %H:%M:%S")),
    ]);
    println!("{}", table);
}
