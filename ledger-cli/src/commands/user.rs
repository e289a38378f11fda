//! User command - manage account holders

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde_json::json;

use super::{confirm, get_context};
use crate::output;
use ledger_core::User;

#[derive(Subcommand)]
pub enum UserCommands {
    /// List all users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a user and their accounts
    Show {
        /// User ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a user
    Add {
        /// First name
        #[arg(long)]
        first: String,
        /// Last name
        #[arg(long)]
        last: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a user
    Update {
        /// User ID
        id: i64,
        /// First name
        #[arg(long)]
        first: String,
        /// Last name
        #[arg(long)]
        last: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a user and every account they hold
    Remove {
        /// User ID
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: UserCommands) -> Result<()> {
    let ctx = get_context()?;
    let users = &ctx.user_service;

    match command {
        UserCommands::List { json } => {
            let all = users.all()?;
            if json {
                return output::print_json(&all);
            }
            if all.is_empty() {
                println!("No users yet. Add one with `ledger user add`.");
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "First name", "Last name", "Created"]);
            for user in &all {
                table.add_row(vec![
                    user.id.to_string(),
                    user.first_name.clone(),
                    user.last_name.clone(),
                    user.created_at.format("%Y-%m-%d %H:%M").to_string(),
                ]);
            }
            println!("{}", table);
        }
        UserCommands::Show { id, json } => {
            let user = users.user(id)?;
            let accounts = ctx.account_service.accounts_for_user(id)?;
            if json {
                return output::print_json(&json!({ "user": user, "accounts": accounts }));
            }
            print_user(&user);
            if accounts.is_empty() {
                println!("  {}", "No accounts".dimmed());
                return Ok(());
            }
            let mut table = output::create_table();
            table.set_header(vec!["ID", "Number", "Name", "Balance"]);
            for account in &accounts {
                table.add_row(vec![
                    comfy_table::Cell::new(account.id),
                    comfy_table::Cell::new(account.account_number),
                    comfy_table::Cell::new(&account.name),
                    output::amount_cell(account.balance),
                ]);
            }
            println!("{}", table);
        }
        UserCommands::Add { first, last, json } => {
            let user = users.create_user(&first, &last)?;
            if json {
                return output::print_json(&user);
            }
            output::success(&format!("Added user {}", user.id));
        }
        UserCommands::Update {
            id,
            first,
            last,
            json,
        } => {
            let user = users.update_user(id, &first, &last)?;
            if json {
                return output::print_json(&user);
            }
            output::success(&format!("Updated user {}", user.id));
        }
        UserCommands::Remove { id, force, json } => {
            let user = users.user(id)?;
            if !json && !force {
                output::warning(&format!(
                    "This will remove {} {} and all of their accounts.",
                    user.first_name, user.last_name
                ));
            }
            if !confirm("Are you sure?", force, json)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            let removed = users.delete_user(id)?;
            if json {
                return output::print_json(&json!({ "deleted": id, "accounts_removed": removed }));
            }
            output::success(&format!(
                "Removed user {} ({} account(s) closed)",
                id, removed
            ));
        }
    }

    Ok(())
}

fn print_user(user: &User) {
    println!(
        "{} {} {}",
        format!("#{}", user.id).bold(),
        user.first_name,
        user.last_name
    );
    println!(
        "  Created {}, updated {}",
        user.created_at.format("%Y-%m-%d %H:%M"),
        user.updated_at.format("%Y-%m-%d %H:%M")
    );
}
