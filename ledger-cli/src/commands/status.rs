//! Status command - show ledger summary

use anyhow::Result;
use colored::Colorize;
use comfy_table::{Cell, ContentArrangement, Table};

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        return output::print_json(&status);
    }

    println!("{}", "Ledger Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Users", &status.total_users.to_string()]);
    table.add_row(vec!["Accounts", &status.total_accounts.to_string()]);
    table.add_row(vec!["Ledger total", &status.ledger_total.to_string()]);

    println!("{}", table);

    if status.accounts.is_empty() {
        return Ok(());
    }

    println!();
    let mut accounts = output::create_table();
    accounts.set_header(vec!["ID", "Number", "Name", "Owner", "Balance"]);
    for account in &status.accounts {
        accounts.add_row(vec![
            Cell::new(account.id),
            Cell::new(account.account_number),
            Cell::new(&account.name),
            Cell::new(account.user_id),
            output::amount_cell(account.balance),
        ]);
    }
    println!("{}", accounts);

    Ok(())
}
