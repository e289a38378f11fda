//! Deposit, withdraw and transfer commands

use anyhow::Result;
use serde_json::json;

use super::get_context;
use crate::output;
use ledger_core::{AccountNumber, Amount};

pub fn deposit(account_id: i64, amount: &str, json: bool) -> Result<()> {
    let amount: Amount = amount.parse()?;
    let ctx = get_context()?;
    let balance = ctx
        .transfer_engine
        .deposit(account_id, amount.minor_units())?;

    if json {
        return output::print_json(&json!({ "account_id": account_id, "balance": balance }));
    }
    output::success(&format!(
        "Deposited {} into account {}. New balance: {}",
        amount, account_id, balance
    ));
    Ok(())
}

pub fn withdraw(account_id: i64, amount: &str, json: bool) -> Result<()> {
    let amount: Amount = amount.parse()?;
    let ctx = get_context()?;
    let balance = ctx
        .transfer_engine
        .withdraw(account_id, amount.minor_units())?;

    if json {
        return output::print_json(&json!({ "account_id": account_id, "balance": balance }));
    }
    output::success(&format!(
        "Withdrew {} from account {}. New balance: {}",
        amount, account_id, balance
    ));
    Ok(())
}

pub fn transfer(from: &str, to: &str, amount: &str, json: bool) -> Result<()> {
    let from: AccountNumber = from.parse()?;
    let to: AccountNumber = to.parse()?;
    let amount: Amount = amount.parse()?;

    let ctx = get_context()?;
    let receipt = ctx
        .transfer_engine
        .transfer(from, to, amount.minor_units())?;

    if json {
        return output::print_json(&receipt);
    }
    output::success(&format!("Transferred {} from {} to {}", amount, from, to));
    println!("  {}: {}", from, receipt.from_balance);
    println!("  {}: {}", to, receipt.to_balance);
    Ok(())
}
