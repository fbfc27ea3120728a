//! `wealthmap tx add|list|rm`.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde_json::json;
use wm_model::{NewTransaction, TransactionKind};

use crate::opts::{GlobalOpts, open_workspace};
use crate::output::print_success;
use crate::util::guarded;

const ROUTE: &str = "/transactions";

#[derive(Subcommand, Debug)]
pub enum TxCommand {
    /// Record a transaction
    Add(TxAddArgs),
    /// List transactions and totals
    List,
    /// Remove a transaction by id
    Rm { id: String },
}

#[derive(Args, Debug)]
pub struct TxAddArgs {
    /// income or expense
    pub kind: TransactionKind,
    /// Non-negative amount
    pub amount: f64,
    /// Description
    pub description: String,
    /// Date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,
}

pub fn cmd_tx(opts: &GlobalOpts, cmd: &TxCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    guarded(&ws.session, ROUTE, || match cmd {
        TxCommand::Add(args) => {
            let tx = ws.ledger.add_transaction(NewTransaction {
                description: args.description.clone(),
                amount: args.amount,
                kind: args.kind,
                date: args.date.clone(),
            })?;
            print_success(opts, json!(tx), vec![])
        }
        TxCommand::List => {
            let transactions = ws.ledger.transactions();
            let totals = wm_model::ledger::totals(&transactions);
            print_success(
                opts,
                json!({ "transactions": transactions, "totals": totals }),
                vec![],
            )
        }
        TxCommand::Rm { id } => {
            if !ws.ledger.remove_transaction(id)? {
                bail!("no transaction with id '{id}'");
            }
            print_success(opts, json!({ "removed": id }), vec![])
        }
    })
}
