//! `wealthmap investment add|list|rm`.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde_json::json;
use wm_model::{InvestmentKind, NewInvestment};

use crate::opts::{GlobalOpts, open_workspace};
use crate::output::print_success;
use crate::util::guarded;

const ROUTE: &str = "/investments";

#[derive(Subcommand, Debug)]
pub enum InvestmentCommand {
    /// Record a holding
    Add(InvestmentAddArgs),
    /// List holdings
    List,
    /// Remove a holding by id
    Rm { id: String },
}

#[derive(Args, Debug)]
pub struct InvestmentAddArgs {
    pub name: String,
    /// stocks, bonds, funds, realEstate, crypto, cash or other
    #[arg(long)]
    pub kind: InvestmentKind,
    #[arg(long)]
    pub amount: f64,
    /// Expected annual return in percent
    #[arg(long = "return", default_value_t = 0.0, allow_negative_numbers = true)]
    pub expected_return: f64,
}

pub fn cmd_investment(opts: &GlobalOpts, cmd: &InvestmentCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    guarded(&ws.session, ROUTE, || match cmd {
        InvestmentCommand::Add(args) => {
            let investment = ws.ledger.add_investment(NewInvestment {
                name: args.name.clone(),
                kind: args.kind,
                amount: args.amount,
                expected_return: args.expected_return,
            })?;
            print_success(opts, json!(investment), vec![])
        }
        InvestmentCommand::List => {
            let investments = ws.ledger.investments();
            let total: f64 = investments.iter().map(|i| i.amount).sum();
            print_success(
                opts,
                json!({ "investments": investments, "total": total }),
                vec![],
            )
        }
        InvestmentCommand::Rm { id } => {
            if !ws.ledger.remove_investment(id)? {
                bail!("no investment with id '{id}'");
            }
            print_success(opts, json!({ "removed": id }), vec![])
        }
    })
}
