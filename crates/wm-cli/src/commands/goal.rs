//! `wealthmap goal add|list|rm`.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde_json::json;
use wm_model::{Importance, NewGoal};

use crate::opts::{GlobalOpts, open_workspace};
use crate::output::print_success;
use crate::util::guarded;

const ROUTE: &str = "/goals";

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    /// Add a goal
    Add(GoalAddArgs),
    /// List goals with progress
    List,
    /// Remove a goal by id
    Rm { id: String },
}

#[derive(Args, Debug)]
pub struct GoalAddArgs {
    /// Goal name
    pub name: String,
    /// Target amount
    #[arg(long)]
    pub target: f64,
    /// Amount saved so far
    #[arg(long, default_value_t = 0.0)]
    pub current: f64,
    /// Target date (YYYY-MM-DD)
    #[arg(long)]
    pub by: String,
    /// low, medium or high
    #[arg(long, default_value = "medium")]
    pub importance: Importance,
}

pub fn cmd_goal(opts: &GlobalOpts, cmd: &GoalCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    guarded(&ws.session, ROUTE, || match cmd {
        GoalCommand::Add(args) => {
            let goal = ws.ledger.add_goal(NewGoal {
                name: args.name.clone(),
                target_amount: args.target,
                current_amount: args.current,
                target_date: args.by.clone(),
                importance: args.importance,
            })?;
            print_success(opts, json!(goal), vec![])
        }
        GoalCommand::List => {
            let goals: Vec<_> = ws
                .ledger
                .goals()
                .into_iter()
                .map(|goal| {
                    let mut value = json!(goal);
                    value["progress"] = json!(goal.progress());
                    value["remaining"] = json!(goal.remaining());
                    value
                })
                .collect();
            print_success(opts, json!(goals), vec![])
        }
        GoalCommand::Rm { id } => {
            if !ws.ledger.remove_goal(id)? {
                bail!("no goal with id '{id}'");
            }
            print_success(opts, json!({ "removed": id }), vec![])
        }
    })
}
