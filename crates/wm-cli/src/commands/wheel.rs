//! `wealthmap wheel` and `wealthmap reflect`.

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use crate::opts::{GlobalOpts, open_workspace};
use crate::output::print_success;
use crate::util::guarded;

#[derive(Subcommand, Debug)]
pub enum WheelCommand {
    /// Show all wheel categories and the average score
    Show,
    /// Score one category from 0 to 10
    Set { id: String, value: f64 },
}

#[derive(Subcommand, Debug)]
pub enum ReflectCommand {
    /// Show every reflection prompt and answer
    Show,
    /// Answer one prompt
    Set { id: String, content: String },
}

pub fn cmd_wheel(opts: &GlobalOpts, cmd: &WheelCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    guarded(&ws.session, "/wealth-wheel", || match cmd {
        WheelCommand::Show => print_success(
            opts,
            json!({
                "categories": ws.ledger.wealth_wheel(),
                "average": ws.ledger.wheel_average(),
            }),
            vec![],
        ),
        WheelCommand::Set { id, value } => {
            let category = ws.ledger.set_wheel_value(id, *value)?;
            print_success(opts, json!(category), vec![])
        }
    })
}

pub fn cmd_reflect(opts: &GlobalOpts, cmd: &ReflectCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    guarded(&ws.session, "/reflections", || match cmd {
        ReflectCommand::Show => print_success(opts, json!(ws.ledger.reflections()), vec![]),
        ReflectCommand::Set { id, content } => {
            let reflection = ws.ledger.set_reflection(id, content)?;
            print_success(opts, json!(reflection), vec![])
        }
    })
}
