//! `wealthmap mood` and `wealthmap language`.

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;
use wm_model::{Language, Mood, keys};
use wm_store::Stored;

use crate::opts::{GlobalOpts, open_workspace};
use crate::output::print_success;
use crate::util::guarded;

#[derive(Subcommand, Debug)]
pub enum MoodCommand {
    /// Show today's mood
    Show,
    /// great, good, neutral, low or stressed
    Set { mood: Mood },
}

#[derive(Subcommand, Debug)]
pub enum LanguageCommand {
    Show,
    /// en or es
    Set { language: Language },
}

pub fn cmd_mood(opts: &GlobalOpts, cmd: &MoodCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    guarded(&ws.session, "/dashboard", || match cmd {
        MoodCommand::Show => print_success(opts, json!({ "mood": ws.ledger.mood() }), vec![]),
        MoodCommand::Set { mood } => {
            ws.ledger.set_mood(*mood)?;
            print_success(opts, json!({ "mood": mood }), vec![])
        }
    })
}

/// Language is a display preference and works before activation.
pub fn cmd_language(opts: &GlobalOpts, cmd: &LanguageCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    let mut language = Stored::load(ws.ledger.store(), keys::LANGUAGE, Language::default());
    let mut warnings = vec![];
    if let LanguageCommand::Set { language: chosen } = cmd {
        if !language.set(*chosen) {
            warnings.push("language could not be saved".into());
        }
    }
    print_success(opts, json!({ "language": language.get() }), warnings)
}
