//! `wealthmap backup export|import` and `wealthmap csv export`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use serde_json::json;
use wm_model::{Backup, export_backup, import_backup, transactions_csv};

use crate::opts::{GlobalOpts, open_workspace};
use crate::output::print_success;
use crate::util::guarded;

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// Write every backed-up key to a JSON file (stdout when no file is given)
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Restore keys from a backup file
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum CsvCommand {
    /// Export transactions as CSV (stdout when no file is given)
    Export {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

pub fn cmd_backup(opts: &GlobalOpts, cmd: &BackupCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    guarded(&ws.session, "/settings", || match cmd {
        BackupCommand::Export { out } => {
            let backup = export_backup(ws.ledger.store());
            let text = backup.to_json()?;
            match out {
                Some(path) => {
                    fs::write(path, &text)
                        .with_context(|| format!("write backup {}", path.display()))?;
                    let keys: Vec<_> = backup.keys().collect();
                    print_success(
                        opts,
                        json!({ "file": path, "keys": keys }),
                        vec![],
                    )
                }
                None => {
                    println!("{text}");
                    Ok(())
                }
            }
        }
        BackupCommand::Import { file } => {
            let text = fs::read_to_string(file)
                .with_context(|| format!("read backup {}", file.display()))?;
            let backup = Backup::from_json(&text)?;
            let report = import_backup(ws.ledger.store(), &backup);
            let mut warnings = vec![];
            if !report.ignored.is_empty() {
                warnings.push(format!("ignored keys: {}", report.ignored.join(", ")));
            }
            if report.reload_required() {
                warnings.push("data restored; reopen any running views to see it".into());
            }
            if !report.failed.is_empty() {
                bail!("could not restore: {}", report.failed.join(", "));
            }
            print_success(opts, json!(report), warnings)
        }
    })
}

pub fn cmd_csv(opts: &GlobalOpts, cmd: &CsvCommand) -> Result<()> {
    let ws = open_workspace(opts)?;
    guarded(&ws.session, "/transactions", || match cmd {
        CsvCommand::Export { out } => {
            let csv = transactions_csv(&ws.ledger.transactions())?;
            match out {
                Some(path) => {
                    fs::write(path, &csv)
                        .with_context(|| format!("write csv {}", path.display()))?;
                    print_success(opts, json!({ "file": path }), vec![])
                }
                None => {
                    print!("{csv}");
                    Ok(())
                }
            }
        }
    })
}
