//! Global CLI options and data directory resolution.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use wm_access::{LicenseRegistry, Session};
use wm_model::Ledger;
use wm_store::{FsBackend, StoreAdapter};

pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8787";

/// Global options for CLI commands.
///
/// These options apply to all commands and can be set via env vars.
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Data directory holding `.wealthmap/` (env: WEALTHMAP_DATA, default: current directory)
    #[arg(short = 'd', long, global = true, env = "WEALTHMAP_DATA")]
    pub data_dir: Option<PathBuf>,

    /// Proxy base URL for AI requests (env: WEALTHMAP_PROXY_URL)
    #[arg(long, global = true, env = "WEALTHMAP_PROXY_URL", default_value = DEFAULT_PROXY_URL)]
    pub proxy_url: String,

    /// License allowlist file (env: WEALTHMAP_LICENSE_FILE, default: built-in keys)
    #[arg(long, global = true, env = "WEALTHMAP_LICENSE_FILE")]
    pub license_file: Option<PathBuf>,

    /// JSON output envelope
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output (implies --json)
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Suppress notices
    #[arg(long, global = true)]
    pub quiet: bool,
}

impl GlobalOpts {
    pub fn data_root(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("resolve current directory"),
        }
    }

    pub fn licenses(&self) -> Result<LicenseRegistry> {
        match &self.license_file {
            Some(path) => LicenseRegistry::from_file(path)
                .with_context(|| format!("load license file {}", path.display())),
            None => Ok(LicenseRegistry::builtin()),
        }
    }
}

/// Store-backed handles every data command works through.
pub struct Workspace {
    pub session: Session,
    pub ledger: Ledger,
}

pub fn open_workspace(opts: &GlobalOpts) -> Result<Workspace> {
    let root = opts.data_root()?;
    let backend = FsBackend::open(&root)
        .with_context(|| format!("open store under {}", root.display()))?;
    let store = StoreAdapter::new(Arc::new(backend));
    Ok(Workspace {
        session: Session::new(store.clone(), opts.licenses()?),
        ledger: Ledger::new(store),
    })
}
