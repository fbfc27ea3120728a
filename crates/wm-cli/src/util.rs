use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;
use wm_access::{GuardOutcome, RouteGuard, Session};

/// Logs go to stderr so `--json` output stays parseable.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .try_init();
}

/// Load .env from the data directory without overriding existing environment variables.
pub fn load_data_env(root: &Path) -> Result<()> {
    let env_path = root.join(".env");
    if env_path.exists() {
        for item in dotenvy::from_path_iter(&env_path).context("load .env")? {
            let (key, val) = item?;
            if std::env::var_os(&key).is_none() {
                unsafe {
                    std::env::set_var(&key, &val);
                }
            }
        }
    }
    Ok(())
}

/// Runs `view` behind the route guard for `route`.
pub fn guarded<T>(session: &Session, route: &str, view: impl FnOnce() -> Result<T>) -> Result<T> {
    let guard = RouteGuard::mount(session.clone());
    match guard.evaluate(view) {
        GuardOutcome::Render(result) => result,
        GuardOutcome::Loading => bail!("{route}: session is still loading"),
        GuardOutcome::Redirect { to } => bail!(
            "{route} requires an activated license and a display name (redirected to {to}); \
             run `wealthmap activate <KEY>` and `wealthmap onboard <NAME>`"
        ),
    }
}
