//! `wealthmap activate|onboard|status|sign-out|route`.

use anyhow::Result;
use clap::Args;
use serde_json::json;
use wm_access::{GuardOutcome, RouteGuard, SessionState, is_protected};

use crate::opts::{GlobalOpts, open_workspace};
use crate::output::print_success;

#[derive(Args, Debug)]
pub struct ActivateArgs {
    /// License key to activate
    pub key: String,
}

#[derive(Args, Debug)]
pub struct OnboardArgs {
    /// Display name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Route path, e.g. /dashboard
    pub path: String,
}

fn next_step(state: SessionState) -> Option<String> {
    match state {
        SessionState::NeedsActivation => Some("run `wealthmap activate <KEY>`".into()),
        SessionState::NeedsOnboarding => Some("run `wealthmap onboard <NAME>`".into()),
        SessionState::Checking | SessionState::Authorized => None,
    }
}

pub fn cmd_activate(opts: &GlobalOpts, args: &ActivateArgs) -> Result<()> {
    let ws = open_workspace(opts)?;
    let state = ws.session.activate(&args.key)?;
    let warnings = next_step(state).into_iter().collect();
    print_success(
        opts,
        json!({
            "state": state.as_str(),
            "trial": ws.session.registry().is_trial(args.key.trim()),
            "landing": state.landing_route(),
        }),
        warnings,
    )
}

pub fn cmd_onboard(opts: &GlobalOpts, args: &OnboardArgs) -> Result<()> {
    let ws = open_workspace(opts)?;
    let state = ws.session.onboard(&args.name)?;
    print_success(
        opts,
        json!({
            "state": state.as_str(),
            "name": args.name.trim(),
            "landing": state.landing_route(),
        }),
        vec![],
    )
}

pub fn cmd_status(opts: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(opts)?;
    let state = ws.session.state();
    let warnings = next_step(state).into_iter().collect();
    let mut data = json!({
        "state": state.as_str(),
        "landing": state.landing_route(),
        "dataDir": opts.data_root()?,
    });
    if state.is_authorized() {
        let totals = ws.ledger.totals();
        data["name"] = json!(ws.ledger.username());
        data["goals"] = json!(ws.ledger.goals().len());
        data["transactions"] = json!(ws.ledger.transactions().len());
        data["balance"] = json!(totals.balance);
        data["wheelAverage"] = json!(ws.ledger.wheel_average());
    }
    print_success(opts, data, warnings)
}

pub fn cmd_sign_out(opts: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(opts)?;
    let state = ws.session.sign_out();
    print_success(opts, json!({ "state": state.as_str() }), vec![])
}

/// Reports what the guard would do for `path` right now.
pub fn cmd_route(opts: &GlobalOpts, args: &RouteArgs) -> Result<()> {
    let ws = open_workspace(opts)?;
    let protected = is_protected(&args.path);
    let outcome = if protected {
        match RouteGuard::mount(ws.session.clone()).evaluate(|| ()) {
            GuardOutcome::Render(()) => json!({ "outcome": "render" }),
            GuardOutcome::Loading => json!({ "outcome": "loading" }),
            GuardOutcome::Redirect { to } => json!({ "outcome": "redirect", "to": to }),
        }
    } else {
        json!({ "outcome": "render" })
    };
    let mut data = json!({
        "path": args.path,
        "protected": protected,
        "state": ws.session.state().as_str(),
    });
    if let (Some(target), Some(extra)) = (data.as_object_mut(), outcome.as_object()) {
        target.extend(extra.clone());
    }
    print_success(opts, data, vec![])
}
