use tokio::sync::broadcast::{self, error::TryRecvError};
use wm_model::keys;
use wm_store::StoreChange;

use crate::session::{Session, SessionState};

/// Entry point unauthorized sessions are sent back to.
pub const ACTIVATION_ROUTE: &str = "/";

const PROTECTED_ROUTES: &[&str] = &[
    "/dashboard",
    "/goals",
    "/transactions",
    "/wealth-wheel",
    "/reflections",
    "/investments",
    "/coach",
    "/chat",
    "/insights",
    "/settings",
];

/// Whether `path` sits behind the guard.
pub fn is_protected(path: &str) -> bool {
    PROTECTED_ROUTES.iter().any(|route| {
        path == *route
            || path
                .strip_prefix(route)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

#[derive(Debug, PartialEq, Eq)]
pub enum GuardOutcome<T> {
    Render(T),
    /// Authorization not confirmed yet; show the placeholder.
    Loading,
    /// Show the placeholder while navigating to `to`.
    Redirect { to: &'static str },
}

impl<T> GuardOutcome<T> {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardOutcome::Render(_))
    }
}

/// Wraps a protected view. Nothing is cached: every evaluation re-derives the
/// session from storage, and the render closure only runs when authorized.
#[derive(Debug)]
pub struct RouteGuard {
    session: Session,
    changes: broadcast::Receiver<StoreChange>,
}

impl RouteGuard {
    pub fn mount(session: Session) -> Self {
        let changes = session.store().subscribe();
        Self { session, changes }
    }

    pub fn evaluate<T>(&self, render: impl FnOnce() -> T) -> GuardOutcome<T> {
        match self.session.state() {
            SessionState::Authorized => GuardOutcome::Render(render()),
            SessionState::Checking => GuardOutcome::Loading,
            SessionState::NeedsActivation | SessionState::NeedsOnboarding => {
                tracing::debug!("guard redirecting unauthorized session");
                GuardOutcome::Redirect {
                    to: ACTIVATION_ROUTE,
                }
            }
        }
    }

    /// Drains pending store notifications. Returns true when a field the
    /// guard depends on changed, meaning the view must be re-evaluated.
    pub fn dependencies_changed(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.changes.try_recv() {
                Ok(change) => {
                    changed |= change.key == keys::LICENSE_KEY || change.key == keys::USERNAME;
                }
                Err(TryRecvError::Lagged(_)) => changed = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return changed,
            }
        }
    }
}
