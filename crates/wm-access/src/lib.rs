//! License gating for the client and the proxy: the shared license registry,
//! the session/onboarding state machine and the route guard.

pub mod guard;
pub mod license;
pub mod session;

pub use guard::{ACTIVATION_ROUTE, GuardOutcome, RouteGuard, is_protected};
pub use license::{LicenseError, LicenseRegistry};
pub use session::{ActivationError, Field, Session, SessionState, derive_state};
