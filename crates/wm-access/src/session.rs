//! Session/onboarding state, derived on every read from two persisted
//! fields: the license key and the display name.

use thiserror::Error;
use wm_model::keys;
use wm_store::StoreAdapter;

use crate::license::LicenseRegistry;

/// What the client has observed for one persisted field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// Not read yet (storage not available).
    Unloaded,
    Absent,
    Present(String),
}

impl Field {
    pub fn from_option(value: Option<String>) -> Self {
        match value {
            Some(v) => Field::Present(v),
            None => Field::Absent,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Present(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Checking,
    NeedsActivation,
    NeedsOnboarding,
    Authorized,
}

impl SessionState {
    pub fn is_authorized(self) -> bool {
        self == SessionState::Authorized
    }

    /// Where a session in this state belongs; `None` while still checking.
    pub fn landing_route(self) -> Option<&'static str> {
        match self {
            SessionState::Checking => None,
            SessionState::NeedsActivation => Some("/"),
            SessionState::NeedsOnboarding => Some("/onboarding"),
            SessionState::Authorized => Some("/dashboard"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Checking => "checking",
            SessionState::NeedsActivation => "needs-activation",
            SessionState::NeedsOnboarding => "needs-onboarding",
            SessionState::Authorized => "authorized",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single transition function. An absent and an invalid license are
/// indistinguishable here: both need activation.
pub fn derive_state(license: &Field, name: &Field, registry: &LicenseRegistry) -> SessionState {
    let key = match license {
        Field::Unloaded => return SessionState::Checking,
        Field::Absent => return SessionState::NeedsActivation,
        Field::Present(key) => key,
    };
    if !registry.is_valid(key) {
        return SessionState::NeedsActivation;
    }
    match name {
        Field::Unloaded => SessionState::Checking,
        Field::Present(name) if !name.trim().is_empty() => SessionState::Authorized,
        Field::Absent | Field::Present(_) => SessionState::NeedsOnboarding,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivationError {
    #[error("please enter a license key")]
    EmptyKey,
    #[error("invalid license key")]
    InvalidLicense,
    #[error("please enter your name")]
    EmptyName,
    #[error("activate a license before choosing a name")]
    NotActivated,
    #[error("could not save '{0}'")]
    Persist(&'static str),
}

/// Activation and onboarding over the store. Holds no state of its own:
/// every call re-reads both fields.
#[derive(Clone, Debug)]
pub struct Session {
    store: StoreAdapter,
    registry: LicenseRegistry,
}

impl Session {
    pub fn new(store: StoreAdapter, registry: LicenseRegistry) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &StoreAdapter {
        &self.store
    }

    pub fn registry(&self) -> &LicenseRegistry {
        &self.registry
    }

    pub fn fields(&self) -> (Field, Field) {
        if !self.store.is_attached() {
            return (Field::Unloaded, Field::Unloaded);
        }
        (
            Field::from_option(self.store.read_opt(keys::LICENSE_KEY)),
            Field::from_option(self.store.read_opt(keys::USERNAME)),
        )
    }

    pub fn state(&self) -> SessionState {
        let (license, name) = self.fields();
        derive_state(&license, &name, &self.registry)
    }

    /// Activation form submit. The candidate is trimmed, checked and only
    /// persisted when valid.
    pub fn activate(&self, candidate: &str) -> Result<SessionState, ActivationError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(ActivationError::EmptyKey);
        }
        if !self.registry.is_valid(candidate) {
            tracing::info!("rejected license activation attempt");
            return Err(ActivationError::InvalidLicense);
        }
        if !self.store.write(keys::LICENSE_KEY, candidate) {
            return Err(ActivationError::Persist(keys::LICENSE_KEY));
        }
        Ok(self.state())
    }

    /// Onboarding form submit.
    pub fn onboard(&self, name: &str) -> Result<SessionState, ActivationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ActivationError::EmptyName);
        }
        if self.state() == SessionState::NeedsActivation {
            return Err(ActivationError::NotActivated);
        }
        if !self.store.write(keys::USERNAME, name) {
            return Err(ActivationError::Persist(keys::USERNAME));
        }
        Ok(self.state())
    }

    /// Drops the license key; the display name and data stay.
    pub fn sign_out(&self) -> SessionState {
        self.store.remove(keys::LICENSE_KEY);
        self.state()
    }

    pub fn license_key(&self) -> Option<String> {
        self.store.read_opt(keys::LICENSE_KEY)
    }
}
