//! License allowlist shared by the client and the proxy gate.
//!
//! Membership is an exact, case-sensitive string match. Callers trim input
//! before asking.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

/// Keys compiled into every build.
pub const BUILTIN_LICENSE_KEYS: &[&str] = &[
    "WHP-TEST-KEY-12345",
    "WHP-2024-PREMIUM-001",
    "WHP-2024-PREMIUM-002",
    "WHP-2024-PREMIUM-003",
    "WHP-LIFETIME-ALPHA-7F3K",
    "WHP-LIFETIME-BETA-Q9M2",
];

/// Trial keys are tracked separately and do not unlock the app.
pub const BUILTIN_TRIAL_KEYS: &[&str] = &["WHP-TRIAL-7DAY-0001", "WHP-TRIAL-7DAY-0002"];

const TRIAL_PREFIX: &str = "trial:";

#[derive(Debug, Error)]
pub enum LicenseError {
    #[error("reading license file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("license file {0:?} contains no license keys")]
    Empty(PathBuf),
}

#[derive(Clone, Debug)]
pub struct LicenseRegistry {
    keys: Arc<HashSet<String>>,
    trial_keys: Arc<HashSet<String>>,
}

impl Default for LicenseRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LicenseRegistry {
    pub fn new<K, T>(keys: K, trial_keys: T) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        Self {
            keys: Arc::new(keys.into_iter().map(Into::into).collect()),
            trial_keys: Arc::new(trial_keys.into_iter().map(Into::into).collect()),
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_LICENSE_KEYS.iter().copied(),
            BUILTIN_TRIAL_KEYS.iter().copied(),
        )
    }

    /// Loads one key per line. Blank lines and `#` comments are skipped;
    /// `trial:<key>` lines go to the trial list.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LicenseError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LicenseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::parse(&text);
        if registry.keys.is_empty() {
            return Err(LicenseError::Empty(path.to_path_buf()));
        }
        tracing::info!(
            keys = registry.keys.len(),
            trial_keys = registry.trial_keys.len(),
            "loaded license allowlist from {}",
            path.display()
        );
        Ok(registry)
    }

    pub fn parse(text: &str) -> Self {
        let mut keys = Vec::new();
        let mut trial_keys = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.strip_prefix(TRIAL_PREFIX) {
                Some(trial) => trial_keys.push(trial.trim().to_string()),
                None => keys.push(line.to_string()),
            }
        }
        Self::new(keys, trial_keys)
    }

    pub fn is_valid(&self, candidate: &str) -> bool {
        self.keys.contains(candidate)
    }

    pub fn is_trial(&self, candidate: &str) -> bool {
        self.trial_keys.contains(candidate)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
