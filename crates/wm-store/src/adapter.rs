use crate::{DynBackend, StoreError, StoreResult};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tokio::sync::broadcast;

const CHANGE_CAPACITY: usize = 64;

/// Emitted after every successful write or removal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
}

/// Typed JSON access over a [`KvBackend`](crate::KvBackend).
///
/// A detached adapter has no backend: reads yield the caller's default and
/// writes are logged no-ops. Commands that run before a data directory is
/// resolved use it so they never touch storage.
#[derive(Clone)]
pub struct StoreAdapter {
    backend: Option<DynBackend>,
    changes: broadcast::Sender<StoreChange>,
}

impl std::fmt::Debug for StoreAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreAdapter")
            .field("attached", &self.backend.is_some())
            .field("subscribers", &self.changes.receiver_count())
            .finish()
    }
}

impl StoreAdapter {
    pub fn new(backend: DynBackend) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            backend: Some(backend),
            changes,
        }
    }

    pub fn from_backend(backend: impl crate::KvBackend + 'static) -> Self {
        Self::new(Arc::new(backend))
    }

    pub fn detached() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            backend: None,
            changes,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.backend.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// Reads `key`, returning `default` when absent, unreadable or malformed.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.read_opt(key).unwrap_or(default)
    }

    /// Like [`read`](Self::read) but distinguishes absence.
    pub fn read_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, "discarding malformed stored value: {err}");
                None
            }
        }
    }

    /// Verbatim JSON text stored under `key`.
    pub fn read_raw(&self, key: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get(key) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, "storage read failed: {err}");
                None
            }
        }
    }

    /// Serializes and stores `value`. Returns whether the write reached the
    /// backend; failures are logged, never raised.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_write(key, value) {
            Ok(()) => true,
            Err(StoreError::Detached) => {
                tracing::warn!(key, "storage is not available yet; write ignored");
                false
            }
            Err(err) => {
                tracing::error!(key, "storage write failed: {err}");
                false
            }
        }
    }

    pub fn try_write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.put_raw(key, &raw)
    }

    /// Stores already-serialized JSON verbatim after checking it parses.
    pub fn try_write_raw(&self, key: &str, raw: &str) -> StoreResult<()> {
        serde_json::from_str::<serde::de::IgnoredAny>(raw)?;
        self.put_raw(key, raw)
    }

    pub fn remove(&self, key: &str) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            tracing::warn!(key, "storage is not available yet; remove ignored");
            return false;
        };
        match backend.remove(key) {
            Ok(()) => {
                self.notify(key);
                true
            }
            Err(err) => {
                tracing::error!(key, "storage remove failed: {err}");
                false
            }
        }
    }

    pub fn keys(&self) -> Vec<String> {
        let Some(backend) = self.backend.as_ref() else {
            return Vec::new();
        };
        backend.keys().unwrap_or_else(|err| {
            tracing::warn!("listing storage keys failed: {err}");
            Vec::new()
        })
    }

    /// Removes every key, one at a time.
    pub fn clear(&self) {
        for key in self.keys() {
            self.remove(&key);
        }
    }

    fn put_raw(&self, key: &str, raw: &str) -> StoreResult<()> {
        let backend = self.backend.as_ref().ok_or(StoreError::Detached)?;
        backend.set(key, raw)?;
        self.notify(key);
        Ok(())
    }

    fn notify(&self, key: &str) {
        // No subscribers is the common case.
        let _ = self.changes.send(StoreChange {
            key: key.to_string(),
        });
    }
}
