//! JSON key-value persistence with pluggable backends plus same-process change
//! notifications.
//!
//! Every other client component reads and writes through [`StoreAdapter`].
//! Failures never escape as errors from the high-level API: reads fall back to
//! the caller's default and writes log and report `false`.

mod adapter;
mod fs_backend;
mod mem_backend;
mod stored;

pub use adapter::{StoreAdapter, StoreChange};
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use stored::Stored;

use std::{io, path::PathBuf, sync::Arc};

pub type StoreResult<T> = Result<T, StoreError>;
pub type DynBackend = Arc<dyn KvBackend>;

/// Raw string storage keyed by name. Values are JSON text.
pub trait KvBackend: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, raw: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
    fn keys(&self) -> StoreResult<Vec<String>>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("quota exceeded writing '{key}': {needed} bytes needed, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
    #[error("no storage backend is attached")]
    Detached,
}

pub(crate) fn io_error(path: impl Into<PathBuf>, err: io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source: err,
    }
}

/// Keys map to file names, so they are restricted to a portable character set.
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
