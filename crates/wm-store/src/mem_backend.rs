use crate::{KvBackend, StoreError, StoreResult, validate_key};
use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

/// In-memory backend with an optional byte quota over all keys and values.
#[derive(Clone, Default)]
pub struct MemBackend {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    quota: Option<usize>,
}

impl std::fmt::Debug for MemBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.entries.read().map(|e| e.len()).unwrap_or_default();
        f.debug_struct("MemBackend")
            .field("entries", &len)
            .field("quota", &self.quota)
            .finish()
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Arc::default(),
            quota: Some(quota),
        }
    }

    fn used_without(map: &BTreeMap<String, String>, key: &str) -> usize {
        map.iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KvBackend for MemBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let guard = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, raw: &str) -> StoreResult<()> {
        validate_key(key)?;
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(quota) = self.quota {
            let needed = Self::used_without(&guard, key) + key.len() + raw.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    quota,
                });
            }
        }
        guard.insert(key.to_string(), raw.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut guard = self.entries.write().unwrap_or_else(|e| e.into_inner());
        guard.remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let guard = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.keys().cloned().collect())
    }
}
