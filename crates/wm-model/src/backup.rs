//! Backup file: one JSON object holding the verbatim persisted JSON of every
//! allow-listed key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use wm_store::StoreAdapter;

use crate::ModelError;
use crate::keys::{BACKUP_KEYS, is_backup_key};

#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Backup {
    entries: BTreeMap<String, Box<RawValue>>,
}

impl Backup {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|raw| raw.get())
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(ModelError::BackupFormat)
    }

    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        serde_json::from_str(text).map_err(ModelError::BackupFormat)
    }
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub restored: Vec<String>,
    pub ignored: Vec<String>,
    pub failed: Vec<String>,
}

impl RestoreReport {
    /// Restored values only show up once every component re-reads storage.
    pub fn reload_required(&self) -> bool {
        !self.restored.is_empty()
    }
}

/// Collects every allow-listed key present in the store. Values that no
/// longer parse are skipped with a warning.
pub fn export_backup(store: &StoreAdapter) -> Backup {
    let mut entries = BTreeMap::new();
    for key in BACKUP_KEYS {
        let Some(raw) = store.read_raw(key) else {
            continue;
        };
        match RawValue::from_string(raw) {
            Ok(value) => {
                entries.insert((*key).to_string(), value);
            }
            Err(err) => tracing::warn!(key, "leaving malformed value out of backup: {err}"),
        }
    }
    Backup { entries }
}

/// Overwrites allow-listed keys one at a time. Unknown keys are ignored and a
/// failed key does not stop the rest; there is no rollback.
pub fn import_backup(store: &StoreAdapter, backup: &Backup) -> RestoreReport {
    let mut report = RestoreReport::default();
    for (key, raw) in &backup.entries {
        if !is_backup_key(key) {
            report.ignored.push(key.clone());
            continue;
        }
        match store.try_write_raw(key, raw.get()) {
            Ok(()) => report.restored.push(key.clone()),
            Err(err) => {
                tracing::error!(key = key.as_str(), "restoring key failed: {err}");
                report.failed.push(key.clone());
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use wm_store::MemBackend;

    #[test]
    fn import_ignores_unknown_keys_and_license() {
        let store = StoreAdapter::from_backend(MemBackend::new());
        let backup = Backup::from_json(
            r#"{"username":"Ana","license_key":"WHP-TEST-KEY-12345","theme":"dark"}"#,
        )
        .expect("parse");
        let report = import_backup(&store, &backup);
        assert_eq!(report.restored, vec!["username"]);
        assert_eq!(report.ignored, vec!["license_key", "theme"]);
        assert!(report.reload_required());
        assert_eq!(store.read_raw(keys::USERNAME).as_deref(), Some("\"Ana\""));
        assert_eq!(store.read_raw(keys::LICENSE_KEY), None);
    }

    #[test]
    fn backup_must_be_an_object() {
        assert!(matches!(
            Backup::from_json("[1,2,3]"),
            Err(ModelError::BackupFormat(_))
        ));
    }

    #[test]
    fn export_skips_absent_keys() {
        let store = StoreAdapter::from_backend(MemBackend::new());
        store.write(keys::MOOD, "good");
        let backup = export_backup(&store);
        assert_eq!(backup.keys().collect::<Vec<_>>(), vec!["mood"]);
        assert_eq!(backup.get("mood"), Some("\"good\""));
    }
}
