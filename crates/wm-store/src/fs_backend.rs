use crate::{KvBackend, StoreResult, io_error, validate_key};
use std::{
    fmt,
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

/// Filesystem-backed store rooted at `<root>/.wealthmap/store`, one JSON
/// document per key.
#[derive(Clone)]
pub struct FsBackend {
    dir: PathBuf,
}

impl fmt::Debug for FsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsBackend").field("dir", &self.dir).finish()
    }
}

impl FsBackend {
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = root.as_ref().join(".wealthmap").join("store");
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Writes to a sibling temp file then renames, so readers never observe a
    /// half-written document.
    fn write_replace(path: &Path, bytes: &[u8]) -> StoreResult<()> {
        let tmp = path.with_extension("json.tmp");
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)
            .map_err(|e| io_error(&tmp, e))?;
        file.write_all(bytes).map_err(|e| io_error(&tmp, e))?;
        file.sync_all().map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| io_error(path, e))
    }
}

impl KvBackend for FsBackend {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(path, err)),
        }
    }

    fn set(&self, key: &str, raw: &str) -> StoreResult<()> {
        validate_key(key)?;
        Self::write_replace(&self.entry_path(key), raw.as_bytes())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(path, err)),
        }
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&self.dir, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(key) = name.strip_suffix(".json") {
                keys.push(key.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn round_trip_and_listing() {
        let dir = TempDir::new().expect("tmp");
        let backend = FsBackend::open(dir.path()).expect("open");
        backend.set("goals", "[]").expect("set goals");
        backend.set("username", "\"Ana\"").expect("set username");
        assert_eq!(backend.get("goals").expect("get").as_deref(), Some("[]"));
        assert_eq!(backend.keys().expect("keys"), vec!["goals", "username"]);
    }

    #[test]
    fn missing_key_reads_as_none_and_remove_is_idempotent() {
        let dir = TempDir::new().expect("tmp");
        let backend = FsBackend::open(dir.path()).expect("open");
        assert_eq!(backend.get("mood").expect("get"), None);
        backend.remove("mood").expect("remove missing");
    }

    #[test]
    fn reopen_sees_previous_writes() {
        let dir = TempDir::new().expect("tmp");
        FsBackend::open(dir.path())
            .expect("open")
            .set("language", "\"es\"")
            .expect("set");
        let reopened = FsBackend::open(dir.path()).expect("reopen");
        assert_eq!(reopened.get("language").expect("get").as_deref(), Some("\"es\""));
    }
}
