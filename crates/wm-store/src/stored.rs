use crate::StoreAdapter;
use serde::{Serialize, de::DeserializeOwned};

/// In-memory mirror of one stored key.
///
/// The mirror only changes after the backend accepted a write, so after a
/// failed write it keeps showing the last persisted value.
#[derive(Debug, Clone)]
pub struct Stored<T> {
    store: StoreAdapter,
    key: String,
    default: T,
    value: T,
}

impl<T> Stored<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn load(store: &StoreAdapter, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = store.read(&key, default.clone());
        Self {
            store: store.clone(),
            key,
            default,
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) -> bool {
        if self.store.write(&self.key, &value) {
            self.value = value;
            true
        } else {
            false
        }
    }

    /// Applies `f` to a copy and persists it.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> bool {
        let mut next = self.value.clone();
        f(&mut next);
        self.set(next)
    }

    /// Re-reads the backend, e.g. after a change notification.
    pub fn reload(&mut self) {
        self.value = self.store.read(&self.key, self.default.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemBackend;

    #[test]
    fn mirror_keeps_last_persisted_value_on_failure() {
        let store = StoreAdapter::from_backend(MemBackend::with_quota(24));
        let mut names: Stored<Vec<String>> = Stored::load(&store, "names", Vec::new());
        assert!(names.update(|n| n.push("Ana".into())));
        assert!(!names.update(|n| n.push("a name that will not fit".into())));
        assert_eq!(names.get(), &vec!["Ana".to_string()]);
        assert_eq!(store.read::<Vec<String>>("names", Vec::new()), vec!["Ana"]);
    }

    #[test]
    fn reload_observes_external_writes() {
        let store = StoreAdapter::from_backend(MemBackend::new());
        let mut mood: Stored<String> = Stored::load(&store, "mood", "neutral".into());
        assert_eq!(mood.get(), "neutral");
        store.write("mood", "great");
        assert_eq!(mood.get(), "neutral");
        mood.reload();
        assert_eq!(mood.get(), "great");
    }
}
