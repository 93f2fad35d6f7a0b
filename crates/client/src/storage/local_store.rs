//! Typed JSON accessors over a storage backend.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::StorageBackend;

/// Typed wrapper over a [`StorageBackend`].
///
/// All persisted client state flows through this handle - nothing touches a
/// backend directly, so the in-memory and persisted copies cannot diverge.
///
/// A stored value that fails to parse is removed and reported as absent;
/// the caller falls back to its empty default.
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn StorageBackend>,
}

impl LocalStore {
    /// Wrap a backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Create an in-memory store. Convenience for tests and ephemeral use.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(super::MemoryBackend::new()))
    }

    /// Read and deserialize the value under `key`.
    ///
    /// Returns `None` when the key is absent. A value that fails to parse
    /// is removed (corruption recovery) and also reported as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.read(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "removing corrupt stored value");
                self.backend.remove(key);
                None
            }
        }
    }

    /// Serialize and store `value` under `key`.
    ///
    /// Serialization of the client's own state types cannot fail in
    /// practice; if it somehow does, the previous value is left in place
    /// and a warning is logged.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.backend.write(key, &json),
            Err(e) => warn!(key, error = %e, "failed to serialize value for storage"),
        }
    }

    /// Read the raw string under `key` without JSON decoding.
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.backend.read(key)
    }

    /// Store a raw string under `key` without JSON encoding.
    pub fn set_raw(&self, key: &str, value: &str) {
        self.backend.write(key, value);
    }

    /// Remove the value under `key`.
    pub fn remove(&self, key: &str) {
        self.backend.remove(key);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        id: i64,
        name: String,
    }

    #[test]
    fn test_typed_roundtrip() {
        let store = LocalStore::in_memory();
        let snapshot = Snapshot {
            id: 7,
            name: "ThinkPad".to_string(),
        };

        store.set("product", &snapshot);
        assert_eq!(store.get::<Snapshot>("product"), Some(snapshot));
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = LocalStore::in_memory();
        assert_eq!(store.get::<Snapshot>("missing"), None);
    }

    #[test]
    fn test_corrupt_value_is_removed() {
        let store = LocalStore::in_memory();
        store.set_raw("product", "{broken");

        assert_eq!(store.get::<Snapshot>("product"), None);
        // The corrupt value is gone, not just skipped.
        assert_eq!(store.get_raw("product"), None);
    }

    #[test]
    fn test_remove() {
        let store = LocalStore::in_memory();
        store.set("n", &1);
        store.remove("n");
        assert_eq!(store.get::<i64>("n"), None);
    }
}
