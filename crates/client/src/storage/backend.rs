//! Storage backends: in-memory and single-file JSON document.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::warn;

/// A string key-value store holding the client's persisted state.
///
/// Implementations must be cheap to call from synchronous code: every store
/// mutation writes through before returning, so a reload replays the last
/// known state without waiting on the network.
pub trait StorageBackend: Send + Sync {
    /// Read the raw value stored under `key`, if any.
    fn read(&self, key: &str) -> Option<String>;
    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str);
    /// Remove the value stored under `key`, if any.
    fn remove(&self, key: &str);
}

// =============================================================================
// MemoryBackend
// =============================================================================

/// In-memory backend. State is lost when the process exits.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
    }
}

// =============================================================================
// FileBackend
// =============================================================================

/// File-backed storage: the whole key-value map as one JSON object in
/// `state.json` under the configured state directory.
///
/// The document is loaded once at open and written through on every change.
/// An unreadable or malformed file is discarded and replaced with an empty
/// map - corrupt persisted state must never crash the client.
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileBackend {
    const FILE_NAME: &'static str = "state.json";

    /// Open (or create) the state document under `state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the state directory cannot be created.
    /// A corrupt or unreadable existing document is not an error; it is
    /// discarded with a warning and storage starts empty.
    pub fn open(state_dir: &std::path::Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(state_dir)?;
        let path = state_dir.join(Self::FILE_NAME);

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "discarding corrupt state file");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "state file unreadable, starting empty");
                BTreeMap::new()
            }
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Persist the current map. Failures are logged, not propagated: the
    /// in-memory copy stays authoritative for this run.
    fn flush(&self, entries: &BTreeMap<String, String>) {
        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!(path = %self.path.display(), error = %e, "failed to persist state file");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize state map"),
        }
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write(&self, key: &str, value: &str) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }
}
