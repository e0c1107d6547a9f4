//! Durable key/value storage for the persisted session record.
//!
//! The store never touches files or browser storage directly; it goes
//! through the [`Storage`] trait so tests can use [`MemoryStorage`] and a
//! native client can use [`FileStorage`].

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::SessionError;

/// A byte-oriented key/value store that outlives the process.
///
/// Calls are synchronous: the record is tiny and every backend Warden
/// targets (local files, `localStorage`) answers immediately.
pub trait Storage: Send + Sync + 'static {
    /// Reads the value under `key`. A missing key is `Ok(None)`, not an error.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SessionError>;

    /// Writes `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &[u8]) -> Result<(), SessionError>;

    /// Deletes `key`. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Storage that lives only as long as the value itself.
///
/// Share one instance between two stores (via `Arc`) to simulate a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-seeded with one entry.
    pub fn with_entry(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let storage = Self::new();
        storage.lock().insert(key.to_string(), value.into());
        storage
    }

    /// Returns a copy of the raw bytes under `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    // A panic while holding the lock cannot leave a half-written entry
    // (inserts are single operations), so a poisoned map is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SessionError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), SessionError> {
        self.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.lock().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// Storage backed by one JSON file per key inside a directory.
///
/// Writes go to a sibling `.tmp` file that is then renamed over the target,
/// so a crash mid-write leaves either the old record or the new one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Uses `dir` for storage. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file that holds `key`.
    ///
    /// Anything outside `[A-Za-z0-9._-]` is replaced with `_` so a key can
    /// never escape the directory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn io_error(key: &str, source: std::io::Error) -> SessionError {
    SessionError::Storage {
        key: key.to_string(),
        source,
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, SessionError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), SessionError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(key, e))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}
