//! Durable client-side key/value storage.
//!
//! Holds the bearer token (and the username it belongs to) between runs, the
//! way a browser client keeps them in local storage.

use mockall::automock;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the username the stored token belongs to.
pub const USERNAME_KEY: &str = "username";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot access client storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("Client storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// String key/value storage that survives restarts.
///
/// Implementations take `&self`; any interior mutability is their own
/// business.
#[automock]
pub trait ClientStorage {
    /// Reads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// * `Result<Option<String>, StorageError>` - The value, `None` if the key was never set
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removes `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage backed by a JSON object in a single file.
///
/// A missing file reads as empty storage; the file and its parent
/// directories are created on the first write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        debug!(path = %self.path.display(), entries = entries.len(), "Wrote client storage");
        Ok(())
    }
}

impl ClientStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}

/// In-process storage, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod file_storage_tests {
        use super::*;

        #[test]
        fn test_missing_file_reads_as_empty() {
            // Arrange
            let dir = tempfile::tempdir().unwrap();
            let storage = FileStorage::new(dir.path().join("storage.json"));

            // Act
            let token = storage.get(TOKEN_KEY).unwrap();

            // Assert
            assert_eq!(token, None);
        }

        #[test]
        fn test_set_creates_parent_directories_and_persists() {
            // Arrange
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("storage.json");
            let storage = FileStorage::new(&path);

            // Act
            storage.set(TOKEN_KEY, "abc123").unwrap();
            storage.set(USERNAME_KEY, "admin").unwrap();

            // Assert: a fresh handle on the same file sees both values
            let reopened = FileStorage::new(&path);
            assert_eq!(reopened.get(TOKEN_KEY).unwrap(), Some("abc123".to_string()));
            assert_eq!(reopened.get(USERNAME_KEY).unwrap(), Some("admin".to_string()));
        }

        #[test]
        fn test_remove_keeps_other_keys() {
            let dir = tempfile::tempdir().unwrap();
            let storage = FileStorage::new(dir.path().join("storage.json"));
            storage.set(TOKEN_KEY, "abc123").unwrap();
            storage.set("theme", "dark").unwrap();

            storage.remove(TOKEN_KEY).unwrap();

            assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
            assert_eq!(storage.get("theme").unwrap(), Some("dark".to_string()));
        }

        #[test]
        fn test_remove_on_missing_file_does_not_create_it() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("storage.json");
            let storage = FileStorage::new(&path);

            storage.remove(TOKEN_KEY).unwrap();

            assert!(!path.exists());
        }

        #[test]
        fn test_corrupt_file_is_reported() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("storage.json");
            fs::write(&path, "not json").unwrap();
            let storage = FileStorage::new(&path);

            let result = storage.get(TOKEN_KEY);

            assert!(matches!(result, Err(StorageError::Corrupt(_))));
        }
    }

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();

        storage.set(TOKEN_KEY, "abc123").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), Some("abc123".to_string()));

        storage.remove(TOKEN_KEY).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert!(storage.is_empty());
    }
}
