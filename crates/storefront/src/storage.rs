//! Local key-value persistence for shopper state.
//!
//! Every key holds one JSON document. [`FileStorage`] keeps one `<key>.json`
//! file per key under the data directory; [`MemoryStorage`] backs tests.
//!
//! Reads never fail the caller: a missing, unreadable or malformed document
//! loads as the type's default and logs a warning. Write failures are logged
//! and otherwise ignored.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Persisted key names.
pub mod keys {
    pub const CART: &str = "cart";
    pub const WISHLIST: &str = "wishlist";
    pub const ADDRESSES: &str = "userAddresses";
    pub const SELECTED_ADDRESS: &str = "selectedAddress";
    pub const ORDERS: &str = "orders";
}

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document for key {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string-valued key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a raw document. `Ok(None)` means the key was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium can't be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a raw document.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium can't be written.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a document. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium can't be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Shared handle to a store.
pub type Storage = Arc<dyn KeyValueStore>;

// =============================================================================
// Typed helpers
// =============================================================================

/// Decode a document, distinguishing "absent" from "broken".
///
/// # Errors
///
/// Returns an error if the document can't be read or doesn't decode as `T`.
pub fn try_load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.read(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Malformed {
            key: key.to_string(),
            source,
        })
}

/// Load a document, falling back to `T::default()` on any failure.
pub fn load<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str) -> T {
    match try_load(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to load persisted state, starting empty");
            T::default()
        }
    }
}

/// Encode and write a document.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn try_save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.write(key, &raw)
}

/// Write a document, logging failures.
pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = try_save(store, key, value) {
        tracing::error!(key, error = %e, "Failed to persist state");
    }
}

// =============================================================================
// File storage
// =============================================================================

/// One JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(key, e))?;
        // Write then rename so readers never see a half-written document
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).map_err(|e| Self::io_error(key, e))?;
        fs::rename(&tmp, self.path(key)).map_err(|e| Self::io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

// =============================================================================
// Memory storage
// =============================================================================

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("bazaar-storage-{}", uuid::Uuid::new_v4().simple()))
    }

    #[test]
    fn test_missing_key_loads_default() {
        let store = MemoryStorage::new();
        let value: Vec<String> = load(&store, keys::CART);
        assert!(value.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStorage::new();
        save(&store, keys::WISHLIST, &vec!["a".to_string(), "b".to_string()]);
        let value: Vec<String> = load(&store, keys::WISHLIST);
        assert_eq!(value, vec!["a", "b"]);
    }

    #[test]
    fn test_corrupt_document_loads_default() {
        let store = MemoryStorage::new();
        store.write(keys::CART, "{not json").unwrap();

        let value: Vec<String> = load(&store, keys::CART);
        assert!(value.is_empty());

        let err = try_load::<Vec<String>>(&store, keys::CART).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));
    }

    #[test]
    fn test_file_storage_layout() {
        let dir = temp_dir();
        let store = FileStorage::new(&dir);

        assert_eq!(store.read(keys::ORDERS).unwrap(), None);
        store.write(keys::ORDERS, "[]").unwrap();
        assert!(dir.join("orders.json").exists());
        assert_eq!(store.read(keys::ORDERS).unwrap().as_deref(), Some("[]"));

        store.remove(keys::ORDERS).unwrap();
        store.remove(keys::ORDERS).unwrap();
        assert_eq!(store.read(keys::ORDERS).unwrap(), None);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_file_storage_corrupt_file_loads_default() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("userAddresses.json"), "][").unwrap();

        let store = FileStorage::new(&dir);
        let value: Vec<String> = load(&store, keys::ADDRESSES);
        assert!(value.is_empty());

        fs::remove_dir_all(dir).unwrap();
    }
}
