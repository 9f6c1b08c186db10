//! Local Key-Value Store
//!
//! String values keyed by name, one file per key under the data directory.
//! Writes go to a temporary file first and are renamed into place.

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

use crate::store::error::{StorageError, StorageResult};

/// Key holding the serialized menu catalog
pub const MENU_KEY: &str = "phayao_menu";

/// Key holding the current role string
pub const ROLE_KEY: &str = "phayao_role";

/// Configuration for the local store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for all persisted keys
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("homcha_data"),
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

#[derive(Debug)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open the store, creating its directory if needed
    pub fn open(config: &StoreConfig) -> StorageResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        Ok(Self {
            dir: config.data_dir.clone(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read a raw value; a missing key is `None`
    pub fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;

        tracing::trace!(key = %key, bytes = value.len(), "Stored key");
        Ok(())
    }

    /// Delete a key; removing a missing key is not an error
    pub fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read and deserialize a JSON value
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string_pretty(value)?;
        self.set(key, &raw)
    }

    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}
