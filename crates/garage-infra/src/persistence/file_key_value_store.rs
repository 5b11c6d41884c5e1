//! File-based implementation of KeyValueStore
//!
//! Each key lives in its own file inside the store directory, so the vehicle
//! collection and the selection can be rewritten independently.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use garage_domain::KeyValueStore;
use garage_types::{Result, StoreError};

const VALUE_EXTENSION: &str = "kv";

/// Directory-backed key-value store
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    store_dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open a store rooted at `store_dir`, creating the directory if needed
    pub fn open(store_dir: impl Into<PathBuf>) -> Result<Self> {
        let store_dir = store_dir.into();
        fs::create_dir_all(&store_dir)?;
        tracing::debug!(dir = %store_dir.display(), "file store opened");
        Ok(Self { store_dir })
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    /// File holding `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.store_dir
            .join(format!("{}.{}", encode_key(key), VALUE_EXTENSION))
    }
}

/// Map a key onto a safe file stem.
///
/// Bytes outside `[A-Za-z0-9_-]` are written as `%XX`, so distinct keys never
/// share a file. The empty key maps to `%`.
fn encode_key(key: &str) -> String {
    if key.is_empty() {
        return "%".to_string();
    }
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io(format!("{}: {}", path.display(), e))
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))?;
        tracing::debug!(key, bytes = value.len(), "value written");
        Ok(())
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}
