//! Key/value blob persistence
//!
//! Everything the game keeps between runs (config, the offline progress
//! queue) is a JSON string stored under a fixed key. Backends:
//! - `MemoryBlobStore`: in-process map, used by tests and as a fallback
//! - `FileBlobStore`: one file per key (native only)
//! - `LocalStorageBlobStore`: browser LocalStorage (wasm only)

use std::collections::HashMap;
use std::fmt;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local_storage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileBlobStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageBlobStore;

/// Storage backend failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend cannot be reached at all (no LocalStorage, no data dir)
    Unavailable,
    /// Backend reached but the read/write failed
    Io(String),
    /// A blob exists under the key but is not valid text
    Corrupt(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable => write!(f, "storage unavailable"),
            StorageError::Io(msg) => write!(f, "storage I/O error: {}", msg),
            StorageError::Corrupt(msg) => write!(f, "stored data is corrupt: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Durable string storage addressed by key
pub trait BlobStore {
    /// Read the blob under `key`, `None` if nothing was stored
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Replace the blob under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Delete the blob under `key` (no-op if absent)
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Move the blob under `from` to `to`, replacing whatever `to` held.
    ///
    /// Backends that can move raw bytes override this; the default copies
    /// the text and only removes `from` once the copy landed.
    fn rename(&mut self, from: &str, to: &str) -> Result<(), StorageError> {
        if let Some(value) = self.get(from)? {
            self.set(to, &value)?;
            self.remove(from)?;
        }
        Ok(())
    }
}

/// In-memory store; survives as long as the value does
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, String>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.blobs.remove(key);
        Ok(())
    }
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn rename(&mut self, from: &str, to: &str) -> Result<(), StorageError> {
        (**self).rename(from, to)
    }
}
