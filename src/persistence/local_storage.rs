//! Browser LocalStorage backend

use web_sys::Storage;

use super::{BlobStore, StorageError};

/// Blob store over `window.localStorage`, keys namespaced with a prefix
pub struct LocalStorageBlobStore {
    storage: Storage,
    prefix: &'static str,
}

impl LocalStorageBlobStore {
    /// Grab the window's LocalStorage (fails in private mode / sandboxed iframes)
    pub fn open(prefix: &'static str) -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage, prefix })
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key)
    }
}

impl BlobStore for LocalStorageBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(&self.full_key(key))
            .map_err(|e| StorageError::Io(format!("{:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(&self.full_key(key), value)
            .map_err(|e| StorageError::Io(format!("{:?}", e)))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage
            .remove_item(&self.full_key(key))
            .map_err(|e| StorageError::Io(format!("{:?}", e)))
    }
}
