//! Durable offline queue
//!
//! The queue is a JSON array of snapshots stored under a single key. An
//! in-memory copy is kept alongside, so a failed storage write never drops a
//! snapshot for the lifetime of the process.
//!
//! A stored queue that cannot be read is moved to a quarantine key before
//! anything new is written. If that move fails the queue is locked: it keeps
//! snapshots in memory only and never touches the stored key.

use super::SyncError;
use super::snapshot::ProgressSnapshot;
use crate::persistence::{BlobStore, StorageError};

/// Storage key for queued snapshots
pub const QUEUE_KEY: &str = "offline_progress";
/// Unreadable queue contents are moved here instead of being overwritten.
/// Later quarantines get a numeric suffix.
pub const QUARANTINE_KEY: &str = "offline_progress_corrupt";
const MAX_QUARANTINE_SLOTS: u32 = 100;

/// Append-only snapshot queue over a `BlobStore`
pub struct OfflineQueue<B: BlobStore> {
    store: B,
    items: Vec<ProgressSnapshot>,
    locked: bool,
}

impl<B: BlobStore> OfflineQueue<B> {
    /// Open the queue, loading whatever a previous run left behind
    pub fn open(mut store: B) -> Self {
        let mut locked = false;
        let items = match read_from(&store) {
            Ok(items) => {
                if !items.is_empty() {
                    log::info!("Restored {} queued snapshots", items.len());
                }
                items
            }
            Err(e) => {
                log::warn!("Offline queue is unreadable ({}), quarantining it", e);
                match quarantine(&mut store) {
                    Ok(key) => log::info!("Moved unreadable queue to {}", key),
                    Err(e) => {
                        log::error!("Could not quarantine offline queue ({}), locking it", e);
                        locked = true;
                    }
                }
                Vec::new()
            }
        };
        Self {
            store,
            items,
            locked,
        }
    }

    /// True when unreadable data could not be moved aside; nothing is persisted
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Read the durable list
    pub fn read(&self) -> Result<Vec<ProgressSnapshot>, SyncError> {
        read_from(&self.store)
    }

    /// Replace the durable list
    pub fn write(&mut self, items: &[ProgressSnapshot]) -> Result<(), SyncError> {
        self.items = items.to_vec();
        self.persist()
    }

    /// Drop everything
    pub fn clear(&mut self) -> Result<(), SyncError> {
        self.items.clear();
        self.remove_stored()
    }

    /// Append one snapshot. It stays queued in memory even if persisting fails.
    pub fn append(&mut self, snapshot: ProgressSnapshot) -> Result<(), SyncError> {
        self.items.push(snapshot);
        self.persist()
    }

    /// Remove the oldest `count` snapshots (the batch that was delivered)
    pub fn drain_front(&mut self, count: usize) -> Result<(), SyncError> {
        let count = count.min(self.items.len());
        self.items.drain(..count);
        if self.items.is_empty() {
            self.remove_stored()
        } else {
            self.persist()
        }
    }

    /// Queued snapshots, oldest first
    pub fn items(&self) -> &[ProgressSnapshot] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Hand back the storage backend
    pub fn into_store(self) -> B {
        self.store
    }

    fn remove_stored(&mut self) -> Result<(), SyncError> {
        if self.locked {
            return Err(SyncError::QueueLocked);
        }
        self.store.remove(QUEUE_KEY)?;
        Ok(())
    }

    fn persist(&mut self) -> Result<(), SyncError> {
        if self.locked {
            return Err(SyncError::QueueLocked);
        }
        let json = serde_json::to_string(&self.items)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;
        self.store.set(QUEUE_KEY, &json)?;
        Ok(())
    }
}

fn read_from(store: &impl BlobStore) -> Result<Vec<ProgressSnapshot>, SyncError> {
    match store.get(QUEUE_KEY)? {
        Some(json) => {
            serde_json::from_str(&json).map_err(|e| SyncError::Serialization(e.to_string()))
        }
        None => Ok(Vec::new()),
    }
}

/// Move the stored queue to the first free quarantine key
fn quarantine(store: &mut impl BlobStore) -> Result<String, StorageError> {
    let key = (0..MAX_QUARANTINE_SLOTS)
        .map(|n| match n {
            0 => QUARANTINE_KEY.to_string(),
            n => format!("{}_{}", QUARANTINE_KEY, n),
        })
        // An unreadable slot counts as taken
        .find(|key| matches!(store.get(key), Ok(None)))
        .ok_or_else(|| StorageError::Io("no free quarantine slot".into()))?;
    store.rename(QUEUE_KEY, &key)?;
    Ok(key)
}
