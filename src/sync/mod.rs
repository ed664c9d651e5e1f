//! Offline-first progress sync
//!
//! Features:
//! - Durable local queue of progress snapshots (survives restarts)
//! - Batch flush on reconnect, plus a periodic fallback
//! - Connection retry with linear backoff, then a standing offline mode
//! - Local login rate limiting
//!
//! Nothing in here ever blocks or fails the simulation: every error ends up
//! as queue contents plus a pending-retry flag.

pub mod auth;
pub mod connection;
pub mod manager;
pub mod queue;
pub mod remote;
pub mod snapshot;

use std::fmt;

pub use auth::{AuthSession, Credentials, LoginThrottle, sign_in};
pub use connection::{ConnectionMonitor, ConnectionState};
pub use manager::{FlushBatch, FlushOutcome, SaveAction, SyncManager, SyncStatus};
pub use queue::OfflineQueue;
pub use remote::{OfflineStore, PROGRESS_TABLE, RemoteError, RemoteStore};
pub use snapshot::ProgressSnapshot;

use crate::persistence::StorageError;

#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Too many failed logins; rejected without contacting the remote
    RateLimited { retry_after_ms: f64 },
    Storage(StorageError),
    Remote(RemoteError),
    Serialization(String),
    /// Unreadable queue data could not be moved aside, so the queue will not
    /// write over it
    QueueLocked,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::RateLimited { retry_after_ms } => write!(
                f,
                "too many login attempts, try again in {} minutes",
                (retry_after_ms / 60_000.0).ceil()
            ),
            SyncError::Storage(e) => write!(f, "{}", e),
            SyncError::Remote(e) => write!(f, "{}", e),
            SyncError::Serialization(msg) => write!(f, "serialization error: {}", msg),
            SyncError::QueueLocked => {
                write!(f, "offline queue is locked over unreadable data")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Storage(e) => Some(e),
            SyncError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageError> for SyncError {
    fn from(e: StorageError) -> Self {
        SyncError::Storage(e)
    }
}

impl From<RemoteError> for SyncError {
    fn from(e: RemoteError) -> Self {
        SyncError::Remote(e)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::{Cell, RefCell};

    use super::{Credentials, ProgressSnapshot, RemoteError, RemoteStore};

    /// Records every call; fails them all while `failing` is set
    #[derive(Default)]
    pub struct MockRemote {
        failing: Cell<bool>,
        inserts: RefCell<Vec<(String, Vec<ProgressSnapshot>)>>,
        connects: Cell<u32>,
        auths: Cell<u32>,
    }

    impl MockRemote {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            self.failing.set(failing);
        }

        pub fn insert_calls(&self) -> Vec<(String, Vec<ProgressSnapshot>)> {
            self.inserts.borrow().clone()
        }

        pub fn connect_calls(&self) -> u32 {
            self.connects.get()
        }

        pub fn auth_calls(&self) -> u32 {
            self.auths.get()
        }

        fn outcome(&self) -> Result<(), RemoteError> {
            if self.failing.get() {
                Err(RemoteError::Unreachable)
            } else {
                Ok(())
            }
        }
    }

    impl RemoteStore for MockRemote {
        async fn connect(&self) -> Result<(), RemoteError> {
            self.connects.set(self.connects.get() + 1);
            self.outcome()
        }

        async fn insert(&self, table: &str, records: &[ProgressSnapshot]) -> Result<(), RemoteError> {
            self.inserts
                .borrow_mut()
                .push((table.to_string(), records.to_vec()));
            self.outcome()
        }

        async fn authenticate(&self, credentials: &Credentials) -> Result<String, RemoteError> {
            self.auths.set(self.auths.get() + 1);
            self.outcome()?;
            Ok(format!("user-{}", credentials.email))
        }
    }
}
