//! Remote store contract
//!
//! The backing service is reached only through this narrow interface; the
//! transport behind it is swappable.

use std::fmt;
use std::future::Future;

use super::auth::Credentials;
use super::snapshot::ProgressSnapshot;

/// Table progress snapshots are inserted into
pub const PROGRESS_TABLE: &str = "game_progress";

/// Remote call failure. Always treated as transient by the sync layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No route to the service
    Unreachable,
    /// Service refused the request
    Rejected(String),
    /// Bad or expired credentials
    Unauthorized,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Unreachable => write!(f, "remote store unreachable"),
            RemoteError::Rejected(reason) => write!(f, "remote store rejected request: {}", reason),
            RemoteError::Unauthorized => write!(f, "not authorized"),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Backing store for progress and accounts
pub trait RemoteStore {
    /// Establish (or verify) a connection to the service
    fn connect(&self) -> impl Future<Output = Result<(), RemoteError>>;

    /// Insert a batch of records into `table` in one request
    fn insert(
        &self,
        table: &str,
        records: &[ProgressSnapshot],
    ) -> impl Future<Output = Result<(), RemoteError>>;

    /// Check credentials, returning the account's user id
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<String, RemoteError>>;
}

/// Store that is never reachable; everything stays in the offline queue
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineStore;

impl RemoteStore for OfflineStore {
    async fn connect(&self) -> Result<(), RemoteError> {
        Err(RemoteError::Unreachable)
    }

    async fn insert(&self, _table: &str, _records: &[ProgressSnapshot]) -> Result<(), RemoteError> {
        Err(RemoteError::Unreachable)
    }

    async fn authenticate(&self, _credentials: &Credentials) -> Result<String, RemoteError> {
        Err(RemoteError::Unreachable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;

    #[test]
    fn test_offline_store_never_accepts() {
        let store = OfflineStore;
        assert_eq!(block_on(store.connect()), Err(RemoteError::Unreachable));
        assert_eq!(
            block_on(store.insert(PROGRESS_TABLE, &[])),
            Err(RemoteError::Unreachable)
        );
        let creds = Credentials::new("parent@example.com", "secret");
        assert_eq!(
            block_on(store.authenticate(&creds)),
            Err(RemoteError::Unreachable)
        );
    }
}
