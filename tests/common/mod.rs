//! Shared integration test helpers.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use dental_defenders::config::GameConfig;
use dental_defenders::sim::GameSession;
use dental_defenders::sync::{Credentials, ProgressSnapshot, RemoteError, RemoteStore};

/// Session whose spawner stays idle so tests place every entity
pub fn quiet_session() -> GameSession {
    let config = GameConfig {
        spawn_interval: 1_000_000,
        powerup_interval: 1_000_000,
        ..Default::default()
    };
    GameSession::new(7, config)
}

/// Remote store that records inserts and can be switched to failing
#[derive(Default)]
pub struct RecordingRemote {
    reachable: Cell<bool>,
    batches: RefCell<Vec<Vec<ProgressSnapshot>>>,
}

impl RecordingRemote {
    pub fn reachable() -> Self {
        let remote = Self::default();
        remote.reachable.set(true);
        remote
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.set(reachable);
    }

    /// Every batch handed to `insert`, delivered or not
    pub fn batches(&self) -> Vec<Vec<ProgressSnapshot>> {
        self.batches.borrow().clone()
    }

    fn result(&self) -> Result<(), RemoteError> {
        if self.reachable.get() {
            Ok(())
        } else {
            Err(RemoteError::Unreachable)
        }
    }
}

impl RemoteStore for RecordingRemote {
    async fn connect(&self) -> Result<(), RemoteError> {
        self.result()
    }

    async fn insert(&self, _table: &str, records: &[ProgressSnapshot]) -> Result<(), RemoteError> {
        self.batches.borrow_mut().push(records.to_vec());
        self.result()
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<String, RemoteError> {
        self.result()?;
        Ok(format!("parent-{}", credentials.email))
    }
}
