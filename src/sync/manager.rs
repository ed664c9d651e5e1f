//! Offline-first sync manager
//!
//! Snapshots are pushed in from the game; the manager decides whether to
//! write them remotely or queue them, and flushes the queue when connectivity
//! returns or the periodic timer fires. Every remote call is split into a
//! `begin_*` / `complete_*` pair so a caller holding the manager behind a
//! `RefCell` never keeps it borrowed across an await.

use super::auth::AuthSession;
use super::connection::{ConnectionMonitor, ConnectionState};
use super::queue::OfflineQueue;
use super::remote::{PROGRESS_TABLE, RemoteError, RemoteStore};
use super::snapshot::ProgressSnapshot;
use crate::config::SyncConfig;
use crate::persistence::BlobStore;

/// What `begin_save` decided
#[derive(Debug, Clone, PartialEq)]
pub enum SaveAction {
    /// Write this snapshot remotely, then report via `complete_save`
    Send(ProgressSnapshot),
    /// Snapshot went straight to the offline queue
    Queued,
}

/// A queued batch checked out for delivery
#[derive(Debug, Clone, PartialEq)]
pub struct FlushBatch {
    records: Vec<ProgressSnapshot>,
}

impl FlushBatch {
    pub fn records(&self) -> &[ProgressSnapshot] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of a flush attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing to do, or not eligible right now
    Skipped,
    /// Batch of this many snapshots accepted remotely
    Delivered(usize),
    /// Remote rejected the batch; it stays queued
    Failed,
}

/// Passive indicator for the HUD
#[derive(Debug, Clone, PartialEq)]
pub struct SyncStatus {
    pub online: bool,
    pub offline_mode: bool,
    pub signed_in: bool,
    pub queued: usize,
    pub pending_retry: bool,
    pub in_flight: bool,
    pub last_sync_ms: Option<f64>,
}

pub struct SyncManager<B: BlobStore> {
    queue: OfflineQueue<B>,
    config: SyncConfig,
    connection: ConnectionMonitor,
    account: Option<AuthSession>,
    online: bool,
    in_flight: bool,
    pending_retry: bool,
    next_periodic_ms: f64,
    last_sync_ms: Option<f64>,
}

impl<B: BlobStore> SyncManager<B> {
    pub fn new(store: B, config: SyncConfig, online: bool, now_ms: f64) -> Self {
        let queue = OfflineQueue::open(store);
        let pending_retry = !queue.is_empty();
        Self {
            connection: ConnectionMonitor::new(&config),
            next_periodic_ms: now_ms + config.flush_interval_ms,
            queue,
            config,
            account: None,
            online,
            in_flight: false,
            pending_retry,
            last_sync_ms: None,
        }
    }

    /// Whether remote writes may be attempted right now
    pub fn is_eligible(&self, now_ms: f64) -> bool {
        self.online
            && !self.config.offline_mode
            && !self.connection.is_offline()
            && self
                .account
                .as_ref()
                .is_some_and(|a| !a.is_expired(now_ms, self.config.session_timeout_ms))
    }

    fn profile_id(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.user_id.as_str())
    }

    // === Accounts ===

    /// Attach or detach the signed-in account
    pub fn set_account(&mut self, account: Option<AuthSession>) {
        match &account {
            Some(a) => log::info!("Progress sync enabled for {}", a.user_id),
            None => log::info!("Progress sync disabled (signed out)"),
        }
        self.account = account;
    }

    /// Player activity keeps the account session alive
    pub fn note_activity(&mut self, now_ms: f64) {
        if let Some(account) = &mut self.account {
            account.touch(now_ms);
        }
    }

    // === Saving ===

    /// Route a snapshot: remote if eligible, otherwise the offline queue
    pub fn begin_save(&mut self, snapshot: ProgressSnapshot, now_ms: f64) -> SaveAction {
        if self.is_eligible(now_ms) {
            SaveAction::Send(snapshot.stamped(self.profile_id()))
        } else {
            log::debug!("Offline, queueing snapshot (score {})", snapshot.score);
            self.enqueue(snapshot);
            SaveAction::Queued
        }
    }

    /// Report the outcome of a `SaveAction::Send`
    pub fn complete_save(
        &mut self,
        snapshot: ProgressSnapshot,
        result: Result<(), RemoteError>,
        now_ms: f64,
    ) {
        match result {
            Ok(()) => {
                self.last_sync_ms = Some(now_ms);
                log::info!("Progress saved (score {})", snapshot.score);
            }
            Err(e) => {
                log::warn!("Failed to save progress ({}), queued for later", e);
                self.enqueue(snapshot);
                self.pending_retry = true;
            }
        }
    }

    /// Save a snapshot end to end
    pub async fn save<R: RemoteStore>(
        &mut self,
        remote: &R,
        snapshot: ProgressSnapshot,
        now_ms: f64,
    ) {
        if let SaveAction::Send(snapshot) = self.begin_save(snapshot, now_ms) {
            let result = remote.insert(PROGRESS_TABLE, std::slice::from_ref(&snapshot)).await;
            self.complete_save(snapshot, result, now_ms);
        }
    }

    fn enqueue(&mut self, snapshot: ProgressSnapshot) {
        if let Err(e) = self.queue.append(snapshot) {
            // Still held in memory; the next successful write persists it
            log::warn!("Could not persist offline queue: {}", e);
        }
    }

    // === Flushing ===

    /// Check out the whole queue for delivery.
    /// `None` if a flush is already in flight, the queue is empty, or the
    /// remote is not reachable.
    pub fn begin_flush(&mut self, now_ms: f64) -> Option<FlushBatch> {
        if self.in_flight {
            log::debug!("Flush already in flight");
            return None;
        }
        if self.queue.is_empty() {
            return None;
        }
        if !self.is_eligible(now_ms) {
            self.pending_retry = true;
            return None;
        }

        self.in_flight = true;
        let profile_id = self.profile_id();
        let records = self
            .queue
            .items()
            .iter()
            .cloned()
            .map(|s| s.stamped(profile_id))
            .collect();
        Some(FlushBatch { records })
    }

    /// Report the outcome of delivering `batch`
    pub fn complete_flush(
        &mut self,
        batch: FlushBatch,
        result: Result<(), RemoteError>,
        now_ms: f64,
    ) -> FlushOutcome {
        self.in_flight = false;
        match result {
            Ok(()) => {
                // Only the delivered prefix; anything queued meanwhile stays
                if let Err(e) = self.queue.drain_front(batch.len()) {
                    log::warn!("Could not update offline queue after sync: {}", e);
                }
                self.pending_retry = !self.queue.is_empty();
                self.last_sync_ms = Some(now_ms);
                log::info!("Synced {} offline snapshots", batch.len());
                FlushOutcome::Delivered(batch.len())
            }
            Err(e) => {
                log::warn!("Error syncing offline progress: {}", e);
                self.pending_retry = true;
                FlushOutcome::Failed
            }
        }
    }

    /// Flush the queue end to end
    pub async fn flush<R: RemoteStore>(&mut self, remote: &R, now_ms: f64) -> FlushOutcome {
        let Some(batch) = self.begin_flush(now_ms) else {
            return FlushOutcome::Skipped;
        };
        let result = remote.insert(PROGRESS_TABLE, batch.records()).await;
        self.complete_flush(batch, result, now_ms)
    }

    /// Final best-effort batch when the game is closing
    pub fn shutdown_batch(&mut self, now_ms: f64) -> Option<FlushBatch> {
        log::info!("Shutting down sync ({} queued)", self.queue.len());
        self.begin_flush(now_ms)
    }

    // === Triggers ===

    /// Connectivity changed. Returns true when a flush should run now.
    pub fn set_online(&mut self, online: bool) -> bool {
        let was_online = self.online;
        self.online = online;

        if online && !was_online {
            log::info!("Connection restored");
            self.connection.reset();
            !self.queue.is_empty()
        } else if !online && was_online {
            log::info!("Connection lost, saving progress locally");
            self.connection.disconnect();
            self.pending_retry = true;
            false
        } else {
            false
        }
    }

    /// Periodic fallback. Returns true when a flush should run now.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        if now_ms < self.next_periodic_ms {
            return false;
        }
        self.next_periodic_ms = now_ms + self.config.flush_interval_ms;
        !self.queue.is_empty() && self.is_eligible(now_ms)
    }

    // === Connection establishment ===

    /// Start a connect attempt if the retry schedule allows one
    pub fn begin_connect(&mut self, now_ms: f64) -> Option<u32> {
        if !self.online || self.config.offline_mode {
            return None;
        }
        self.connection.begin_attempt(now_ms)
    }

    /// Report a connect attempt. Returns true when a flush should follow.
    pub fn complete_connect(&mut self, result: Result<(), RemoteError>, now_ms: f64) -> bool {
        match result {
            Ok(()) => {
                self.connection.on_success();
                !self.queue.is_empty()
            }
            Err(e) => {
                log::warn!("Connection attempt failed: {}", e);
                self.connection.on_failure(now_ms);
                false
            }
        }
    }

    /// Run one connect attempt (if due) and flush on success
    pub async fn connect<R: RemoteStore>(&mut self, remote: &R, now_ms: f64) -> ConnectionState {
        if self.begin_connect(now_ms).is_some() {
            let result = remote.connect().await;
            if self.complete_connect(result, now_ms) {
                self.flush(remote, now_ms).await;
            }
        }
        self.connection.state()
    }

    // === Introspection ===

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn queued(&self) -> &[ProgressSnapshot] {
        self.queue.items()
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            online: self.online,
            offline_mode: self.config.offline_mode || self.connection.is_offline(),
            signed_in: self.account.is_some(),
            queued: self.queue.len(),
            pending_retry: self.pending_retry,
            in_flight: self.in_flight,
            last_sync_ms: self.last_sync_ms,
        }
    }

    /// Hand back the storage backend (the queue stays persisted in it)
    pub fn into_store(self) -> B {
        self.queue.into_store()
    }
}
