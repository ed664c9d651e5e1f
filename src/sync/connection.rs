//! Connection establishment with bounded retry
//!
//! State machine, clock injected as `now_ms`:
//! - `Idle` → attempt → `Connecting(n)`
//! - `Connecting(n)` → success → `Connected`
//! - `Connecting(n)` → failure → `Retrying(n)` after `base * n`, or `Offline`
//!   once the retry budget is spent
//! - `Offline` stays put until connectivity is restored (`reset`)

use crate::config::SyncConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionState {
    Idle,
    /// Attempt `attempt` (1-based) is in flight
    Connecting { attempt: u32 },
    Connected,
    /// Attempt `attempt` failed; the next one may start at `retry_at_ms`
    Retrying { attempt: u32, retry_at_ms: f64 },
    /// Retries exhausted; persistence queues locally
    Offline,
}

#[derive(Debug, Clone)]
pub struct ConnectionMonitor {
    state: ConnectionState,
    retry_base_ms: f64,
    max_retries: u32,
}

impl ConnectionMonitor {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            state: ConnectionState::Idle,
            retry_base_ms: config.retry_base_ms,
            max_retries: config.max_connect_retries,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Start an attempt if one is allowed at `now_ms`. Returns its number.
    pub fn begin_attempt(&mut self, now_ms: f64) -> Option<u32> {
        let attempt = match self.state {
            ConnectionState::Idle => 1,
            ConnectionState::Retrying {
                attempt,
                retry_at_ms,
            } if now_ms >= retry_at_ms => attempt + 1,
            _ => return None,
        };
        self.state = ConnectionState::Connecting { attempt };
        Some(attempt)
    }

    pub fn on_success(&mut self) {
        if let ConnectionState::Connecting { attempt } = self.state {
            log::info!("Connected to remote store (attempt {})", attempt);
        }
        self.state = ConnectionState::Connected;
    }

    pub fn on_failure(&mut self, now_ms: f64) -> ConnectionState {
        let ConnectionState::Connecting { attempt } = self.state else {
            return self.state;
        };

        self.state = if attempt <= self.max_retries {
            let delay = self.retry_base_ms * attempt as f64;
            log::info!(
                "Retrying connection ({}/{}) in {} ms",
                attempt,
                self.max_retries,
                delay
            );
            ConnectionState::Retrying {
                attempt,
                retry_at_ms: now_ms + delay,
            }
        } else {
            log::warn!("Unable to connect after {} attempts, playing in offline mode", attempt);
            ConnectionState::Offline
        };
        self.state
    }

    /// Connectivity came back: allow a fresh round of attempts
    pub fn reset(&mut self) {
        if self.state != ConnectionState::Connected {
            self.state = ConnectionState::Idle;
        }
    }

    /// Connectivity went away
    pub fn disconnect(&mut self) {
        if self.state == ConnectionState::Connected {
            self.state = ConnectionState::Idle;
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn is_offline(&self) -> bool {
        self.state == ConnectionState::Offline
    }

    /// When the pending retry may start, if one is scheduled
    pub fn next_retry_at(&self) -> Option<f64> {
        match self.state {
            ConnectionState::Retrying { retry_at_ms, .. } => Some(retry_at_ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> ConnectionMonitor {
        ConnectionMonitor::new(&SyncConfig::default())
    }

    #[test]
    fn test_first_attempt_succeeds() {
        let mut m = monitor();
        assert_eq!(m.begin_attempt(0.0), Some(1));
        assert_eq!(m.begin_attempt(0.0), None);
        m.on_success();
        assert!(m.is_connected());
    }

    #[test]
    fn test_backoff_scales_with_attempt() {
        let mut m = monitor();
        let mut now = 0.0;
        let mut delays = Vec::new();
        for _ in 0..3 {
            m.begin_attempt(now).unwrap();
            m.on_failure(now);
            let at = m.next_retry_at().unwrap();
            delays.push(at - now);
            assert_eq!(m.begin_attempt(at - 1.0), None);
            now = at;
        }
        assert_eq!(delays, vec![2000.0, 4000.0, 6000.0]);
    }

    #[test]
    fn test_offline_after_retries_exhausted() {
        let mut m = monitor();
        let mut now = 0.0;
        for _ in 0..4 {
            m.begin_attempt(now).unwrap();
            m.on_failure(now);
            now += 10_000.0;
        }
        assert!(m.is_offline());
        assert_eq!(m.begin_attempt(now), None);
    }

    #[test]
    fn test_reset_leaves_offline() {
        let mut m = monitor();
        for i in 0..4 {
            m.begin_attempt(i as f64 * 10_000.0).unwrap();
            m.on_failure(i as f64 * 10_000.0);
        }
        assert!(m.is_offline());
        m.reset();
        assert_eq!(m.state(), ConnectionState::Idle);
        assert_eq!(m.begin_attempt(0.0), Some(1));
    }

    #[test]
    fn test_disconnect_then_reconnect() {
        let mut m = monitor();
        m.begin_attempt(0.0);
        m.on_success();
        m.disconnect();
        assert_eq!(m.state(), ConnectionState::Idle);
        m.reset();
        assert_eq!(m.state(), ConnectionState::Idle);
    }

    #[test]
    fn test_failure_outside_attempt_ignored() {
        let mut m = monitor();
        assert_eq!(m.on_failure(0.0), ConnectionState::Idle);
    }
}
