//! Parent account sign-in, login throttling and session expiry

use std::fmt;

use super::SyncError;
use super::remote::RemoteStore;
use crate::config::SyncConfig;

/// Parent account credentials
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Signed-in account; only an active session makes progress eligible for sync
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub user_id: String,
    pub last_active_ms: f64,
}

impl AuthSession {
    pub fn new(user_id: impl Into<String>, now_ms: f64) -> Self {
        Self {
            user_id: user_id.into(),
            last_active_ms: now_ms,
        }
    }

    pub fn touch(&mut self, now_ms: f64) {
        self.last_active_ms = self.last_active_ms.max(now_ms);
    }

    pub fn is_expired(&self, now_ms: f64, timeout_ms: f64) -> bool {
        now_ms - self.last_active_ms > timeout_ms
    }
}

/// Local rate limiter for failed logins
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    failed_attempts: u32,
    last_failure_ms: f64,
    max_attempts: u32,
    lockout_ms: f64,
}

impl LoginThrottle {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            failed_attempts: 0,
            last_failure_ms: 0.0,
            max_attempts: config.max_login_attempts,
            lockout_ms: config.login_lockout_ms,
        }
    }

    /// Reject before contacting the remote store while locked out
    pub fn check(&mut self, now_ms: f64) -> Result<(), SyncError> {
        if self.failed_attempts <= self.max_attempts {
            return Ok(());
        }
        let elapsed = now_ms - self.last_failure_ms;
        if elapsed < self.lockout_ms {
            return Err(SyncError::RateLimited {
                retry_after_ms: self.lockout_ms - elapsed,
            });
        }
        // Window passed; start counting again
        self.failed_attempts = 0;
        Ok(())
    }

    pub fn record_failure(&mut self, now_ms: f64) {
        self.failed_attempts += 1;
        self.last_failure_ms = now_ms;
    }

    pub fn record_success(&mut self) {
        self.failed_attempts = 0;
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }
}

/// Sign in through the throttle. Failures count toward the lockout.
pub async fn sign_in<R: RemoteStore>(
    throttle: &mut LoginThrottle,
    remote: &R,
    credentials: &Credentials,
    now_ms: f64,
) -> Result<AuthSession, SyncError> {
    throttle.check(now_ms)?;

    match remote.authenticate(credentials).await {
        Ok(user_id) => {
            throttle.record_success();
            log::info!("Signed in as {}", credentials.email);
            Ok(AuthSession::new(user_id, now_ms))
        }
        Err(e) => {
            throttle.record_failure(now_ms);
            log::warn!("Sign-in failed: {}", e);
            Err(SyncError::Remote(e))
        }
    }
}
