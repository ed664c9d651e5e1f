//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (milliseconds since the Unix epoch)
//! - Connectivity
//! - Run seeds
//! - Progress storage backend

use crate::persistence::StorageError;

/// Current wall-clock time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Current wall-clock time in milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Whether the runtime reports network connectivity
#[cfg(target_arch = "wasm32")]
pub fn is_online() -> bool {
    web_sys::window()
        .map(|w| w.navigator().on_line())
        .unwrap_or(false)
}

/// Native builds assume connectivity; the remote store reports otherwise
#[cfg(not(target_arch = "wasm32"))]
pub fn is_online() -> bool {
    true
}

/// Seed for a new run
pub fn fresh_seed() -> u64 {
    (now_ms() as u64) ^ 0x9E37_79B9_7F4A_7C15
}

/// Storage backend for config and the offline queue
#[cfg(target_arch = "wasm32")]
pub fn open_store() -> Result<crate::persistence::LocalStorageBlobStore, StorageError> {
    crate::persistence::LocalStorageBlobStore::open("dental_defenders")
}

/// Storage backend for config and the offline queue
#[cfg(not(target_arch = "wasm32"))]
pub fn open_store() -> Result<crate::persistence::FileBlobStore, StorageError> {
    let dir = std::env::var_os("DENTAL_DEFENDERS_DATA")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("dental-defenders"));
    crate::persistence::FileBlobStore::open(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_moves_forward() {
        let a = now_ms();
        let b = now_ms();
        assert!(a > 0.0);
        assert!(b >= a);
    }

    #[test]
    fn test_native_is_online() {
        assert!(is_online());
    }
}
