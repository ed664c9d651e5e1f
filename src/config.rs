//! Game balance and sync tuning
//!
//! Persisted as one JSON blob; missing fields fall back to defaults so older
//! saved configs keep loading after new knobs are added.

use serde::{Deserialize, Serialize};

use crate::persistence::BlobStore;

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player horizontal/vertical speed (px/s)
    pub player_speed: f32,
    /// Projectile upward speed (px/s)
    pub projectile_speed: f32,
    /// Power-up fall speed (px/s)
    pub powerup_speed: f32,

    // === Spawning (measured in ticks) ===
    /// Ticks between enemy spawns at level 1
    pub spawn_interval: u64,
    /// Interval reduction per level-up
    pub spawn_interval_step: u64,
    /// Interval never drops below this
    pub min_spawn_interval: u64,
    /// Ticks between power-up spawns
    pub powerup_interval: u64,

    // === Combat ===
    /// Health lost per enemy contact
    pub contact_penalty: u32,
    /// Damage dealt by one projectile
    pub projectile_damage: u32,

    // === Progression ===
    /// Level N ends once score exceeds N * this
    pub level_score_step: u64,
    /// First level where the boss may appear
    pub boss_min_level: u32,
    /// Boss becomes due each time score crosses a multiple of this
    pub boss_score_step: u64,

    /// Verbose per-tick logging
    pub debug: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_speed: 300.0,
            projectile_speed: 420.0,
            powerup_speed: 120.0,

            spawn_interval: 100,
            spawn_interval_step: 10,
            min_spawn_interval: 30,
            powerup_interval: 500,

            contact_penalty: 10,
            projectile_damage: 25,

            level_score_step: 1000,
            boss_min_level: 3,
            boss_score_step: 2000,

            debug: false,
        }
    }
}

/// Persistence/sync tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Keep everything local; never contact the remote store
    pub offline_mode: bool,
    /// Fallback flush period (ms)
    pub flush_interval_ms: f64,
    /// Connect retry delay is `retry_base_ms * attempt`
    pub retry_base_ms: f64,
    /// Retries after the first failed connect before entering offline mode
    pub max_connect_retries: u32,
    /// Failed logins tolerated inside the lockout window
    pub max_login_attempts: u32,
    /// Lockout window after too many failed logins (ms)
    pub login_lockout_ms: f64,
    /// Signed-in session expires after this much inactivity (ms)
    pub session_timeout_ms: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            offline_mode: false,
            flush_interval_ms: 60_000.0,
            retry_base_ms: 2_000.0,
            max_connect_retries: 3,
            max_login_attempts: 5,
            login_lockout_ms: 300_000.0,
            session_timeout_ms: 3_600_000.0,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub game: GameConfig,
    pub sync: SyncConfig,
}

impl Config {
    /// Storage key
    const STORAGE_KEY: &'static str = "config";

    /// Load config from `store`, falling back to defaults
    pub fn load(store: &impl BlobStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(config) => {
                    log::info!("Loaded config from storage");
                    return config;
                }
                Err(e) => log::warn!("Stored config is corrupt ({}), using defaults", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read config: {}", e),
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to `store` (failures are logged, not fatal)
    pub fn save(&self, store: &mut impl BlobStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Config saved"),
                Err(e) => log::warn!("Could not save config: {}", e),
            },
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }
}
