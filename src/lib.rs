//! Dental Defenders - an arcade shooter against descending cavities
//!
//! Core modules:
//! - `sim`: Simulation (entities, spawning, collisions, per-tick update)
//! - `game`: Mode state machine driven by input events and the frame clock
//! - `sync`: Offline-first persistence of progress snapshots
//! - `persistence`: Key/value blob storage backends
//! - `platform`: Browser/native platform abstraction
//! - `config`: Data-driven game balance and sync tuning

pub mod achievements;
pub mod audio;
pub mod config;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod sim;
pub mod sync;

pub use config::{Config, GameConfig, SyncConfig};
pub use game::{Game, GameMode, InputEvent};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 40.0;
    /// Distance of the player's start position above the bottom edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 50.0;
    pub const PLAYER_MAX_HEALTH: u32 = 100;

    /// Projectile defaults
    pub const PROJECTILE_SIZE: f32 = 10.0;

    /// Power-up defaults
    pub const POWERUP_SIZE: f32 = 20.0;

    /// Enemies and power-ups enter just above the top edge
    pub const SPAWN_Y: f32 = -20.0;
    /// Horizontal margin kept free when picking a spawn column
    pub const SPAWN_MARGIN: f32 = 20.0;
}

/// Euclidean distance between two entity centers
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Clamp a position so an entity of `size` stays inside the playfield
#[inline]
pub fn clamp_to_playfield(pos: Vec2, size: f32) -> Vec2 {
    let half = size / 2.0;
    Vec2::new(
        pos.x.clamp(half, consts::PLAYFIELD_WIDTH - half),
        pos.y.clamp(half, consts::PLAYFIELD_HEIGHT - half),
    )
}
