//! Simulation module
//!
//! All gameplay logic lives here. No rendering, audio or platform calls:
//! - Fixed timestep, ticks strictly sequential
//! - Seeded RNG only
//! - Container order is the tie-break for every pairwise test

pub mod collision;
pub mod entity;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{enemy_touches_player, overlaps, resolve_collisions};
pub use entity::{
    Body, Enemy, EnemyKind, EnemyStats, Entity, MotionPattern, MoveInput, Player, PowerUp,
    Projectile, ToolKind,
};
pub use spawner::{SpawnOrders, Spawner, kind_for_roll};
pub use state::{GameEvent, GameSession, TickError};
pub use tick::{TickInput, TickReport, tick};
