//! Entity model: player, enemies, projectiles, power-ups
//!
//! Speeds are in px/s and scaled by `dt`, so a nominal 60 Hz tick moves each
//! entity by speed / 60 pixels.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clamp_to_playfield;
use crate::consts::*;

/// Anything with a center and a diameter
pub trait Body {
    fn pos(&self) -> Vec2;
    fn size(&self) -> f32;
}

/// A body that moves on its own each tick
pub trait Entity: Body {
    /// Apply one step of motion. Returns true when the entity has crossed
    /// the far playfield edge in its direction of travel.
    fn advance(&mut self, dt: f32) -> bool;
}

/// Cleaning tool held by the player
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ToolKind {
    #[default]
    Toothbrush,
    Floss,
    Mouthwash,
    Electric,
}

impl ToolKind {
    /// Tools a power-up can grant
    pub const PICKUPS: [ToolKind; 3] = [ToolKind::Floss, ToolKind::Mouthwash, ToolKind::Electric];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Toothbrush => "toothbrush",
            ToolKind::Floss => "floss",
            ToolKind::Mouthwash => "mouthwash",
            ToolKind::Electric => "electric",
        }
    }
}

/// Directional keys currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// The player's toothbrush ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: f32,
    pub health: u32,
    pub tool: ToolKind,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(
                PLAYFIELD_WIDTH / 2.0,
                PLAYFIELD_HEIGHT - PLAYER_BOTTOM_OFFSET,
            ),
            size: PLAYER_SIZE,
            health: PLAYER_MAX_HEALTH,
            tool: ToolKind::default(),
        }
    }
}

impl Player {
    /// Translate per held key, each axis clamped independently
    pub fn move_by(&mut self, input: MoveInput, speed: f32, dt: f32) {
        let step = speed * dt;
        let mut delta = Vec2::ZERO;
        if input.left {
            delta.x -= step;
        }
        if input.right {
            delta.x += step;
        }
        if input.up {
            delta.y -= step;
        }
        if input.down {
            delta.y += step;
        }
        self.pos = clamp_to_playfield(self.pos + delta, self.size);
    }

    /// Subtract health, flooring at zero
    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    /// Swap the held tool; no stacking
    pub fn equip(&mut self, tool: ToolKind) {
        self.tool = tool;
    }
}

impl Body for Player {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> f32 {
        self.size
    }
}

/// How an enemy drifts while descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionPattern {
    Straight,
    Zigzag,
    Wave,
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    BasicCavity,
    SugarCrystal,
    SugarBug,
    FoodParticle,
    PlaqueBoss,
}

/// Fixed per-kind stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub size: f32,
    pub health: u32,
    /// Fall speed range (px/s), sampled at spawn
    pub speed: (f32, f32),
    pub points: u64,
    pub pattern: MotionPattern,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 5] = [
        EnemyKind::BasicCavity,
        EnemyKind::SugarCrystal,
        EnemyKind::SugarBug,
        EnemyKind::FoodParticle,
        EnemyKind::PlaqueBoss,
    ];

    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::BasicCavity => EnemyStats {
                size: 30.0,
                health: 100,
                speed: (120.0, 240.0),
                points: 100,
                pattern: MotionPattern::Straight,
            },
            EnemyKind::SugarCrystal => EnemyStats {
                size: 25.0,
                health: 50,
                speed: (150.0, 270.0),
                points: 150,
                pattern: MotionPattern::Zigzag,
            },
            EnemyKind::SugarBug => EnemyStats {
                size: 28.0,
                health: 75,
                speed: (120.0, 210.0),
                points: 200,
                pattern: MotionPattern::Wave,
            },
            EnemyKind::FoodParticle => EnemyStats {
                size: 20.0,
                health: 25,
                speed: (210.0, 330.0),
                points: 50,
                pattern: MotionPattern::Straight,
            },
            EnemyKind::PlaqueBoss => EnemyStats {
                size: 80.0,
                health: 500,
                speed: (45.0, 75.0),
                points: 1000,
                pattern: MotionPattern::Wave,
            },
        }
    }

    pub fn is_boss(self) -> bool {
        self == EnemyKind::PlaqueBoss
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::BasicCavity => "basic-cavity",
            EnemyKind::SugarCrystal => "sugar-crystal",
            EnemyKind::SugarBug => "sugar-bug",
            EnemyKind::FoodParticle => "food-particle",
            EnemyKind::PlaqueBoss => "plaque-boss",
        }
    }
}

/// Lateral sway for zigzag enemies (px/s at peak)
pub const ZIGZAG_SWAY: f32 = 180.0;
/// Lateral sway for wave enemies (px/s at peak)
pub const WAVE_SWAY: f32 = 90.0;
/// Phase advance (rad/s) driving sway
pub const SWAY_RATE: f32 = 6.0;
/// Sprite frames flip this many times per second
pub const ANIM_RATE: f32 = 4.0;

/// A descending enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: f32,
    pub health: u32,
    pub speed: f32,
    pub points: u64,
    pub pattern: MotionPattern,
    /// Sway phase (radians)
    pub phase: f32,
    /// Seconds alive, drives sprite animation
    #[serde(default)]
    pub age: f32,
}

impl Enemy {
    /// Create an enemy of `kind` centered at `pos`, stats resolved from the table
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, speed: f32) -> Self {
        let stats = kind.stats();
        Self {
            id,
            kind,
            pos,
            size: stats.size,
            health: stats.health,
            speed,
            points: stats.points,
            pattern: stats.pattern,
            phase: 0.0,
            age: 0.0,
        }
    }

    /// Create an enemy just above the top edge with random column, speed and phase
    pub fn spawn(id: u32, kind: EnemyKind, rng: &mut impl Rng) -> Self {
        let stats = kind.stats();
        let half = (stats.size / 2.0).max(SPAWN_MARGIN);
        let x = rng.random_range(half..PLAYFIELD_WIDTH - half);
        let speed = rng.random_range(stats.speed.0..=stats.speed.1);
        let mut enemy = Self::new(id, kind, Vec2::new(x, SPAWN_Y), speed);
        enemy.phase = rng.random_range(0.0..std::f32::consts::TAU);
        enemy
    }

    /// Apply damage. Returns true if this defeated the enemy.
    pub fn hit(&mut self, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        self.health == 0
    }

    /// Which of the two sprite frames to draw
    pub fn sprite_frame(&self) -> usize {
        (self.age * ANIM_RATE) as usize % 2
    }
}

impl Body for Enemy {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> f32 {
        self.size
    }
}

impl Entity for Enemy {
    fn advance(&mut self, dt: f32) -> bool {
        self.phase += SWAY_RATE * dt;
        self.age += dt;

        match self.pattern {
            MotionPattern::Straight => {
                self.pos.y += self.speed * dt;
            }
            MotionPattern::Zigzag => {
                self.pos.x += ZIGZAG_SWAY * self.phase.sin() * dt;
                self.pos.y += self.speed * dt;
            }
            MotionPattern::Wave => {
                // Fall rate breathes between 0.5x and 1.5x so it never stalls
                self.pos.x += WAVE_SWAY * self.phase.sin() * dt;
                self.pos.y += self.speed * (1.0 + 0.5 * self.phase.cos()) * dt;
            }
        }

        let half = self.size / 2.0;
        self.pos.x = self.pos.x.clamp(half, PLAYFIELD_WIDTH - half);

        self.pos.y > PLAYFIELD_HEIGHT + self.size
    }
}

/// Toothpaste shot fired by the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Upward speed (px/s)
    pub speed: f32,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, speed: f32) -> Self {
        Self { id, pos, speed }
    }
}

impl Body for Projectile {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> f32 {
        PROJECTILE_SIZE
    }
}

impl Entity for Projectile {
    fn advance(&mut self, dt: f32) -> bool {
        self.pos.y -= self.speed * dt;
        self.pos.y < -PROJECTILE_SIZE
    }
}

/// Falling pickup that swaps the player's tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    /// Fall speed (px/s)
    pub speed: f32,
    pub grants: ToolKind,
}

impl PowerUp {
    pub fn new(id: u32, pos: Vec2, speed: f32, grants: ToolKind) -> Self {
        Self {
            id,
            pos,
            speed,
            grants,
        }
    }

    /// Create a power-up above the top edge with a random column and tool
    pub fn spawn(id: u32, speed: f32, rng: &mut impl Rng) -> Self {
        let x = rng.random_range(SPAWN_MARGIN..PLAYFIELD_WIDTH - SPAWN_MARGIN);
        let grants = ToolKind::PICKUPS[rng.random_range(0..ToolKind::PICKUPS.len())];
        Self::new(id, Vec2::new(x, SPAWN_Y), speed, grants)
    }
}

impl Body for PowerUp {
    fn pos(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> f32 {
        POWERUP_SIZE
    }
}

impl Entity for PowerUp {
    fn advance(&mut self, dt: f32) -> bool {
        self.pos.y += self.speed * dt;
        self.pos.y > PLAYFIELD_HEIGHT + POWERUP_SIZE
    }
}
