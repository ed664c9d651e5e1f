//! Game session state
//!
//! One `GameSession` is one run from "start" to "game over". It owns every
//! live entity; nothing else holds references into it.

use std::fmt;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{Enemy, EnemyKind, Player, PowerUp, Projectile, ToolKind};
use super::spawner::Spawner;
use crate::config::GameConfig;

/// Something notable that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    EnemySpawned { id: u32, kind: EnemyKind },
    PowerUpSpawned { id: u32, tool: ToolKind },
    ProjectileFired { id: u32 },
    EnemyHit { id: u32, remaining: u32 },
    EnemyDefeated { id: u32, kind: EnemyKind, points: u64 },
    /// Enemy reached the player; it is removed and health drops
    PlayerHit { enemy_id: u32, health: u32 },
    PowerUpCollected { id: u32, tool: ToolKind },
    LevelUp { level: u32 },
    PlayerDefeated { score: u64 },
}

/// A tick left the session in an inconsistent state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickError {
    /// An entity position became NaN or infinite
    NonFinite { entity: &'static str, id: u32 },
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickError::NonFinite { entity, id } => {
                write!(f, "{} {} has a non-finite position", entity, id)
            }
        }
    }
}

impl std::error::Error for TickError {}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Run seed
    pub seed: u64,
    rng: Pcg32,
    /// Balance knobs this run was started with
    pub config: GameConfig,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub powerups: Vec<PowerUp>,
    /// Never decreases within a session
    pub score: u64,
    /// Starts at 1, only raised by the level-up rule
    pub level: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub spawner: Spawner,
    /// Next entity ID
    next_id: u32,
}

impl GameSession {
    /// Fresh session: full health, empty field, score 0, level 1
    pub fn new(seed: u64, config: GameConfig) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            spawner: Spawner::new(&config),
            config,
            player: Player::default(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            powerups: Vec::new(),
            score: 0,
            level: 1,
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID, wrapping back to 1 after `u32::MAX`
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1).unwrap_or(1);
        id
    }

    /// Uniform draw from [0, 100) for the spawn table
    pub fn roll(&mut self) -> u32 {
        self.rng.random_range(0..100)
    }

    /// Spawn an enemy of `kind` at a random column above the playfield
    pub fn spawn_enemy(&mut self, kind: EnemyKind) -> u32 {
        let id = self.next_entity_id();
        let enemy = Enemy::spawn(id, kind, &mut self.rng);
        log::debug!("Spawned {} #{} at x={:.0}", kind.as_str(), id, enemy.pos.x);
        self.enemies.push(enemy);
        id
    }

    /// Place an enemy of `kind` at an exact position
    pub fn spawn_enemy_at(&mut self, kind: EnemyKind, pos: Vec2, speed: f32) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Enemy::new(id, kind, pos, speed));
        id
    }

    /// Spawn a power-up at a random column above the playfield
    pub fn spawn_powerup(&mut self) -> (u32, ToolKind) {
        let id = self.next_entity_id();
        let pickup = PowerUp::spawn(id, self.config.powerup_speed, &mut self.rng);
        let tool = pickup.grants;
        self.powerups.push(pickup);
        (id, tool)
    }

    /// Fire a projectile from the player's current position
    pub fn fire(&mut self) -> u32 {
        let id = self.next_entity_id();
        let shot = Projectile::new(id, self.player.pos, self.config.projectile_speed);
        self.projectiles.push(shot);
        id
    }

    /// Level-up rule: score must exceed `level * step`.
    /// Returns the new level if it changed.
    pub fn check_level_up(&mut self) -> Option<u32> {
        if self.score > self.level as u64 * self.config.level_score_step {
            self.level += 1;
            self.spawner.on_level_up(&self.config);
            log::info!(
                "Level {} reached (spawn interval {} ticks)",
                self.level,
                self.spawner.spawn_interval
            );
            Some(self.level)
        } else {
            None
        }
    }

    pub fn is_over(&self) -> bool {
        self.player.is_defeated()
    }

    /// Verify every position is finite
    pub fn validate(&self) -> Result<(), TickError> {
        let bad = |entity, id| TickError::NonFinite { entity, id };
        if !self.player.pos.is_finite() {
            return Err(bad("player", 0));
        }
        if let Some(e) = self.enemies.iter().find(|e| !e.pos.is_finite()) {
            return Err(bad("enemy", e.id));
        }
        if let Some(p) = self.projectiles.iter().find(|p| !p.pos.is_finite()) {
            return Err(bad("projectile", p.id));
        }
        if let Some(p) = self.powerups.iter().find(|p| !p.pos.is_finite()) {
            return Err(bad("power-up", p.id));
        }
        Ok(())
    }
}
