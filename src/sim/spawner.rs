//! Enemy and power-up spawning
//!
//! Enemies arrive whenever the tick counter reaches the spawn deadline; the
//! kind comes from a level-dependent table, except when the boss is due.

use serde::{Deserialize, Serialize};

use super::entity::EnemyKind;
use crate::config::GameConfig;

/// What the spawner wants created this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpawnOrders {
    pub enemy: Option<EnemyKind>,
    pub powerup: bool,
}

/// Spawn timing and boss bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Tick at or after which the next enemy appears
    pub next_spawn_tick: u64,
    /// Current ticks between enemies (shrinks with level)
    pub spawn_interval: u64,
    /// Boss already spawned this level
    pub boss_spawned: bool,
    /// Score the boss waits for (next multiple of the boss step)
    pub next_boss_score: u64,
    /// Tick at or after which the next power-up appears
    pub next_powerup_tick: u64,
}

impl Spawner {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            next_spawn_tick: config.spawn_interval,
            spawn_interval: config.spawn_interval,
            boss_spawned: false,
            next_boss_score: config.boss_score_step,
            next_powerup_tick: config.powerup_interval,
        }
    }

    /// Decide spawns for tick `now`. `roll` is a uniform draw from [0, 100).
    pub fn poll(
        &mut self,
        now: u64,
        roll: u32,
        score: u64,
        level: u32,
        config: &GameConfig,
    ) -> SpawnOrders {
        let mut orders = SpawnOrders::default();

        if now >= self.next_spawn_tick {
            orders.enemy = Some(if self.boss_due(score, level, config) {
                self.boss_spawned = true;
                // Next boss needs the score to cross the following multiple
                self.next_boss_score = (score / config.boss_score_step + 1) * config.boss_score_step;
                EnemyKind::PlaqueBoss
            } else {
                kind_for_roll(roll, level)
            });
            self.next_spawn_tick = now + self.spawn_interval;
        }

        if now >= self.next_powerup_tick {
            orders.powerup = true;
            self.next_powerup_tick = now + config.powerup_interval;
        }

        orders
    }

    fn boss_due(&self, score: u64, level: u32, config: &GameConfig) -> bool {
        !self.boss_spawned && level >= config.boss_min_level && score >= self.next_boss_score
    }

    /// Tighten spawn rate and re-arm the boss after a level-up
    pub fn on_level_up(&mut self, config: &GameConfig) {
        self.spawn_interval = self
            .spawn_interval
            .saturating_sub(config.spawn_interval_step)
            .max(config.min_spawn_interval);
        self.boss_spawned = false;
    }
}

/// Cumulative thresholds for regular kinds, by level (clamped at the last row)
const KIND_TABLE: [[(EnemyKind, u32); 4]; 5] = [
    // Level 1: mostly plain cavities
    [
        (EnemyKind::BasicCavity, 60),
        (EnemyKind::FoodParticle, 90),
        (EnemyKind::SugarCrystal, 100),
        (EnemyKind::SugarBug, 100),
    ],
    [
        (EnemyKind::BasicCavity, 45),
        (EnemyKind::FoodParticle, 70),
        (EnemyKind::SugarCrystal, 90),
        (EnemyKind::SugarBug, 100),
    ],
    [
        (EnemyKind::BasicCavity, 35),
        (EnemyKind::FoodParticle, 55),
        (EnemyKind::SugarCrystal, 80),
        (EnemyKind::SugarBug, 100),
    ],
    [
        (EnemyKind::BasicCavity, 25),
        (EnemyKind::FoodParticle, 45),
        (EnemyKind::SugarCrystal, 70),
        (EnemyKind::SugarBug, 100),
    ],
    // Level 5+: sugar bugs dominate
    [
        (EnemyKind::BasicCavity, 20),
        (EnemyKind::FoodParticle, 35),
        (EnemyKind::SugarCrystal, 60),
        (EnemyKind::SugarBug, 100),
    ],
];

/// Map a [0, 100) roll to a regular (non-boss) enemy kind for `level`
pub fn kind_for_roll(roll: u32, level: u32) -> EnemyKind {
    let row = (level.max(1) as usize - 1).min(KIND_TABLE.len() - 1);
    KIND_TABLE[row]
        .iter()
        .find(|(_, threshold)| roll < *threshold)
        .map(|(kind, _)| *kind)
        .unwrap_or(EnemyKind::SugarBug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_spawn_before_deadline() {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(&config);
        let orders = spawner.poll(99, 0, 0, 1, &config);
        assert_eq!(orders, SpawnOrders::default());
    }

    #[test]
    fn test_spawn_resets_deadline() {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(&config);
        let orders = spawner.poll(100, 0, 0, 1, &config);
        assert_eq!(orders.enemy, Some(EnemyKind::BasicCavity));
        assert_eq!(spawner.next_spawn_tick, 200);
        assert_eq!(spawner.poll(101, 0, 0, 1, &config).enemy, None);
    }

    #[test]
    fn test_powerup_on_own_period() {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(&config);
        assert!(!spawner.poll(499, 0, 0, 1, &config).powerup);
        assert!(spawner.poll(500, 0, 0, 1, &config).powerup);
        assert_eq!(spawner.next_powerup_tick, 1000);
    }

    #[test]
    fn test_level_one_table() {
        assert_eq!(kind_for_roll(0, 1), EnemyKind::BasicCavity);
        assert_eq!(kind_for_roll(59, 1), EnemyKind::BasicCavity);
        assert_eq!(kind_for_roll(60, 1), EnemyKind::FoodParticle);
        assert_eq!(kind_for_roll(95, 1), EnemyKind::SugarCrystal);
        assert_eq!(kind_for_roll(99, 1), EnemyKind::SugarCrystal);
    }

    #[test]
    fn test_stronger_kinds_grow_with_level() {
        let bugs = |level| (0..100).filter(|&r| kind_for_roll(r, level) == EnemyKind::SugarBug).count();
        assert_eq!(bugs(1), 0);
        assert!(bugs(2) < bugs(3));
        assert!(bugs(3) < bugs(5));
        assert_eq!(bugs(5), bugs(50));
    }

    #[test]
    fn test_table_never_yields_boss() {
        for level in 1..10 {
            for roll in 0..100 {
                assert!(!kind_for_roll(roll, level).is_boss());
            }
        }
    }

    #[test]
    fn test_boss_gated_by_level_and_score() {
        let config = GameConfig::default();

        let mut spawner = Spawner::new(&config);
        assert_ne!(spawner.poll(100, 0, 5000, 2, &config).enemy, Some(EnemyKind::PlaqueBoss));

        let mut spawner = Spawner::new(&config);
        assert_ne!(spawner.poll(100, 0, 1999, 3, &config).enemy, Some(EnemyKind::PlaqueBoss));

        let mut spawner = Spawner::new(&config);
        assert_eq!(spawner.poll(100, 0, 2000, 3, &config).enemy, Some(EnemyKind::PlaqueBoss));
        assert!(spawner.boss_spawned);
        assert_eq!(spawner.next_boss_score, 4000);
    }

    #[test]
    fn test_boss_exclusive_until_level_up() {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(&config);
        let mut bosses = 0;
        let mut now = 0;
        for score in (2000..9000).step_by(100) {
            now += spawner.spawn_interval;
            if spawner.poll(now, 0, score, 3, &config).enemy == Some(EnemyKind::PlaqueBoss) {
                bosses += 1;
            }
        }
        assert_eq!(bosses, 1);

        spawner.on_level_up(&config);
        now += spawner.spawn_interval;
        assert_eq!(spawner.poll(now, 0, 9000, 4, &config).enemy, Some(EnemyKind::PlaqueBoss));
    }

    #[test]
    fn test_level_up_interval_floor() {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(&config);
        let mut last = spawner.spawn_interval;
        for _ in 0..20 {
            spawner.on_level_up(&config);
            assert!(spawner.spawn_interval <= last);
            assert!(spawner.spawn_interval >= config.min_spawn_interval);
            last = spawner.spawn_interval;
        }
        assert_eq!(spawner.spawn_interval, config.min_spawn_interval);
    }
}
