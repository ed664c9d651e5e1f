//! Achievements unlocked during a run
//!
//! Tracked per session and shipped inside every progress snapshot.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::sim::{GameEvent, ToolKind};

/// Score for `Achievement::Score10k`
pub const HIGH_SCORE_MARK: u64 = 10_000;
/// Level for `Achievement::ReachedLevel5`
pub const VETERAN_LEVEL: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    /// Defeated the first enemy
    FirstDefeat,
    /// Defeated a plaque boss
    BossDefeated,
    ReachedLevel5,
    Score10k,
    /// Held every tool at least once in a single run
    ToolCollector,
}

impl Achievement {
    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstDefeat => "First Cavity Cleared",
            Achievement::BossDefeated => "Plaque Buster",
            Achievement::ReachedLevel5 => "Veteran Defender",
            Achievement::Score10k => "Sparkling Smile",
            Achievement::ToolCollector => "Fully Equipped",
        }
    }
}

/// Achievements earned so far in one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchievementTracker {
    unlocked: BTreeSet<Achievement>,
    tools_held: BTreeSet<ToolKind>,
}

impl AchievementTracker {
    pub fn new() -> Self {
        let mut tracker = Self::default();
        tracker.tools_held.insert(ToolKind::default());
        tracker
    }

    /// Feed one event. Returns the achievement if it was newly unlocked.
    pub fn record(&mut self, event: &GameEvent, score: u64) -> Option<Achievement> {
        let candidate = match *event {
            GameEvent::EnemyDefeated { kind, .. } if kind.is_boss() => {
                self.unlock(Achievement::FirstDefeat);
                Some(Achievement::BossDefeated)
            }
            GameEvent::EnemyDefeated { .. } => Some(Achievement::FirstDefeat),
            GameEvent::LevelUp { level } if level >= VETERAN_LEVEL => {
                Some(Achievement::ReachedLevel5)
            }
            GameEvent::PowerUpCollected { tool, .. } => {
                self.tools_held.insert(tool);
                let all = [ToolKind::Toothbrush]
                    .iter()
                    .chain(ToolKind::PICKUPS.iter())
                    .all(|t| self.tools_held.contains(t));
                all.then_some(Achievement::ToolCollector)
            }
            _ => None,
        };

        let unlocked = candidate.and_then(|a| self.unlock(a));
        if score >= HIGH_SCORE_MARK {
            // Score can cross the mark on the same event as another unlock
            if let Some(a) = self.unlock(Achievement::Score10k) {
                return unlocked.or(Some(a));
            }
        }
        unlocked
    }

    fn unlock(&mut self, achievement: Achievement) -> Option<Achievement> {
        if self.unlocked.insert(achievement) {
            log::info!("Achievement unlocked: {:?}", achievement);
            Some(achievement)
        } else {
            None
        }
    }

    pub fn unlocked(&self) -> &BTreeSet<Achievement> {
        &self.unlocked
    }

    pub fn contains(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }
}
