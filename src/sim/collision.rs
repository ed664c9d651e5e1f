//! Collision detection and combat resolution
//!
//! Every entity is treated as a circle whose diameter is its size. Two bodies
//! collide when their centers are closer than the mean of their sizes.

use super::entity::{Body, Enemy, Player, PowerUp, Projectile};
use super::state::{GameEvent, GameSession};
use crate::distance;

/// Proximity test shared by every pair type
#[inline]
pub fn overlaps(a: &impl Body, b: &impl Body) -> bool {
    distance(a.pos(), b.pos()) < (a.size() + b.size()) / 2.0
}

/// Resolve projectile/enemy hits.
///
/// Projectiles are single-use: each one is consumed by the first overlapping
/// enemy in container order, and never damages a second enemy. Returns points
/// earned from defeated enemies.
pub fn resolve_projectile_hits(
    projectiles: &mut Vec<Projectile>,
    enemies: &mut Vec<Enemy>,
    damage: u32,
    events: &mut Vec<GameEvent>,
) -> u64 {
    let mut points = 0;

    projectiles.retain(|shot| {
        let Some(idx) = enemies.iter().position(|enemy| overlaps(shot, enemy)) else {
            return true;
        };

        if enemies[idx].hit(damage) {
            let enemy = enemies.remove(idx);
            points += enemy.points;
            events.push(GameEvent::EnemyDefeated {
                id: enemy.id,
                kind: enemy.kind,
                points: enemy.points,
            });
        } else {
            let enemy = &enemies[idx];
            events.push(GameEvent::EnemyHit {
                id: enemy.id,
                remaining: enemy.health,
            });
        }
        false
    });

    points
}

/// Whether an enemy is touching the player
#[inline]
pub fn enemy_touches_player(enemy: &Enemy, player: &Player) -> bool {
    overlaps(enemy, player)
}

/// Collect power-ups under the player. Last pickup in container order wins.
pub fn resolve_pickups(
    player: &mut Player,
    powerups: &mut Vec<PowerUp>,
    events: &mut Vec<GameEvent>,
) {
    powerups.retain(|pickup| {
        if overlaps(&*player, pickup) {
            player.equip(pickup.grants);
            events.push(GameEvent::PowerUpCollected {
                id: pickup.id,
                tool: pickup.grants,
            });
            false
        } else {
            true
        }
    });
}

/// Run the combat pass over a session: projectile hits, then pickups
pub fn resolve_collisions(session: &mut GameSession, events: &mut Vec<GameEvent>) {
    let damage = session.config.projectile_damage;
    let points = resolve_projectile_hits(
        &mut session.projectiles,
        &mut session.enemies,
        damage,
        events,
    );
    session.score += points;

    resolve_pickups(&mut session.player, &mut session.powerups, events);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{EnemyKind, ToolKind};
    use glam::Vec2;

    fn cavity(id: u32, x: f32, y: f32) -> Enemy {
        Enemy::new(id, EnemyKind::BasicCavity, Vec2::new(x, y), 120.0)
    }

    #[test]
    fn test_overlap_threshold() {
        // Cavity 30 + shot 10 => touching below 20px
        let enemy = cavity(1, 100.0, 100.0);
        let near = Projectile::new(2, Vec2::new(100.0, 119.9), 420.0);
        let edge = Projectile::new(3, Vec2::new(100.0, 120.0), 420.0);
        assert!(overlaps(&near, &enemy));
        assert!(!overlaps(&edge, &enemy));
    }

    #[test]
    fn test_overlap_symmetric() {
        let enemy = cavity(1, 100.0, 100.0);
        let shot = Projectile::new(2, Vec2::new(108.0, 110.0), 420.0);
        assert_eq!(overlaps(&shot, &enemy), overlaps(&enemy, &shot));
    }

    #[test]
    fn test_projectile_consumed_on_hit() {
        let mut shots = vec![Projectile::new(1, Vec2::new(100.0, 100.0), 420.0)];
        let mut enemies = vec![cavity(2, 100.0, 100.0)];
        let mut events = Vec::new();

        let points = resolve_projectile_hits(&mut shots, &mut enemies, 25, &mut events);
        assert_eq!(points, 0);
        assert!(shots.is_empty());
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].health, 75);
        assert_eq!(events, vec![GameEvent::EnemyHit { id: 2, remaining: 75 }]);
    }

    #[test]
    fn test_defeat_awards_points_and_removes_enemy() {
        let mut shots = vec![Projectile::new(1, Vec2::new(100.0, 100.0), 420.0)];
        let mut enemies = vec![cavity(2, 100.0, 100.0)];
        enemies[0].health = 25;
        let mut events = Vec::new();

        let points = resolve_projectile_hits(&mut shots, &mut enemies, 25, &mut events);
        assert_eq!(points, 100);
        assert!(shots.is_empty());
        assert!(enemies.is_empty());
    }

    #[test]
    fn test_first_enemy_in_order_wins() {
        let mut shots = vec![Projectile::new(1, Vec2::new(100.0, 100.0), 420.0)];
        let mut enemies = vec![cavity(2, 102.0, 100.0), cavity(3, 98.0, 100.0)];
        let mut events = Vec::new();

        resolve_projectile_hits(&mut shots, &mut enemies, 25, &mut events);
        assert_eq!(enemies[0].health, 75);
        assert_eq!(enemies[1].health, 100);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_two_shots_two_hits() {
        let mut shots = vec![
            Projectile::new(1, Vec2::new(100.0, 100.0), 420.0),
            Projectile::new(2, Vec2::new(100.0, 101.0), 420.0),
        ];
        let mut enemies = vec![cavity(3, 100.0, 100.0)];
        enemies[0].health = 50;
        let mut events = Vec::new();

        let points = resolve_projectile_hits(&mut shots, &mut enemies, 25, &mut events);
        assert_eq!(points, 100);
        assert!(shots.is_empty());
        assert!(enemies.is_empty());
    }

    #[test]
    fn test_shot_after_defeat_keeps_flying() {
        let mut shots = vec![
            Projectile::new(1, Vec2::new(100.0, 100.0), 420.0),
            Projectile::new(2, Vec2::new(100.0, 101.0), 420.0),
        ];
        let mut enemies = vec![cavity(3, 100.0, 100.0)];
        enemies[0].health = 25;
        let mut events = Vec::new();

        resolve_projectile_hits(&mut shots, &mut enemies, 25, &mut events);
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].id, 2);
    }

    #[test]
    fn test_last_pickup_wins() {
        let mut player = Player::default();
        let at = player.pos;
        let mut pickups = vec![
            PowerUp::new(1, at, 120.0, ToolKind::Floss),
            PowerUp::new(2, at, 120.0, ToolKind::Electric),
            PowerUp::new(3, Vec2::new(10.0, 10.0), 120.0, ToolKind::Mouthwash),
        ];
        let mut events = Vec::new();

        resolve_pickups(&mut player, &mut pickups, &mut events);
        assert_eq!(player.tool, ToolKind::Electric);
        assert_eq!(pickups.len(), 1);
        assert_eq!(pickups[0].id, 3);
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_enemy_touches_player() {
        let player = Player::default();
        let touching = cavity(1, player.pos.x + 34.0, player.pos.y);
        let apart = cavity(2, player.pos.x + 35.0, player.pos.y);
        assert!(enemy_touches_player(&touching, &player));
        assert!(!enemy_touches_player(&apart, &player));
    }
}
