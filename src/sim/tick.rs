//! Per-tick simulation update
//!
//! Order within a tick: spawn, move player, move enemies (contact before
//! offscreen), move projectiles, move power-ups, combat, level-up, defeat.

use super::collision::{enemy_touches_player, resolve_collisions};
use super::entity::{Entity, MoveInput};
use super::state::{GameEvent, GameSession, TickError};

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Directional keys held
    pub movement: MoveInput,
    /// Fire one projectile this tick
    pub fire: bool,
}

/// What a tick produced
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// Player health hit zero this tick
    pub game_over: bool,
}

/// Advance the session by one tick of `dt` seconds
pub fn tick(
    session: &mut GameSession,
    input: &TickInput,
    dt: f32,
) -> Result<TickReport, TickError> {
    let mut events = Vec::new();
    session.time_ticks += 1;
    let now = session.time_ticks;

    // Spawning
    let roll = session.roll();
    let orders = session
        .spawner
        .poll(now, roll, session.score, session.level, &session.config);
    if let Some(kind) = orders.enemy {
        let id = session.spawn_enemy(kind);
        events.push(GameEvent::EnemySpawned { id, kind });
    }
    if orders.powerup {
        let (id, tool) = session.spawn_powerup();
        events.push(GameEvent::PowerUpSpawned { id, tool });
    }

    // Player
    let speed = session.config.player_speed;
    session.player.move_by(input.movement, speed, dt);
    if input.fire {
        let id = session.fire();
        events.push(GameEvent::ProjectileFired { id });
    }

    // Enemies: contact is penalized, leaving the field is silent
    let mut contacts = Vec::new();
    let player = &session.player;
    session.enemies.retain_mut(|enemy| {
        let offscreen = enemy.advance(dt);
        if enemy_touches_player(enemy, player) {
            contacts.push(enemy.id);
            return false;
        }
        !offscreen
    });
    for enemy_id in contacts {
        session.player.take_damage(session.config.contact_penalty);
        events.push(GameEvent::PlayerHit {
            enemy_id,
            health: session.player.health,
        });
    }

    session.projectiles.retain_mut(|shot| !shot.advance(dt));
    session.powerups.retain_mut(|pickup| !pickup.advance(dt));

    resolve_collisions(session, &mut events);

    if let Some(level) = session.check_level_up() {
        events.push(GameEvent::LevelUp { level });
    }

    let game_over = session.is_over();
    if game_over {
        log::info!("Player defeated with score {}", session.score);
        events.push(GameEvent::PlayerDefeated {
            score: session.score,
        });
    }

    session.validate()?;

    if session.config.debug {
        log::debug!(
            "tick {}: {} enemies, {} shots, {} pickups, score {}",
            now,
            session.enemies.len(),
            session.projectiles.len(),
            session.powerups.len(),
            session.score
        );
    }

    Ok(TickReport { events, game_over })
}
