//! Property tests for simulation invariants.

mod common;

use glam::Vec2;
use proptest::prelude::*;

use common::quiet_session;
use dental_defenders::config::GameConfig;
use dental_defenders::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH, SIM_DT};
use dental_defenders::sim::{
    Enemy, EnemyKind, Entity, GameEvent, GameSession, MoveInput, PowerUp, Projectile, Spawner,
    TickInput, ToolKind, kind_for_roll, overlaps, tick,
};

fn arb_input() -> impl Strategy<Value = TickInput> {
    (any::<[bool; 4]>(), any::<bool>()).prop_map(|([left, right, up, down], fire)| TickInput {
        movement: MoveInput {
            left,
            right,
            up,
            down,
        },
        fire,
    })
}

fn arb_kind() -> impl Strategy<Value = EnemyKind> {
    prop::sample::select(EnemyKind::ALL.to_vec())
}

/// Advance until the entity reports it has left, then keep going a while.
/// Returns how many times the report flipped from false to true and the tick
/// it first did, or `None` if it never left.
fn exit_ticks(entity: &mut impl Entity, limit: usize) -> (usize, Option<usize>) {
    let mut flips = 0;
    let mut first = None;
    let mut was_out = false;
    for t in 0..limit {
        let out = entity.advance(SIM_DT);
        if out && !was_out {
            flips += 1;
            first.get_or_insert(t);
        }
        was_out = out;
    }
    (flips, first)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn score_never_decreases(seed in any::<u64>(), inputs in prop::collection::vec(arb_input(), 1..400)) {
        let mut session = GameSession::new(seed, GameConfig::default());
        let mut last = 0;
        for input in &inputs {
            let report = tick(&mut session, input, SIM_DT).unwrap();
            prop_assert!(session.score >= last);
            last = session.score;
            if report.game_over {
                break;
            }
        }
    }

    #[test]
    fn player_stays_on_the_field(seed in any::<u64>(), inputs in prop::collection::vec(arb_input(), 1..300)) {
        let mut session = GameSession::new(seed, GameConfig::default());
        for input in &inputs {
            tick(&mut session, input, SIM_DT).unwrap();
            let half = session.player.size / 2.0;
            let pos = session.player.pos;
            prop_assert!(pos.x >= half && pos.x <= PLAYFIELD_WIDTH - half);
            prop_assert!(pos.y >= half && pos.y <= PLAYFIELD_HEIGHT - half);
            prop_assert!(session.player.health <= 100);
        }
    }

    #[test]
    fn level_only_rises_by_one_per_tick(seed in any::<u64>(), bumps in prop::collection::vec(0u64..3000, 1..50)) {
        let mut session = GameSession::new(seed, GameConfig::default());
        for bump in bumps {
            let before = session.level;
            session.score += bump;
            tick(&mut session, &TickInput::default(), SIM_DT).unwrap();
            prop_assert!(session.level == before || session.level == before + 1);
        }
    }

    #[test]
    fn spawn_interval_has_a_floor(level_ups in 0usize..100) {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(&config);
        for _ in 0..level_ups {
            spawner.on_level_up(&config);
        }
        prop_assert!(spawner.spawn_interval >= config.min_spawn_interval);
        prop_assert!(spawner.spawn_interval <= config.spawn_interval);
    }

    #[test]
    fn one_boss_per_level(polls in prop::collection::vec((0u32..100, 0u64..50_000), 1..200)) {
        let config = GameConfig::default();
        let mut spawner = Spawner::new(&config);
        let mut bosses = 0;
        for (now, (roll, score)) in polls.into_iter().enumerate() {
            let at = (now as u64 + 1) * config.spawn_interval;
            let orders = spawner.poll(at, roll, score, 4, &config);
            if orders.enemy == Some(EnemyKind::PlaqueBoss) {
                bosses += 1;
            }
        }
        prop_assert!(bosses <= 1);
    }

    #[test]
    fn regular_rolls_never_summon_a_boss(roll in 0u32..100, level in 1u32..20) {
        prop_assert_ne!(kind_for_roll(roll, level), EnemyKind::PlaqueBoss);
    }

    #[test]
    fn overlap_is_symmetric(ax in 0f32..800.0, ay in 0f32..600.0, bx in 0f32..800.0, by in 0f32..600.0, kind in arb_kind()) {
        let mut session = quiet_session();
        let id = session.spawn_enemy_at(kind, Vec2::new(ax, ay), 0.0);
        let enemy = session.enemies.iter().find(|e| e.id == id).unwrap();
        let shot = Projectile::new(1, Vec2::new(bx, by), 0.0);
        prop_assert_eq!(overlaps(enemy, &shot), overlaps(&shot, enemy));
        prop_assert_eq!(overlaps(enemy, &session.player), overlaps(&session.player, enemy));
    }

    #[test]
    fn enemy_exit_reported_once(kind in arb_kind(), x in 40f32..760.0, frac in 0f32..1.0) {
        let (lo, hi) = kind.stats().speed;
        let mut enemy = Enemy::new(1, kind, Vec2::new(x, -20.0), lo + (hi - lo) * frac);
        let (flips, first) = exit_ticks(&mut enemy, 3000);
        prop_assert_eq!(flips, 1);
        prop_assert!(first.is_some_and(|t| t > 0));
        prop_assert!(enemy.pos.y > PLAYFIELD_HEIGHT);
    }

    #[test]
    fn projectile_exit_reported_once(x in 0f32..800.0, y in 0f32..600.0, speed in 60f32..900.0) {
        let mut shot = Projectile::new(1, Vec2::new(x, y), speed);
        let (flips, first) = exit_ticks(&mut shot, 2000);
        prop_assert_eq!(flips, 1);
        prop_assert!(first.is_some());
        prop_assert!(shot.pos.y < 0.0);
    }

    #[test]
    fn powerup_exit_reported_once(x in 20f32..780.0, y in -20f32..600.0, speed in 30f32..300.0) {
        let mut pickup = PowerUp::new(1, Vec2::new(x, y), speed, ToolKind::Floss);
        let (flips, first) = exit_ticks(&mut pickup, 3000);
        prop_assert_eq!(flips, 1);
        prop_assert!(first.is_some());
        prop_assert!(pickup.pos.y > PLAYFIELD_HEIGHT);
    }

    #[test]
    fn offscreen_shots_and_pickups_vanish_silently(x in 40f32..760.0, y in 0f32..560.0) {
        let mut session = quiet_session();
        session.player.pos = Vec2::new(if x < 400.0 { 780.0 } else { 20.0 }, 20.0);
        session.projectiles.push(Projectile::new(90, Vec2::new(x, y), 420.0));
        session.powerups.push(PowerUp::new(91, Vec2::new(x, y), 120.0, ToolKind::Mouthwash));

        let mut ticks = 0;
        while !(session.projectiles.is_empty() && session.powerups.is_empty()) && ticks < 1_000 {
            let report = tick(&mut session, &TickInput::default(), SIM_DT).unwrap();
            prop_assert!(report.events.is_empty());
            ticks += 1;
        }
        prop_assert!(session.projectiles.is_empty());
        prop_assert!(session.powerups.is_empty());
        prop_assert_eq!(session.player.tool, ToolKind::Toothbrush);
        prop_assert_eq!(session.score, 0);
    }

    #[test]
    fn enemies_leave_the_field_silently(kind in arb_kind(), x in 40f32..760.0) {
        let mut session = quiet_session();
        // Keep the player clear of the column the enemy falls through
        session.player.pos = Vec2::new(if x < 400.0 { 780.0 } else { 20.0 }, 20.0);
        let speed = kind.stats().speed.1;
        session.spawn_enemy_at(kind, Vec2::new(x, 0.0), speed);

        let mut gone_at = None;
        for t in 0..3000 {
            let report = tick(&mut session, &TickInput::default(), SIM_DT).unwrap();
            prop_assert!(!report.events.iter().any(|e| matches!(e, GameEvent::PlayerHit { .. })), "unexpected PlayerHit event");
            if session.enemies.is_empty() && gone_at.is_none() {
                gone_at = Some(t);
            }
        }
        prop_assert!(gone_at.is_some());
        prop_assert!(session.enemies.is_empty());
        prop_assert_eq!(session.score, 0);
    }
}
