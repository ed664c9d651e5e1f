//! Sound effects
//!
//! Effects are picked from simulation events and synthesized with Web Audio
//! oscillators on the web build. Native builds stay silent.

use crate::sim::GameEvent;
use Waveform::{Sawtooth, Sine, Square, Triangle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Projectile fired
    Shoot,
    /// Enemy damaged but not destroyed
    EnemyHit,
    EnemyDefeated,
    BossDefeated,
    /// Enemy reached the player
    PlayerHit,
    ToolPickup,
    LevelUp,
    GameOver,
}

impl SoundEffect {
    /// Effect for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::ProjectileFired { .. } => Some(SoundEffect::Shoot),
            GameEvent::EnemyHit { .. } => Some(SoundEffect::EnemyHit),
            GameEvent::EnemyDefeated { kind, .. } if kind.is_boss() => {
                Some(SoundEffect::BossDefeated)
            }
            GameEvent::EnemyDefeated { .. } => Some(SoundEffect::EnemyDefeated),
            GameEvent::PlayerHit { .. } => Some(SoundEffect::PlayerHit),
            GameEvent::PowerUpCollected { .. } => Some(SoundEffect::ToolPickup),
            GameEvent::LevelUp { .. } => Some(SoundEffect::LevelUp),
            GameEvent::PlayerDefeated { .. } => Some(SoundEffect::GameOver),
            GameEvent::EnemySpawned { .. } | GameEvent::PowerUpSpawned { .. } => None,
        }
    }

    /// Oscillator voices making up the effect
    pub fn voices(self) -> &'static [Voice] {
        match self {
            SoundEffect::Shoot => SHOOT,
            SoundEffect::EnemyHit => ENEMY_HIT,
            SoundEffect::EnemyDefeated => ENEMY_DEFEATED,
            SoundEffect::BossDefeated => BOSS_DEFEATED,
            SoundEffect::PlayerHit => PLAYER_HIT,
            SoundEffect::ToolPickup => TOOL_PICKUP,
            SoundEffect::LevelUp => LEVEL_UP,
            SoundEffect::GameOver => GAME_OVER,
        }
    }
}

const SHOOT: &[Voice] = &[Voice::sweep(Square, 880.0, 440.0, 0.0, 0.08, 0.15)];
const ENEMY_HIT: &[Voice] = &[Voice::sweep(Triangle, 320.0, 260.0, 0.0, 0.06, 0.25)];
/// Zap plus a low thump
const ENEMY_DEFEATED: &[Voice] = &[
    Voice::sweep(Sawtooth, 600.0, 90.0, 0.0, 0.18, 0.3),
    Voice::sweep(Sine, 70.0, 50.0, 0.0, 0.12, 0.3),
];
const BOSS_DEFEATED: &[Voice] = &[
    Voice::sweep(Sawtooth, 400.0, 40.0, 0.0, 0.6, 0.4),
    Voice::sweep(Square, 523.0, 523.0, 0.2, 0.15, 0.2),
    Voice::sweep(Square, 784.0, 784.0, 0.35, 0.3, 0.2),
];
const PLAYER_HIT: &[Voice] = &[Voice::sweep(Sine, 180.0, 60.0, 0.0, 0.2, 0.5)];
const TOOL_PICKUP: &[Voice] = &[
    Voice::sweep(Sine, 660.0, 660.0, 0.0, 0.08, 0.3),
    Voice::sweep(Sine, 990.0, 990.0, 0.08, 0.12, 0.3),
];
/// C-E-G arpeggio
const LEVEL_UP: &[Voice] = &[
    Voice::sweep(Triangle, 523.0, 523.0, 0.0, 0.1, 0.3),
    Voice::sweep(Triangle, 659.0, 659.0, 0.1, 0.1, 0.3),
    Voice::sweep(Triangle, 784.0, 784.0, 0.2, 0.25, 0.3),
];
const GAME_OVER: &[Voice] = &[
    Voice::sweep(Sawtooth, 392.0, 196.0, 0.0, 0.4, 0.3),
    Voice::sweep(Sawtooth, 262.0, 110.0, 0.4, 0.6, 0.3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One oscillator: frequency sweep with a decaying gain envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    pub start_hz: f32,
    pub end_hz: f32,
    /// Offset from the effect start, seconds
    pub delay: f64,
    pub duration: f64,
    pub gain: f32,
}

impl Voice {
    const fn sweep(
        waveform: Waveform,
        start_hz: f32,
        end_hz: f32,
        delay: f64,
        duration: f64,
        gain: f32,
    ) -> Self {
        Self {
            waveform,
            start_hz,
            end_hz,
            delay,
            duration,
            gain,
        }
    }
}

/// Anything that can play effects
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Play the effects for a tick's events
    fn play_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }
}

/// Discards everything (native builds, tests, audio unavailable)
#[derive(Debug, Default)]
pub struct SilentAudio {
    played: usize,
}

impl SilentAudio {
    /// How many effects were requested
    pub fn played(&self) -> usize {
        self.played
    }
}

impl AudioSink for SilentAudio {
    fn play(&mut self, _effect: SoundEffect) {
        self.played += 1;
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, OscillatorType};

    use super::{AudioSink, SoundEffect, Voice, Waveform};

    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // Fails outside a secure context; play() then does nothing
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("AudioContext unavailable - audio disabled");
            }
            Self {
                ctx,
                volume: 0.8,
                muted: false,
            }
        }

        pub fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn voice(&self, ctx: &AudioContext, voice: &Voice, at: f64) -> Option<()> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(match voice.waveform {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Square => OscillatorType::Square,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
                Waveform::Triangle => OscillatorType::Triangle,
            });
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            let start = at + voice.delay;
            let end = start + voice.duration;
            osc.frequency().set_value_at_time(voice.start_hz, start).ok()?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(voice.end_hz, end)
                .ok()?;
            gain.gain()
                .set_value_at_time(voice.gain * self.volume, start)
                .ok()?;
            gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok()?;

            osc.start_with_when(start).ok()?;
            osc.stop_with_when(end + 0.02).ok()
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, effect: SoundEffect) {
            if self.muted || self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers suspend the context until a user gesture
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let now = ctx.current_time();
            for voice in effect.voices() {
                if self.voice(ctx, voice, now).is_none() {
                    log::debug!("Failed to schedule {:?}", effect);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{EnemyKind, ToolKind};

    #[test]
    fn test_boss_gets_its_own_effect() {
        let boss = GameEvent::EnemyDefeated {
            id: 1,
            kind: EnemyKind::PlaqueBoss,
            points: 1000,
        };
        let cavity = GameEvent::EnemyDefeated {
            id: 2,
            kind: EnemyKind::BasicCavity,
            points: 100,
        };
        assert_eq!(SoundEffect::for_event(&boss), Some(SoundEffect::BossDefeated));
        assert_eq!(SoundEffect::for_event(&cavity), Some(SoundEffect::EnemyDefeated));
    }

    #[test]
    fn test_spawns_are_silent() {
        let events = [
            GameEvent::EnemySpawned {
                id: 1,
                kind: EnemyKind::SugarBug,
            },
            GameEvent::PowerUpSpawned {
                id: 2,
                tool: ToolKind::Floss,
            },
            GameEvent::ProjectileFired { id: 3 },
        ];
        let mut sink = SilentAudio::default();
        sink.play_events(&events);
        assert_eq!(sink.played(), 1);
    }

    #[test]
    fn test_voices_are_audible() {
        let all = [
            SoundEffect::Shoot,
            SoundEffect::EnemyHit,
            SoundEffect::EnemyDefeated,
            SoundEffect::BossDefeated,
            SoundEffect::PlayerHit,
            SoundEffect::ToolPickup,
            SoundEffect::LevelUp,
            SoundEffect::GameOver,
        ];
        for effect in all {
            assert!(!effect.voices().is_empty());
            for v in effect.voices() {
                // Exponential ramps need positive targets
                assert!(v.start_hz > 0.0 && v.end_hz > 0.0);
                assert!(v.duration > 0.0 && v.gain > 0.0);
            }
        }
    }
}
