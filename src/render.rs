//! Rendering
//!
//! The game hands a read-only `FrameView` to a `Renderer` each frame. How
//! each entity looks comes from `Renderable`, so renderers never probe for
//! sprites at draw time.

use glam::Vec2;

use crate::achievements::AchievementTracker;
use crate::game::{ERROR_MESSAGE, Game, GameMode};
use crate::sim::{Enemy, EnemyKind, GameSession, Player, PowerUp, Projectile, ToolKind};
use crate::sync::SyncStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
    /// Two-frame wobble; the index picks the frame
    Blob(usize),
}

/// How to draw one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub shape: Shape,
    /// CSS color
    pub color: &'static str,
    pub pos: Vec2,
    pub size: f32,
}

pub trait Renderable {
    fn appearance(&self) -> Appearance;
}

fn tool_color(tool: ToolKind) -> &'static str {
    match tool {
        ToolKind::Toothbrush => "#4fc3f7",
        ToolKind::Floss => "#e0e0e0",
        ToolKind::Mouthwash => "#66bb6a",
        ToolKind::Electric => "#ffeb3b",
    }
}

impl Renderable for Player {
    fn appearance(&self) -> Appearance {
        Appearance {
            shape: Shape::Square,
            color: tool_color(self.tool),
            pos: self.pos,
            size: self.size,
        }
    }
}

impl Renderable for Enemy {
    fn appearance(&self) -> Appearance {
        let color = match self.kind {
            EnemyKind::BasicCavity => "#5d4037",
            EnemyKind::SugarCrystal => "#f8bbd0",
            EnemyKind::SugarBug => "#8bc34a",
            EnemyKind::FoodParticle => "#ff9800",
            EnemyKind::PlaqueBoss => "#fdd835",
        };
        Appearance {
            shape: Shape::Blob(self.sprite_frame()),
            color,
            pos: self.pos,
            size: self.size,
        }
    }
}

impl Renderable for Projectile {
    fn appearance(&self) -> Appearance {
        Appearance {
            shape: Shape::Circle,
            color: "#ffffff",
            pos: self.pos,
            size: crate::consts::PROJECTILE_SIZE,
        }
    }
}

impl Renderable for PowerUp {
    fn appearance(&self) -> Appearance {
        Appearance {
            shape: Shape::Circle,
            color: tool_color(self.grants),
            pos: self.pos,
            size: crate::consts::POWERUP_SIZE,
        }
    }
}

/// Everything a renderer may look at for one frame
pub struct FrameView<'a> {
    pub mode: GameMode,
    pub session: &'a GameSession,
    pub achievements: &'a AchievementTracker,
    pub last_score: Option<u64>,
    pub error: Option<&'a str>,
    pub sync: Option<SyncStatus>,
}

impl<'a> FrameView<'a> {
    pub fn new(game: &'a Game, sync: Option<SyncStatus>) -> Self {
        Self {
            mode: game.mode(),
            session: game.session(),
            achievements: game.achievements(),
            last_score: game.last_score(),
            error: game.error(),
            sync,
        }
    }

    /// All drawable entities, back to front
    pub fn sprites(&self) -> Vec<Appearance> {
        let s = self.session;
        let count = 1 + s.enemies.len() + s.projectiles.len() + s.powerups.len();
        let mut out = Vec::with_capacity(count);
        out.extend(s.powerups.iter().map(Renderable::appearance));
        out.extend(s.enemies.iter().map(Renderable::appearance));
        out.extend(s.projectiles.iter().map(Renderable::appearance));
        out.push(s.player.appearance());
        out
    }

    /// HUD text, one entry per line
    pub fn hud_lines(&self) -> Vec<String> {
        let s = self.session;
        let mut lines = match self.mode {
            GameMode::Loading => vec!["Loading...".to_string()],
            GameMode::Menu => {
                let mut lines = vec!["Dental Defenders".to_string(), "Click to start".to_string()];
                if let Some(score) = self.last_score {
                    lines.push(format!("Last score: {}", score));
                }
                lines
            }
            GameMode::Playing | GameMode::Paused => {
                let mut lines = vec![
                    format!("Score: {}", s.score),
                    format!("Level: {}", s.level),
                    format!("Health: {}", s.player.health),
                    format!("Tool: {}", s.player.tool.as_str()),
                ];
                if self.mode == GameMode::Paused {
                    lines.push("Paused".to_string());
                }
                lines
            }
            GameMode::GameOver => vec![
                "Game Over".to_string(),
                format!("Final score: {}", s.score),
                format!("Achievements: {}", self.achievements.unlocked().len()),
                "Click to continue".to_string(),
            ],
            GameMode::Error => match self.error {
                Some(reason) => vec![format!("Error: {}", reason), ERROR_MESSAGE.to_string()],
                None => vec![ERROR_MESSAGE.to_string()],
            },
        };

        if let Some(sync) = &self.sync {
            if sync.offline_mode || !sync.online {
                lines.push(format!("Offline ({} saved locally)", sync.queued));
            } else if sync.in_flight {
                lines.push("Syncing...".to_string());
            }
        }
        lines
    }
}

/// Draws frames. Implementations must tolerate any mode.
pub trait Renderer {
    fn draw(&mut self, view: &FrameView<'_>);
}

/// Draws nothing (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullRenderer {
    frames: u64,
}

impl NullRenderer {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for NullRenderer {
    fn draw(&mut self, _view: &FrameView<'_>) {
        self.frames += 1;
    }
}

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;

#[cfg(target_arch = "wasm32")]
mod canvas {
    use std::f64::consts::TAU;

    use web_sys::CanvasRenderingContext2d;

    use super::{Appearance, FrameView, Renderer, Shape};
    use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};

    pub struct CanvasRenderer {
        ctx: CanvasRenderingContext2d,
    }

    impl CanvasRenderer {
        pub fn new(ctx: CanvasRenderingContext2d) -> Self {
            Self { ctx }
        }

        fn sprite(&self, a: &Appearance) {
            let ctx = &self.ctx;
            let (x, y) = (a.pos.x as f64, a.pos.y as f64);
            let half = a.size as f64 / 2.0;
            ctx.set_fill_style_str(a.color);
            match a.shape {
                Shape::Square => ctx.fill_rect(x - half, y - half, half * 2.0, half * 2.0),
                Shape::Circle => {
                    ctx.begin_path();
                    let _ = ctx.arc(x, y, half, 0.0, TAU);
                    ctx.fill();
                }
                Shape::Blob(frame) => {
                    let squash = if frame == 0 { 1.0 } else { 0.9 };
                    ctx.begin_path();
                    let _ = ctx.ellipse(x, y, half, half * squash, 0.0, 0.0, TAU);
                    ctx.fill();
                }
            }
        }
    }

    impl Renderer for CanvasRenderer {
        fn draw(&mut self, view: &FrameView<'_>) {
            let ctx = &self.ctx;
            let (w, h) = (PLAYFIELD_WIDTH as f64, PLAYFIELD_HEIGHT as f64);
            ctx.set_fill_style_str("#102030");
            ctx.fill_rect(0.0, 0.0, w, h);

            for sprite in view.sprites() {
                self.sprite(&sprite);
            }

            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("18px sans-serif");
            for (i, line) in view.hud_lines().iter().enumerate() {
                let _ = ctx.fill_text(line, 12.0, 28.0 + i as f64 * 24.0);
            }
        }
    }
}
