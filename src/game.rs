//! Game mode state machine
//!
//! ```text
//! loading → menu → playing ⇄ paused
//!                  playing → gameOver → menu
//! any → error (fatal init or tick failure)
//! ```
//!
//! Input events drive transitions; the frame clock drives ticks while playing.

use std::fmt;

use crate::achievements::AchievementTracker;
use crate::config::GameConfig;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{GameEvent, GameSession, MoveInput, TickInput, tick};
use crate::sync::ProgressSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    Loading,
    Menu,
    Playing,
    Paused,
    GameOver,
    /// Unrecoverable; the page/app must be restarted
    Error,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Loading => "loading",
            GameMode::Menu => "menu",
            GameMode::Playing => "playing",
            GameMode::Paused => "paused",
            GameMode::GameOver => "gameOver",
            GameMode::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Required runtime capability is missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    MissingCapability(&'static str),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::MissingCapability(what) => write!(f, "{} is not available", what),
        }
    }
}

impl std::error::Error for InitError {}

/// Discrete input from the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Direction),
    KeyUp(Direction),
    Fire,
    PauseToggle,
    PointerClick,
    /// Tab hidden / window backgrounded
    VisibilityLost,
    /// Assets and runtime are ready
    Ready,
    InitFailed(InitError),
}

impl InputEvent {
    /// Map a keyboard key (DOM `KeyboardEvent.key` names)
    pub fn from_key(key: &str, pressed: bool) -> Option<Self> {
        let dir = match key {
            "ArrowLeft" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            "ArrowUp" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            _ => None,
        };
        if let Some(dir) = dir {
            return Some(if pressed {
                InputEvent::KeyDown(dir)
            } else {
                InputEvent::KeyUp(dir)
            });
        }
        if !pressed {
            return None;
        }
        match key {
            " " => Some(InputEvent::Fire),
            "Escape" | "p" | "P" => Some(InputEvent::PauseToggle),
            _ => None,
        }
    }
}

/// Message shown in error mode
pub const ERROR_MESSAGE: &str = "Error loading game. Please refresh the page.";

pub struct Game {
    mode: GameMode,
    config: GameConfig,
    session: GameSession,
    achievements: AchievementTracker,
    held: MoveInput,
    fire_queued: bool,
    /// Score of the most recently finished run
    last_score: Option<u64>,
    next_seed: u64,
    accumulator: f32,
    error: Option<String>,
}

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            mode: GameMode::Loading,
            session: GameSession::new(seed, config.clone()),
            config,
            achievements: AchievementTracker::new(),
            held: MoveInput::default(),
            fire_queued: false,
            last_score: None,
            next_seed: seed,
            accumulator: 0.0,
            error: None,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn achievements(&self) -> &AchievementTracker {
        &self.achievements
    }

    pub fn last_score(&self) -> Option<u64> {
        self.last_score
    }

    /// Why the game is in error mode
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Apply an input event. Returns the new mode if it changed.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<GameMode> {
        let before = self.mode;

        match (self.mode, event) {
            (GameMode::Error, _) => {}
            (_, InputEvent::InitFailed(e)) => self.fail(e.to_string()),

            // Held keys are tracked in every mode so nothing sticks across a pause
            (_, InputEvent::KeyDown(dir)) => self.set_held(dir, true),
            (_, InputEvent::KeyUp(dir)) => self.set_held(dir, false),

            (GameMode::Loading, InputEvent::Ready) => self.mode = GameMode::Menu,

            (GameMode::Menu, InputEvent::PointerClick | InputEvent::Fire) => self.start(),

            (GameMode::Playing, InputEvent::Fire | InputEvent::PointerClick) => {
                self.fire_queued = true
            }
            (GameMode::Playing, InputEvent::PauseToggle | InputEvent::VisibilityLost) => {
                self.mode = GameMode::Paused
            }

            (GameMode::Paused, InputEvent::PauseToggle) => {
                self.accumulator = 0.0;
                self.mode = GameMode::Playing
            }

            (GameMode::GameOver, InputEvent::PointerClick | InputEvent::Fire) => {
                self.reset();
                self.mode = GameMode::Menu
            }

            _ => {}
        }

        if self.mode != before {
            log::info!("Mode {} -> {}", before.as_str(), self.mode.as_str());
            Some(self.mode)
        } else {
            None
        }
    }

    fn set_held(&mut self, dir: Direction, down: bool) {
        match dir {
            Direction::Left => self.held.left = down,
            Direction::Right => self.held.right = down,
            Direction::Up => self.held.up = down,
            Direction::Down => self.held.down = down,
        }
    }

    /// Fresh session with a new seed
    fn reset(&mut self) {
        self.next_seed = self
            .next_seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.session = GameSession::new(self.next_seed, self.config.clone());
        self.achievements = AchievementTracker::new();
        self.fire_queued = false;
        self.accumulator = 0.0;
    }

    fn start(&mut self) {
        self.reset();
        self.mode = GameMode::Playing;
    }

    /// Enter error mode; no simulation runs afterwards
    pub fn fail(&mut self, reason: String) {
        log::error!("Fatal: {}", reason);
        self.error = Some(reason);
        self.mode = GameMode::Error;
    }

    /// Run exactly one tick if playing
    pub fn step(&mut self) -> Vec<GameEvent> {
        if self.mode != GameMode::Playing {
            return Vec::new();
        }

        let input = TickInput {
            movement: self.held,
            fire: std::mem::take(&mut self.fire_queued),
        };

        let report = match tick(&mut self.session, &input, SIM_DT) {
            Ok(report) => report,
            Err(e) => {
                self.fail(format!("simulation error: {}", e));
                return Vec::new();
            }
        };

        for event in &report.events {
            self.achievements.record(event, self.session.score);
        }

        if report.game_over {
            self.last_score = Some(self.session.score);
            self.mode = GameMode::GameOver;
            log::info!("Mode playing -> gameOver");
        }

        report.events
    }

    /// Advance by a frame's worth of wall time using fixed ticks
    pub fn update(&mut self, frame_dt: f32) -> Vec<GameEvent> {
        if self.mode != GameMode::Playing {
            return Vec::new();
        }

        // Clamp long frames (tab switch, debugger) so we don't fast-forward
        self.accumulator += frame_dt.min(0.1);

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.step());
            self.accumulator -= SIM_DT;
            substeps += 1;
            if self.mode != GameMode::Playing {
                self.accumulator = 0.0;
                break;
            }
        }
        events
    }

    /// Current progress as an immutable record
    pub fn snapshot(&self, timestamp: f64) -> ProgressSnapshot {
        ProgressSnapshot::new(
            self.session.score,
            self.session.level,
            self.achievements.unlocked().clone(),
            timestamp,
        )
    }
}
