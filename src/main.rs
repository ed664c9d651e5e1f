//! Dental Defenders entry point
//!
//! Web: canvas rendering, DOM input, and progress sync driven from the
//! browser event loop. Native: a headless autoplay run that exercises the
//! same simulation and offline queue.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use dental_defenders::audio::{AudioSink, WebAudio};
    use dental_defenders::game::InitError;
    use dental_defenders::persistence::{BlobStore, MemoryBlobStore};
    use dental_defenders::render::{CanvasRenderer, FrameView, Renderer};
    use dental_defenders::sim::GameEvent;
    use dental_defenders::sync::{
        OfflineStore, PROGRESS_TABLE, ProgressSnapshot, RemoteStore, SaveAction, SyncManager,
    };
    use dental_defenders::{Config, Game, GameMode, InputEvent, platform};

    /// Interval for connection retries and the periodic flush check
    const SYNC_POLL_MS: i32 = 1000;

    struct App {
        game: Game,
        renderer: Option<CanvasRenderer>,
        audio: WebAudio,
        sync: SyncManager<Box<dyn BlobStore>>,
        remote: Rc<OfflineStore>,
        last_time: f64,
    }

    impl App {
        /// Forward an input event; player input also keeps the account alive
        fn input(&mut self, event: InputEvent) {
            self.sync.note_activity(platform::now_ms());
            self.game.handle_event(event);
        }
    }

    type Shared = Rc<RefCell<App>>;

    fn open_store() -> Box<dyn BlobStore> {
        match platform::open_store() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("LocalStorage unavailable ({}), progress kept in memory", e);
                Box::new(MemoryBlobStore::new())
            }
        }
    }

    fn canvas_context() -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), InitError> {
        let missing = InitError::MissingCapability("canvas");
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(InitError::MissingCapability("document"))?;
        let canvas = document
            .get_element_by_id("game-canvas")
            .ok_or(missing.clone())?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| missing.clone())?;
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .ok_or(missing.clone())?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| missing)?;
        Ok((canvas, ctx))
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Dental Defenders starting...");

        let store = open_store();
        let config = Config::load(&store);
        let now = platform::now_ms();

        let mut game = Game::new(config.game.clone(), platform::fresh_seed());
        let (canvas, renderer) = match canvas_context() {
            Ok((canvas, ctx)) => (Some(canvas), Some(CanvasRenderer::new(ctx))),
            Err(e) => {
                game.handle_event(InputEvent::InitFailed(e));
                show_fatal(game.error().unwrap_or(dental_defenders::game::ERROR_MESSAGE));
                (None, None)
            }
        };

        // Guest play: no account is set and the remote is `OfflineStore`, so
        // snapshots only ever go to the local queue. A hosted build swaps in a
        // real `RemoteStore` and calls `sign_in` + `SyncManager::set_account`
        // from its login form; the queue then flushes on the next trigger.
        let sync = SyncManager::new(store, config.sync, platform::is_online(), now);
        let app = Rc::new(RefCell::new(App {
            game,
            renderer,
            audio: WebAudio::new(),
            sync,
            remote: Rc::new(OfflineStore),
            last_time: 0.0,
        }));

        let Some(canvas) = canvas else {
            return;
        };

        setup_input_handlers(&canvas, app.clone());
        setup_visibility(app.clone());
        setup_connectivity(app.clone());
        setup_sync_poll(app.clone());
        setup_shutdown(app.clone());

        app.borrow_mut().game.handle_event(InputEvent::Ready);
        spawn_connect(&app);
        request_animation_frame(app);
    }

    /// Last-resort message when there is nothing to draw on
    fn show_fatal(message: &str) {
        let el = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("status"));
        match el {
            Some(el) => el.set_text_content(Some(message)),
            None => web_sys::console::error_1(&message.into()),
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Shared) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(input) = InputEvent::from_key(&event.key(), pressed) {
                    event.prevent_default();
                    app.borrow_mut().input(input);
                }
            });
            let _ = document
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            app.borrow_mut().input(InputEvent::PointerClick);
        });
        let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Hidden tab pauses the game
    fn setup_visibility(app: Shared) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                app.borrow_mut().game.handle_event(InputEvent::VisibilityLost);
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_connectivity(app: Shared) {
        let Some(window) = web_sys::window() else {
            return;
        };
        for (event_name, online) in [("online", true), ("offline", false)] {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let flush = app.borrow_mut().sync.set_online(online);
                if online {
                    spawn_connect(&app);
                }
                if flush {
                    spawn_flush(&app);
                }
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_sync_poll(app: Shared) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            spawn_connect(&app);
            let due = app.borrow_mut().sync.poll(platform::now_ms());
            if due {
                spawn_flush(&app);
            }
        });
        if let Err(e) = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            SYNC_POLL_MS,
        ) {
            log::warn!("Could not schedule sync poll: {:?}", e);
        }
        closure.forget();
    }

    /// Best-effort delivery of the queue when the page goes away
    fn setup_shutdown(app: Shared) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let batch = app.borrow_mut().sync.shutdown_batch(platform::now_ms());
            if let Some(batch) = batch {
                let app = app.clone();
                let remote = app.borrow().remote.clone();
                spawn_local(async move {
                    let result = remote.insert(PROGRESS_TABLE, batch.records()).await;
                    app.borrow_mut()
                        .sync
                        .complete_flush(batch, result, platform::now_ms());
                });
            }
        });
        let _ = window
            .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // === Sync tasks ===
    // The manager is borrowed only between awaits, never across one.

    fn spawn_save(app: &Shared, snapshot: ProgressSnapshot) {
        let (action, remote) = {
            let mut a = app.borrow_mut();
            let action = a.sync.begin_save(snapshot, platform::now_ms());
            (action, a.remote.clone())
        };
        let SaveAction::Send(snapshot) = action else {
            return;
        };
        let app = app.clone();
        spawn_local(async move {
            let result = remote
                .insert(PROGRESS_TABLE, std::slice::from_ref(&snapshot))
                .await;
            app.borrow_mut()
                .sync
                .complete_save(snapshot, result, platform::now_ms());
        });
    }

    fn spawn_flush(app: &Shared) {
        let (batch, remote) = {
            let mut a = app.borrow_mut();
            (a.sync.begin_flush(platform::now_ms()), a.remote.clone())
        };
        let Some(batch) = batch else {
            return;
        };
        let app = app.clone();
        spawn_local(async move {
            let result = remote.insert(PROGRESS_TABLE, batch.records()).await;
            app.borrow_mut()
                .sync
                .complete_flush(batch, result, platform::now_ms());
        });
    }

    fn spawn_connect(app: &Shared) {
        let (attempt, remote) = {
            let mut a = app.borrow_mut();
            (a.sync.begin_connect(platform::now_ms()), a.remote.clone())
        };
        if attempt.is_none() {
            return;
        }
        let app = app.clone();
        spawn_local(async move {
            let result = remote.connect().await;
            let flush = app
                .borrow_mut()
                .sync
                .complete_connect(result, platform::now_ms());
            if flush {
                spawn_flush(&app);
            }
        });
    }

    // === Frame loop ===

    fn request_animation_frame(app: Shared) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| game_loop(app, time));
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Shared, time: f64) {
        let snapshots = {
            let mut a = app.borrow_mut();
            if a.game.mode() == GameMode::Error {
                // Frozen error frame; nothing else runs
                draw(&mut a);
                return;
            }

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            a.last_time = time;

            let events = a.game.update(dt);
            a.audio.play_events(&events);
            draw(&mut a);

            let now = platform::now_ms();
            events
                .iter()
                .filter(|e| {
                    matches!(
                        e,
                        GameEvent::LevelUp { .. } | GameEvent::PlayerDefeated { .. }
                    )
                })
                .map(|_| a.game.snapshot(now))
                .collect::<Vec<_>>()
        };

        for snapshot in snapshots {
            spawn_save(&app, snapshot);
        }

        request_animation_frame(app);
    }

    fn draw(app: &mut App) {
        let status = app.sync.status();
        let App { game, renderer, .. } = app;
        if let Some(renderer) = renderer {
            renderer.draw(&FrameView::new(game, Some(status)));
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use dental_defenders::audio::{AudioSink, SilentAudio};
    use dental_defenders::game::Direction;
    use dental_defenders::persistence::{BlobStore, MemoryBlobStore};
    use dental_defenders::render::{FrameView, NullRenderer, Renderer};
    use dental_defenders::sim::{GameEvent, GameSession};
    use dental_defenders::sync::{OfflineStore, SyncManager};
    use dental_defenders::{Config, Game, GameMode, InputEvent, platform};

    /// Longest run, in ticks (three minutes of play)
    const MAX_TICKS: u64 = 60 * 180;
    /// Ticks between autopilot shots
    const FIRE_EVERY: u64 = 8;

    /// Chase the lowest enemy horizontally
    fn steer(session: &GameSession) -> Option<Direction> {
        let target = session
            .enemies
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;
        let dx = target.pos.x - session.player.pos.x;
        if dx.abs() < 4.0 {
            None
        } else if dx < 0.0 {
            Some(Direction::Left)
        } else {
            Some(Direction::Right)
        }
    }

    pub fn run(seed: u64) {
        let store: Box<dyn BlobStore> = match platform::open_store() {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("Data directory unavailable ({}), using memory store", e);
                Box::new(MemoryBlobStore::new())
            }
        };
        let config = Config::load(&store);
        let remote = OfflineStore;
        let mut sync = SyncManager::new(store, config.sync, platform::is_online(), platform::now_ms());
        let mut game = Game::new(config.game, seed);
        let mut audio = SilentAudio::default();
        let mut renderer = NullRenderer::default();

        game.handle_event(InputEvent::Ready);
        game.handle_event(InputEvent::PointerClick);
        log::info!("Autoplay run with seed {}", seed);

        let mut steering = None;
        for t in 0..MAX_TICKS {
            let wanted = steer(game.session());
            if wanted != steering {
                if let Some(dir) = steering {
                    game.handle_event(InputEvent::KeyUp(dir));
                }
                if let Some(dir) = wanted {
                    game.handle_event(InputEvent::KeyDown(dir));
                }
                steering = wanted;
            }
            if t % FIRE_EVERY == 0 {
                game.handle_event(InputEvent::Fire);
            }

            let events = game.step();
            audio.play_events(&events);
            renderer.draw(&FrameView::new(&game, Some(sync.status())));

            for event in &events {
                match event {
                    GameEvent::LevelUp { .. } | GameEvent::PlayerDefeated { .. } => {
                        let now = platform::now_ms();
                        pollster::block_on(sync.save(&remote, game.snapshot(now), now));
                    }
                    GameEvent::EnemyDefeated { kind, .. } if kind.is_boss() => {
                        log::info!("Boss defeated at tick {}", t);
                    }
                    _ => {}
                }
            }

            if game.mode() != GameMode::Playing {
                break;
            }
        }

        let session = game.session();
        log::info!(
            "Run finished: mode {}, score {}, level {}, health {}, {} ticks",
            game.mode().as_str(),
            session.score,
            session.level,
            session.player.health,
            session.time_ticks
        );
        for achievement in game.achievements().unlocked() {
            log::info!("Achievement: {}", achievement.title());
        }
        if let Some(batch) = sync.shutdown_batch(platform::now_ms()) {
            log::info!("{} snapshots left for the next online session", batch.len());
        }
        let status = sync.status();
        log::info!(
            "Sync: {} queued, pending retry {}, {} sounds, {} frames",
            status.queued,
            status.pending_retry,
            audio.played(),
            renderer.frames()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Dental Defenders (native) starting...");
    log::info!("Native mode runs a headless autoplay session - build for wasm32 to play");

    let seed = match std::env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(seed) => seed,
            Err(_) => {
                log::error!("Seed must be an unsigned integer, got {:?}", arg);
                std::process::exit(2);
            }
        },
        None => dental_defenders::platform::fresh_seed(),
    };
    headless::run(seed);
}
