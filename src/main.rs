//! Spectre Arena entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent};

    use spectre_arena::asset_loading::{self, LoadEvent, LoadingTracker, ModelData, PlayerModel};
    use spectre_arena::consts::*;
    use spectre_arena::hud::{self, HudSnapshot, HudView};
    use spectre_arena::input::KeyState;
    use spectre_arena::renderer::{FollowCamera, RenderState, scene};
    use spectre_arena::sim::{GameEvent, GamePhase, GameState, tick};
    use spectre_arena::{FrameClock, QualityPreset, Settings, Tuning};

    const TUNING_URL: &str = "assets/tuning.json";
    const MODEL_URL: &str = "assets/ghost.json";
    /// Delay before the controls panel pops up on a fresh page
    const CONTROLS_HINT_MS: i32 = 3000;

    /// Game instance holding all state
    struct Game {
        state: GameState,
        tuning: Tuning,
        settings: Settings,
        keys: KeyState,
        hud: HudView,
        model: PlayerModel,
        camera: FollowCamera,
        render_state: Option<RenderState>,
        clock: FrameClock,
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning, settings: Settings, model: PlayerModel) -> Self {
            let state = GameState::new(seed, &tuning);
            let camera = FollowCamera::new(state.player.position);
            Self {
                state,
                tuning,
                settings,
                keys: KeyState::new(),
                hud: HudView::new(),
                model,
                camera,
                render_state: None,
                clock: FrameClock::new(),
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = FrameClock::clamp_delta(dt);
            for _ in 0..self.clock.advance(dt) {
                // One-shot presses are consumed by the first substep
                let input = self.keys.take_input();
                for event in tick(&mut self.state, &input, &self.tuning, SIM_DT) {
                    log_event(&event);
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }

            let target = self.state.player.position;
            if self.settings.reduced_motion {
                self.camera.snap(target);
            } else {
                self.camera.update(target, dt);
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(render_state) = &mut self.render_state {
                let scene = scene::build(&self.state, &self.model, &self.settings, self.camera.position);
                let camera = self
                    .camera
                    .uniform(render_state.aspect(), self.settings.quality.fog_enabled());
                match render_state.render(&scene, &camera) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let snapshot = HudSnapshot::from_state(&self.state, &self.tuning);
            let fps = self.settings.show_fps.then_some(self.fps);
            self.hud.apply(&document, &snapshot, fps);
        }

        /// Reset game state for restart
        fn restart(&mut self, seed: u64) {
            self.state.restart(seed, &self.tuning);
            self.keys.clear();
            self.hud.reset();
            self.camera.snap(self.state.player.position);
            self.clock.reset();
        }

        /// F2 quality, F3 FPS counter, F4 reduced motion. Returns true if handled.
        fn handle_settings_key(&mut self, code: &str) -> bool {
            match code {
                "F2" => {
                    let next = self.settings.quality.next();
                    self.settings.apply_preset(next);
                    log::info!("Quality: {}", next.as_str());
                }
                "F3" => {
                    self.settings.show_fps = !self.settings.show_fps;
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        hud::show_fps(&document, self.settings.show_fps);
                    }
                }
                "F4" => {
                    self.settings.reduced_motion = !self.settings.reduced_motion;
                    log::info!("Reduced motion: {}", self.settings.reduced_motion);
                }
                _ => return false,
            }
            self.settings.save();
            true
        }
    }

    fn log_event(event: &GameEvent) {
        match event {
            GameEvent::EnemyKilled { id, .. } => log::info!("Enemy {} defeated", id.0),
            GameEvent::Paused => log::info!("Paused"),
            GameEvent::Resumed => log::info!("Resumed"),
            other => log::debug!("{:?}", other),
        }
    }

    fn set_loading_progress(document: &Document, percent: f32) {
        if let Some(el) = document.query_selector("#loading-screen .progress").ok().flatten() {
            let _ = el.set_attribute("style", &format!("width: {:.0}%", percent));
        }
    }

    fn report(tracker: &mut LoadingTracker, document: &Document, event: LoadEvent) {
        tracker.handle(event);
        set_loading_progress(document, tracker.progress());
    }

    /// `?quality=low|medium|high` overrides the stored preset for this visit
    fn quality_from_url(window: &web_sys::Window) -> Option<QualityPreset> {
        let search = window.location().search().ok()?;
        search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|kv| kv.strip_prefix("quality="))
            .find_map(QualityPreset::parse)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Spectre Arena starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Assets: both count toward the loading bar from the start
        let mut tracker = LoadingTracker::new();
        tracker.handle(LoadEvent::Start(TUNING_URL.to_string()));
        tracker.handle(LoadEvent::Start(MODEL_URL.to_string()));
        set_loading_progress(&document, tracker.progress());

        let tuning = match asset_loading::fetch_text(TUNING_URL, |e| report(&mut tracker, &document, e)).await {
            Ok(text) => Tuning::from_json(&text).unwrap_or_else(|e| {
                log::warn!("Invalid tuning file ({}), using defaults", e);
                Tuning::default()
            }),
            Err(e) => {
                log::warn!("{}; using default tuning", e);
                Tuning::default()
            }
        };
        let model = PlayerModel::from_result(
            asset_loading::fetch_text(MODEL_URL, |e| report(&mut tracker, &document, e))
                .await
                .and_then(|text| ModelData::from_json(&text)),
        );
        if tracker.is_finished() {
            if let Some(el) = document.get_element_by_id("loading-screen") {
                let _ = el.class_list().add_1("hidden");
            }
        }
        for (name, reason) in tracker.failures() {
            log::warn!("{} unavailable: {}", name, reason);
        }

        let mut settings = Settings::load();
        if let Some(preset) = quality_from_url(&window) {
            settings.apply_preset(preset);
        }
        hud::show_fps(&document, settings.show_fps);

        let canvas: HtmlCanvasElement = match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
        {
            Some(canvas) => canvas,
            None => {
                log::error!("No <canvas id=\"canvas\"> on the page");
                return;
            }
        };

        // Set canvas size
        let (width, height) = canvas_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, tuning, settings, model)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        }

        setup_input_handlers(game.clone());
        setup_auto_pause(game.clone());
        setup_buttons(game.clone());
        setup_resize(&canvas, game.clone());
        schedule_controls_hint();

        // Start game loop
        request_animation_frame(game);

        log::info!("Spectre Arena running!");
    }

    fn canvas_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let code = event.code();
                let handled =
                    g.keys.key_down(&code, event.repeat()) || (!event.repeat() && g.handle_settings_key(&code));
                if handled {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().keys.key_up(&event.code()) {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Release held keys and pause when the page loses focus
    fn focus_lost(game: &Rc<RefCell<Game>>, reason: &str) {
        let mut g = game.borrow_mut();
        g.keys.clear();
        if g.settings.pause_on_blur && g.state.phase == GamePhase::Playing {
            g.keys.request_pause();
            log::info!("Auto-paused ({})", reason);
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    focus_lost(&game, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                focus_lost(&game, "window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-button") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
                log::info!("Game restarted with seed: {}", seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Closing the controls panel also resumes a paused game
        if let Some(btn) = document.get_element_by_id("close-controls") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::Paused {
                    g.keys.request_pause();
                } else if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                    hud::show_controls(&document, false);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = canvas_size(&window, &canvas);
            canvas.set_width(width);
            canvas.set_height(height);
            if let Some(render_state) = &mut game.borrow_mut().render_state {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn schedule_controls_hint() {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move || {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                hud::show_controls(&document, true);
            }
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            CONTROLS_HINT_MS,
        );
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run: a scripted ghost circles the arena and casts on a rota.
///
/// `spectre-arena [seed] [seconds]`, with `RUST_LOG=debug` for every event.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use spectre_arena::Tuning;
    use spectre_arena::consts::SIM_DT;
    use spectre_arena::sim::{Ability, GameEvent, GameState, TickInput, tick};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let seconds = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0f32);
    log::info!("Spectre Arena (native) headless run, seed {} for {}s", seed, seconds);

    let tuning = Tuning::default();
    let mut state = GameState::new(seed, &tuning);
    let steps = (seconds / SIM_DT) as u32;
    let mut casts = [0u32; Ability::COUNT];

    for step in 0..steps {
        let t = step as f32 * SIM_DT;
        let mut input = TickInput {
            movement: Vec2::new((t * 0.5).cos(), (t * 0.5).sin()),
            ..Default::default()
        };
        // Cycle through the abilities twice a second
        if step % 60 == 0 {
            let ability = Ability::ALL[(step / 60) as usize % Ability::COUNT];
            input.cast[ability.index()] = true;
        }

        for event in tick(&mut state, &input, &tuning, SIM_DT) {
            match event {
                GameEvent::AbilityCast { ability } => casts[ability.index()] += 1,
                other => log::debug!("{:?}", other),
            }
        }
        if state.is_game_over() {
            break;
        }
    }

    for ability in Ability::ALL {
        log::info!("{}: cast {} times", ability.name(), casts[ability.index()]);
    }
    println!(
        "seed {}: {:.1}s survived, {} kills, health {:.0}, {} enemies alive",
        seed,
        state.time,
        state.kills,
        state.player.health,
        state.enemies.alive_count()
    );
}
