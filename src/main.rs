//! Skyflap entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{AudioBuffer, AudioContext, HtmlCanvasElement, HtmlInputElement};

    use skyflap::assets::{self, AssetError, AssetId, AssetStatus, Assets, DecodedImage};
    use skyflap::audio::{AudioManager, decode_clip};
    use skyflap::leaderboard::{
        HttpScoreService, Identity, LeaderboardView, Submission, display_name, format_relative,
    };
    use skyflap::renderer::{Sprite, SpriteRenderer};
    use skyflap::sim::{GamePhase, SoundCue};
    use skyflap::web::{fetch_array_buffer, fetch_bytes};
    use skyflap::{Game, Settings};

    type SharedAssets = Rc<RefCell<Assets<AudioBuffer>>>;

    enum Loaded {
        Sprite(Sprite, DecodedImage),
        Clip(SoundCue, AudioBuffer),
    }

    /// Everything the frame callback touches
    struct App {
        game: Game,
        renderer: SpriteRenderer,
        audio: AudioManager,
        assets: SharedAssets,
        textures_uploaded: bool,
        last_status: Option<AssetStatus>,
        settings: Settings,
        leaderboard: Rc<RefCell<LeaderboardView>>,
        /// Pending animation frame, cancelled on teardown
        raf_handle: Option<i32>,
        stopped: bool,
    }

    impl App {
        fn ready(&self) -> bool {
            self.assets.borrow().is_ready()
        }

        fn press(&mut self) {
            if !self.ready() {
                return;
            }
            self.audio.resume();
            self.game.press(js_sys::Date::now());
        }

        fn restart(&mut self) {
            if !self.ready() {
                return;
            }
            let seed = js_sys::Date::now() as u64;
            if self.game.restart(seed) {
                set_class("game-over", "hidden");
            }
        }

        fn frame(&mut self, time: f64) {
            let status = self.assets.borrow().status();
            if self.last_status.as_ref() != Some(&status) {
                show_status(&status);
                if status == AssetStatus::Ready {
                    log::info!("All assets loaded");
                }
                self.last_status = Some(status.clone());
            }
            if status != AssetStatus::Ready {
                return;
            }

            if !self.textures_uploaded {
                let assets = self.assets.borrow();
                for (sprite, image) in &assets.sprites {
                    self.renderer.upload_sprite(*sprite, image);
                }
                self.textures_uploaded = true;
            }

            let out = self.game.frame(time);

            {
                let assets = self.assets.borrow();
                for cue in &out.frame.sounds {
                    if let Some(clip) = assets.clips.get(cue) {
                        self.audio.play(clip);
                    }
                }
            }

            match self.renderer.render(&out.frame) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let (w, h) = self.renderer.size;
                    self.renderer.resize(w, h);
                }
                Err(e) => log::warn!("Render failed: {:?}", e),
            }

            if let Some(score) = out.game_over {
                self.on_game_over(score);
            }
        }

        /// Show the game-over panel, then submit and refresh the leaderboard
        /// in the background
        fn on_game_over(&mut self, score: u64) {
            set_text("final-score", &score.to_string());
            set_class("game-over", "");
            render_leaderboard(&self.leaderboard.borrow());

            let submission = match signed_in_user() {
                Some(user_id) => Submission::new(score, Identity::User(user_id)),
                None => {
                    let typed = input_value("player-name").unwrap_or_default();
                    let name = display_name(&typed);
                    if typed.trim() != self.settings.player_name {
                        self.settings.player_name = typed.trim().to_string();
                        self.settings.save();
                    }
                    Submission::guest(score, &name)
                }
            };

            let service = HttpScoreService::new(self.settings.score_service_url.clone());
            let view = self.leaderboard.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = service.submit(&submission).await {
                    log::warn!("Score submission failed: {}", e);
                }
                let result = service.fetch_top().await;
                view.borrow_mut().apply(result);
                render_leaderboard(&view.borrow());
            });
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Skyflap starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let (width, height) = canvas_pixel_size(&window, &canvas);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = SpriteRenderer::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let settings = Settings::load();
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);
        if let Some(input) = document
            .get_element_by_id("player-name")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            input.set_value(&settings.player_name);
        }

        let assets: SharedAssets = Rc::new(RefCell::new(Assets::new()));
        spawn_asset_loading(assets.clone(), audio.context());

        let seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game: Game::new(seed),
            renderer,
            audio,
            assets,
            textures_uploaded: false,
            last_status: None,
            settings,
            leaderboard: Rc::new(RefCell::new(LeaderboardView::new())),
            raf_handle: None,
            stopped: false,
        }));

        setup_input_handlers(&canvas, app.clone());
        setup_restart_button(app.clone());
        setup_resize(canvas, app.clone());
        setup_teardown(app.clone());

        request_animation_frame(app);

        log::info!("Skyflap running!");
        Ok(())
    }

    fn canvas_pixel_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn spawn_asset_loading(assets: SharedAssets, ctx: Option<AudioContext>) {
        for id in assets::manifest() {
            let assets = assets.clone();
            let ctx = ctx.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match load_asset(id, ctx.as_ref()).await {
                    Ok(Loaded::Sprite(sprite, image)) => {
                        assets.borrow_mut().insert_sprite(sprite, image)
                    }
                    Ok(Loaded::Clip(cue, clip)) => assets.borrow_mut().insert_clip(cue, clip),
                    Err(e) => assets.borrow_mut().fail(&e),
                }
            });
        }
    }

    async fn load_asset(id: AssetId, ctx: Option<&AudioContext>) -> Result<Loaded, AssetError> {
        let path = id.path();
        let fetch_err = |e: skyflap::web::WebError| AssetError::Fetch {
            path: path.clone(),
            reason: e.to_string(),
        };

        match id {
            AssetId::Sprite(sprite) => {
                let bytes = fetch_bytes(&path).await.map_err(fetch_err)?;
                Ok(Loaded::Sprite(sprite, assets::decode_image(&path, &bytes)?))
            }
            AssetId::Clip(cue) => {
                let ctx = ctx.ok_or_else(|| AssetError::DecodeAudio {
                    path: path.clone(),
                    reason: "audio is unavailable".to_string(),
                })?;
                let data = fetch_array_buffer(&path).await.map_err(fetch_err)?;
                Ok(Loaded::Clip(cue, decode_clip(ctx, &path, &data).await?))
            }
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Pointer (mouse and pen; touch is handled below)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
                if event.pointer_type() != "touch" {
                    app.borrow_mut().press();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::TouchEvent| {
                event.prevent_default();
                app.borrow_mut().press();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let Some(window) = web_sys::window() else { return };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                // Leave typing in the name field alone
                let typing = event
                    .target()
                    .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                    .is_some();
                if typing {
                    return;
                }
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    " " | "ArrowUp" => {
                        event.prevent_default();
                        if !event.repeat() {
                            a.press();
                        }
                    }
                    "Enter" | "r" | "R" => {
                        if a.game.phase() == GamePhase::Over {
                            a.restart();
                        }
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(app: Rc<RefCell<App>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                app.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let (w, h) = canvas_pixel_size(&window, &canvas);
            app.borrow_mut().renderer.resize(w, h);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Stop the loop when the page goes away so no frame runs against a
    /// torn-down session. A page restored from the back/forward cache
    /// starts it again.
    fn setup_teardown(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };

        let hide_app = app.clone();
        let on_hide = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::PageTransitionEvent| {
            let mut a = hide_app.borrow_mut();
            a.stopped = true;
            if let (Some(handle), Some(window)) = (a.raf_handle.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(handle);
            }
            log::info!("Loop stopped");
        });
        let _ = window.add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref());
        on_hide.forget();

        let on_show = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PageTransitionEvent| {
            if !event.persisted() {
                return;
            }
            {
                let mut a = app.borrow_mut();
                if !a.stopped {
                    return;
                }
                a.stopped = false;
                a.game.resume();
            }
            log::info!("Loop resumed");
            request_animation_frame(app.clone());
        });
        let _ = window.add_event_listener_with_callback("pageshow", on_show.as_ref().unchecked_ref());
        on_show.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let callback_app = app.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(callback_app, time);
        });
        let handle = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        app.borrow_mut().raf_handle = handle;
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            a.raf_handle = None;
            if a.stopped {
                return;
            }
            a.frame(time);
        }

        request_animation_frame(app);
    }

    // === DOM helpers ===

    fn element(id: &str) -> Option<web_sys::Element> {
        web_sys::window()?.document()?.get_element_by_id(id)
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_class(id: &str, class: &str) {
        if let Some(el) = element(id) {
            let _ = el.set_attribute("class", class);
        }
    }

    fn input_value(id: &str) -> Option<String> {
        element(id)?
            .dyn_into::<HtmlInputElement>()
            .ok()
            .map(|input| input.value())
    }

    /// Authenticated user id, if the host page signed one in
    fn signed_in_user() -> Option<String> {
        web_sys::window()?
            .document()?
            .body()?
            .get_attribute("data-user-id")
            .filter(|id| !id.is_empty())
    }

    fn show_status(status: &AssetStatus) {
        match status {
            AssetStatus::Loading { loaded, total } => {
                set_text("loading", &format!("Loading {}/{}", loaded, total));
                set_class("loading", "");
            }
            AssetStatus::Ready => set_class("loading", "hidden"),
            AssetStatus::Failed(message) => {
                set_text("loading", &format!("Failed to load assets: {}", message));
                set_class("loading", "error");
            }
        }
    }

    fn render_leaderboard(view: &LeaderboardView) {
        let Some(list) = element("leaderboard-list") else {
            return;
        };
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        match view.last_error() {
            Some(_) => {
                set_text("leaderboard-status", "Leaderboard unavailable, showing last known scores");
                set_class("leaderboard-status", "error");
            }
            None => set_class("leaderboard-status", "hidden"),
        }

        list.set_inner_html("");
        let board = view.snapshot();
        if board.is_empty() {
            list.set_text_content(Some("No scores yet"));
            return;
        }

        let now = js_sys::Date::now() as i64;
        for (rank, entry) in board.ranked() {
            let Ok(row) = document.create_element("li") else {
                continue;
            };
            // Text content only: names are user supplied
            row.set_text_content(Some(&format!(
                "{}. {}  {}  {}",
                rank,
                entry.name,
                entry.score,
                format_relative(now, entry.submitted_at)
            )));
            let _ = list.append_child(&row);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        let message = skyflap::web::js_message(&e);
        log::error!("Startup failed: {}", message);
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("loading"))
        {
            el.set_text_content(Some(&format!("Failed to start: {}", message)));
            let _ = el.set_attribute("class", "error");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    log::info!("Skyflap (native) starting headless run with seed {}", seed);
    log::info!("The playable build targets wasm32 - run with `trunk serve` for the web version");

    let score = headless::run(seed, headless::MAX_FRAMES);
    println!("Final score: {}", score);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted player driving the real frame loop with synthetic timestamps
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use skyflap::Game;
    use skyflap::consts::*;
    use skyflap::sim::Session;
    use skyflap::sim::timebase::FRAME_MS;

    pub const MAX_FRAMES: u32 = 10_000;

    /// Flap when the body sinks below the middle of the next gap
    pub fn wants_flap(session: &Session) -> bool {
        let target = session
            .obstacles
            .iter()
            .find(|o| o.trailing_edge() >= BIRD_X)
            .map(|o| o.gap_top + PIPE_GAP * 0.6)
            .unwrap_or(WORLD_HEIGHT / 2.0);
        let center = session.body.y + BIRD_HEIGHT / 2.0;
        center > target && session.body.vel >= 0.0
    }

    /// Play one run; returns the final score
    pub fn run(seed: u64, max_frames: u32) -> u64 {
        let mut game = Game::new(seed);
        let mut now = 1000.0;
        game.press(now);

        for _ in 0..max_frames {
            now += FRAME_MS;
            if wants_flap(game.session()) {
                game.press(now);
            }
            let out = game.frame(now);
            if let Some(score) = out.game_over {
                return score;
            }
        }

        log::info!("Frame limit reached");
        game.score()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use skyflap::sim::GamePhase;

        #[test]
        fn test_run_terminates_with_same_result_per_seed() {
            assert_eq!(run(7, 2000), run(7, 2000));
        }

        #[test]
        fn test_wants_flap_only_when_sinking_low() {
            let mut session = Session::restarted(1);
            session.body.y = WORLD_HEIGHT - 60.0;
            session.body.vel = 1.0;
            assert!(wants_flap(&session));
            session.body.vel = -2.0;
            assert!(!wants_flap(&session));
            session.body.y = 10.0;
            session.body.vel = 1.0;
            assert!(!wants_flap(&session));
            assert_eq!(session.phase, GamePhase::Running);
        }
    }
}
