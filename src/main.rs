//! Marble Roll entry point
//!
//! Web: wires the selection screen, start button and arrow keys to the
//! session controller and drives the engine bridge from the animation frame.
//! Native: runs a short scripted session against the headless engine.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use marble_roll::consts::*;
    use marble_roll::engine::web::BridgeEngine;
    use marble_roll::{BallCatalog, GameSettings, SessionController, SessionError};

    /// Game instance holding all state
    struct Game {
        session: SessionController,
        engine: BridgeEngine,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                if let Err(e) = self.session.tick(&mut self.engine, SIM_DT) {
                    log::error!("Tick failed: {}", e);
                }
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Marble Roll starting...");

        let engine = match BridgeEngine::from_window() {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("Scene engine unavailable: {}", e);
                return;
            }
        };

        let settings = GameSettings::load();
        let game = Rc::new(RefCell::new(Game {
            session: SessionController::new(BallCatalog::standard(), settings),
            engine,
            accumulator: 0.0,
            last_time: 0.0,
        }));

        setup_ball_options(game.clone());
        setup_start_button(game.clone());
        setup_keyboard(game.clone());

        request_animation_frame(game);

        log::info!("Marble Roll running!");
    }

    /// One round swatch per catalog entry in `#ballOptions`
    fn setup_ball_options(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let Some(container) = document.get_element_by_id("ballOptions") else {
            log::warn!("No #ballOptions container");
            return;
        };

        let variants: Vec<_> = game.borrow().session.catalog().iter().cloned().collect();
        for variant in variants {
            let Ok(option) = document.create_element("div") else {
                continue;
            };
            let style = format!(
                "width: 50px; height: 50px; border-radius: 50%; cursor: pointer; border: none; background: {};",
                variant.swatch().css_background()
            );
            let _ = option.set_attribute("style", &style);
            let _ = option.set_attribute("title", &variant.name);

            let game = game.clone();
            let id = variant.id;
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let _ = game.borrow_mut().session.select(id);
            });
            let _ = option.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();

            let _ = container.append_child(&option);
        }
    }

    fn setup_start_button(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        if let Some(btn) = document.get_element_by_id("startGame") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let window = web_sys::window().unwrap();
                let mut g = game.borrow_mut();
                let Game { session, engine, .. } = &mut *g;
                match session.start_session(engine) {
                    Ok(()) => {
                        if let Some(el) = window
                            .document()
                            .and_then(|d| d.get_element_by_id("ballSelection"))
                        {
                            let _ = el.set_attribute("style", "display: none");
                        }
                    }
                    Err(SessionError::NoVariantSelected) => {
                        let _ = window.alert_with_message("Please select a ball first!");
                    }
                    Err(e) => log::warn!("Could not start: {}", e),
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            let Game { session, engine, .. } = &mut *g;
            if let Err(e) = session.on_key(engine, &event.key(), js_sys::Date::now()) {
                log::warn!("Input failed: {}", e);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
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

            g.update(dt);
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Usage: `marble-roll [variant-id] [settings.json]`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Marble Roll (native) starting...");
    log::info!("Rendering needs the browser build; running a headless session");

    let mut args = std::env::args().skip(1);
    let variant = match args.next().map(|a| a.parse::<u32>()) {
        None => 0,
        Some(Ok(id)) => id,
        Some(Err(e)) => {
            eprintln!("variant id must be a number: {}", e);
            std::process::exit(2);
        }
    };
    let settings_path = args.next().map(std::path::PathBuf::from);

    if let Err(e) = run_headless(variant, settings_path.as_deref()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run_headless(
    variant: u32,
    settings_path: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    use marble_roll::consts::SIM_DT;
    use marble_roll::engine::Engine;
    use marble_roll::{BallCatalog, Direction, GameSettings, HeadlessEngine, InputEvent, SessionController};

    let settings = GameSettings::load_from(settings_path)?;
    let mut engine = HeadlessEngine::new();
    let mut session = SessionController::new(BallCatalog::standard(), settings);

    session.select(variant)?;
    session.start_session(&mut engine)?;

    let marble = session
        .play_field()
        .map(|f| f.marble)
        .ok_or("session has no marble")?;

    // Walk toward the red box at (2, 0.5, 2)
    let script = [Direction::Up, Direction::Right].repeat(10);
    let mut hits = 0;
    for (i, dir) in script.into_iter().enumerate() {
        session.on_input(&mut engine, InputEvent::new(dir, i as f64 * SIM_DT as f64 * 1000.0))?;
        hits += session.tick(&mut engine, SIM_DT)?;
    }

    println!(
        "ball {:?}: marble at {:?} after {} steps, {} obstacle hit(s)",
        session.selected_variant().map(|v| v.name.as_str()),
        engine.position(marble)?,
        engine.steps(),
        hits
    );
    Ok(())
}
