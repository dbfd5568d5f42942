//! Browser bindings
//!
//! The page owns the canvas and DOM listeners. It forwards input here, calls
//! `frame` from `requestAnimationFrame` and draws from `snapshot_json`.

use wasm_bindgen::prelude::*;

use crate::game_loop::GameLoop;
use crate::sim::Palette;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    // Fails only if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Tennis Trivia starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    game: GameLoop,
}

#[wasm_bindgen]
impl WebGame {
    /// Create a game; `tuning_json` optionally overrides the default tunables
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<WebGame, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Tuning::default(),
        };
        let seed = js_sys::Date::now() as u64;
        let game = GameLoop::new(seed, tuning).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WebGame { game })
    }

    /// Advance to the `requestAnimationFrame` timestamp
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        self.game.frame(now_ms)
    }

    /// Lateral racket position in court units
    pub fn set_player_target(&mut self, y: f32) {
        self.game.set_player_target(y);
    }

    pub fn start(&mut self) {
        self.game.press_start();
    }

    pub fn restart(&mut self) {
        self.game.restart();
    }

    pub fn handle_answer(&mut self, choice: u32) {
        self.game.answer(choice as usize);
    }

    pub fn set_idle(&mut self, idle: bool) {
        self.game.set_idle(idle);
    }

    pub fn state(&self) -> String {
        self.game.state().as_str().to_string()
    }

    /// Court and scoreboard colors as JSON
    pub fn palette_json(&self) -> String {
        match serde_json::to_string(&Palette::DEFAULT) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Palette serialization failed: {}", e);
                String::from("null")
            }
        }
    }

    /// Current render snapshot as JSON
    pub fn snapshot_json(&self) -> String {
        match serde_json::to_string(&self.game.snapshot()) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Snapshot serialization failed: {}", e);
                String::from("null")
            }
        }
    }
}
