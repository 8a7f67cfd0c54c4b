//! Browser bindings
//!
//! The page owns the canvas, audio and DOM; it forwards input and
//! animation-frame timestamps here and reads back JSON snapshots.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::feedback::SoundCue;
use crate::game::Game;
use crate::settings::Settings;
use crate::sim::GameEvent;
use crate::stats::Stats;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Fruit Merge starting...");
}

/// Events and sounds produced since the last call to `take_output`
#[derive(Debug, Default, Serialize)]
struct FrameOutput {
    events: Vec<GameEvent>,
    sounds: Vec<SoundCue>,
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    last_time: f64,
    output: FrameOutput,
}

#[wasm_bindgen]
impl WebGame {
    /// Build a session for a canvas of the given CSS size; seed 0 uses the clock
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, seed: f64) -> Result<WebGame, JsValue> {
        let seed = if seed > 0.0 {
            seed as u64
        } else {
            super::clock_seed()
        };
        let game = Game::new(
            seed,
            width,
            height,
            Tuning::default(),
            Settings::load(),
            Stats::load(),
        )
        .map_err(to_js)?;
        Ok(Self {
            game,
            last_time: 0.0,
            output: FrameOutput::default(),
        })
    }

    pub fn start(&mut self) {
        self.last_time = 0.0;
        self.game.start();
    }

    pub fn pause(&mut self) -> bool {
        self.game.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.last_time = 0.0;
        self.game.resume()
    }

    pub fn restart(&mut self) {
        self.last_time = 0.0;
        self.output = FrameOutput::default();
        self.game.restart(super::clock_seed());
    }

    pub fn back_to_menu(&mut self) {
        self.output = FrameOutput::default();
        self.game.back_to_menu();
    }

    /// Page hidden or window blurred
    pub fn visibility_changed(&mut self, hidden: bool) {
        if hidden && self.game.pause() {
            log::info!("Auto-paused (page hidden)");
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), JsValue> {
        self.game.resize(width, height).map_err(to_js)
    }

    /// Pointer/touch x in canvas CSS pixels
    pub fn pointer_move(&mut self, x: f32) {
        self.game.set_target_x(x);
    }

    pub fn nudge(&mut self, direction: f32) {
        self.game.nudge(direction);
    }

    pub fn drop_held(&mut self) {
        self.game.request_drop();
    }

    /// Animation-frame callback; returns the number of fixed steps run
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let dt = super::frame_delta_secs(self.last_time, time_ms);
        self.last_time = time_ms;

        let steps = self.game.advance(dt);
        let events = self.game.drain_events();
        for cue in self.game.feedback(&events) {
            if let Some(ms) = cue.vibrate_ms {
                vibrate(ms);
            }
            if let Some(sound) = cue.sound {
                self.output.sounds.push(sound);
            }
        }
        self.output.events.extend(events);
        steps
    }

    pub fn phase(&self) -> String {
        format!("{:?}", self.game.phase())
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.snapshot()).map_err(to_js)
    }

    /// Events and sound cues since the last call
    pub fn take_output_json(&mut self) -> Result<String, JsValue> {
        let output = std::mem::take(&mut self.output);
        serde_json::to_string(&output).map_err(to_js)
    }

    /// Lifetime stats plus average score and formatted play time
    pub fn stats_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.game.stats().summary()).map_err(to_js)
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.game.settings()).map_err(to_js)
    }

    /// Replace settings from the options screen and persist them
    pub fn set_settings_json(&mut self, json: &str) -> Result<(), JsValue> {
        let settings: Settings = serde_json::from_str(json).map_err(to_js)?;
        self.game.set_settings(settings);
        Ok(())
    }
}

fn vibrate(ms: u32) {
    if let Some(window) = web_sys::window() {
        let _ = window.navigator().vibrate_with_duration(ms);
    }
}
