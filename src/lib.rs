//! Fruit Merge - a falling-fruit merge game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, merges, combo, overflow)
//! - `game`: Session lifecycle and fixed-step frame driver
//! - `feedback`: Audio/haptic cues derived from simulation events
//! - `platform`: Browser bindings and clock access
//! - `stats`: Lifetime statistics persisted between runs
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod feedback;
pub mod game;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use error::{Error, Result};
pub use game::{Game, SessionPhase};
pub use settings::{QualityPreset, Settings};
pub use stats::Stats;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Longest frame delta fed into the accumulator (avoids catch-up bursts)
    pub const MAX_FRAME_DT: f32 = 0.033;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default viewport (9:16 portrait)
    pub const DEFAULT_WORLD_WIDTH: f32 = 720.0;
    pub const DEFAULT_WORLD_HEIGHT: f32 = 1280.0;

    /// Wall distance from each side of the viewport
    pub const WALL_INSET: f32 = 40.0;
    /// Floor distance from the bottom of the viewport
    pub const GROUND_INSET: f32 = 40.0;
    /// Height of the safety line (screen space, y grows down)
    pub const SAFETY_LINE_Y: f32 = 130.0;

    /// Fixed margin applied to pointer targets (not radius-aware)
    pub const POINTER_CLAMP_MARGIN: f32 = 20.0;
    /// Keyboard nudge distance per key press
    pub const KEYBOARD_NUDGE: f32 = 16.0;

    /// Held fruit hangs this far below its own radius
    pub const HELD_Y_OFFSET: f32 = 14.0;
    /// Idle bob amplitude of the held fruit
    pub const HELD_BOB_AMPLITUDE: f32 = 2.0;
    /// Idle bob angular rate (radians per second, one radian per 180 ms)
    pub const HELD_BOB_RATE: f32 = 1000.0 / 180.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
