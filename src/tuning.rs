//! Data-driven game balance
//!
//! Every numeric constant that shapes the physics, merge rules, combo and
//! overflow timing lives here. Defaults reproduce the shipped game; a JSON
//! document can override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Balance constants for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Gravity ===
    /// Gravity at the start of a run (units/s²)
    pub gravity_base: f32,
    /// Gravity gained per second of play
    pub gravity_ramp: f32,
    /// Maximum gravity added on top of the base
    pub gravity_ramp_cap: f32,

    // === Bounds ===
    /// Fraction of horizontal speed kept (and reversed) on wall contact
    pub wall_restitution: f32,
    /// Fraction of vertical speed kept (and reversed) on floor contact
    pub floor_restitution: f32,
    /// Horizontal damping applied on floor contact
    pub floor_friction: f32,

    // === Contacts & merges ===
    /// Restitution between two fruits
    pub contact_restitution: f32,
    /// Relative speed at or above which same-tier fruits bounce instead of merging
    pub merge_max_rel_speed: f32,
    /// Share of the summed source velocities kept by a merged fruit
    pub merge_velocity_factor: f32,
    /// Cosmetic pop-in scale of a freshly merged fruit
    pub merge_pop_scale: f32,
    /// Steps a merged fruit stays merge-locked
    pub merge_lock_steps: u32,
    /// Whether two top-tier fruits may merge (into one top-tier fruit)
    pub allow_top_tier_merge: bool,

    // === Combo ===
    /// Seconds without a merge before the multiplier resets
    pub combo_window: f32,
    /// Highest combo multiplier
    pub combo_max: u32,

    // === Overflow ===
    /// Seconds above the safety line before the game ends
    pub danger_threshold: f32,
    /// Danger timer decay rate while the well is clear
    pub danger_decay: f32,

    // === Spawning ===
    /// Seconds for difficulty to ramp from 0 to 1
    pub difficulty_ramp_secs: f32,
    /// Highest spawnable tier at difficulty 0
    pub spawn_base_max_tier: usize,
    /// Extra spawnable tiers gained at difficulty 1
    pub spawn_tier_growth: usize,
    /// Top tiers only reachable by merging
    pub spawn_reserved_top_tiers: usize,
    /// Spawn ceiling never drops below this tier
    pub spawn_min_max_tier: usize,
    /// Delay before the next held fruit appears after a drop
    pub respawn_delay: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity_base: 1500.0,
            gravity_ramp: 3.0,
            gravity_ramp_cap: 900.0,

            wall_restitution: 0.35,
            floor_restitution: 0.25,
            floor_friction: 0.98,

            contact_restitution: 0.15,
            merge_max_rel_speed: 320.0,
            merge_velocity_factor: 0.2,
            merge_pop_scale: 1.15,
            merge_lock_steps: 1,
            allow_top_tier_merge: true,

            combo_window: 1.25,
            combo_max: 9,

            danger_threshold: 1.2,
            danger_decay: 0.6,

            difficulty_ramp_secs: 180.0,
            spawn_base_max_tier: 5,
            spawn_tier_growth: 3,
            spawn_reserved_top_tiers: 3,
            spawn_min_max_tier: 2,
            respawn_delay: 0.5,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check every value is in a range the simulation can use
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("gravity_base", self.gravity_base),
            ("gravity_ramp", self.gravity_ramp),
            ("gravity_ramp_cap", self.gravity_ramp_cap),
            ("contact_restitution", self.contact_restitution),
            ("merge_max_rel_speed", self.merge_max_rel_speed),
            ("merge_velocity_factor", self.merge_velocity_factor),
            ("respawn_delay", self.respawn_delay),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidTuning { name, value });
            }
        }

        // Bounces must lose energy
        let damping = [
            ("wall_restitution", self.wall_restitution),
            ("floor_restitution", self.floor_restitution),
            ("floor_friction", self.floor_friction),
        ];
        for (name, value) in damping {
            if !(0.0..1.0).contains(&value) {
                return Err(Error::InvalidTuning { name, value });
            }
        }

        let positive = [
            ("merge_pop_scale", self.merge_pop_scale),
            ("combo_window", self.combo_window),
            ("danger_threshold", self.danger_threshold),
            ("danger_decay", self.danger_decay),
            ("difficulty_ramp_secs", self.difficulty_ramp_secs),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidTuning { name, value });
            }
        }

        let at_least_one = [
            ("combo_max", self.combo_max),
            ("merge_lock_steps", self.merge_lock_steps),
        ];
        for (name, value) in at_least_one {
            if value == 0 {
                return Err(Error::InvalidTuning { name, value: 0.0 });
            }
        }
        Ok(())
    }

    /// Gravity after `elapsed` seconds of play
    pub fn gravity_at(&self, elapsed: f32) -> f32 {
        self.gravity_base + (elapsed.max(0.0) * self.gravity_ramp).min(self.gravity_ramp_cap)
    }

    /// Spawn difficulty in [0, 1] after `elapsed` seconds of play
    pub fn difficulty_at(&self, elapsed: f32) -> f32 {
        (elapsed / self.difficulty_ramp_secs).clamp(0.0, 1.0)
    }
}
