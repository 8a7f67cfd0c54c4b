//! Simulation state and core types
//!
//! The [`World`] owns every piece of mutable simulation state. Outside the
//! step function it is only read through [`Snapshot`] copies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::particles::Particle;
use super::rng::{COSMETIC_STREAM, Random};
use super::tick::pick_next_tier;
use super::tiers::TierTable;
use crate::consts::*;
use crate::error::{Error, Result};
use crate::lerp;
use crate::tuning::Tuning;

/// Unique id of a fruit within one run
pub type BodyId = u32;

/// Rate at which the pop-in scale settles back to 1 (per second)
const VISUAL_SETTLE_RATE: f32 = 7.2;

/// A simulated fruit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub tier: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Steps left before this fruit may merge again (0 = unlocked)
    pub merge_lock: u32,
    /// Cosmetic pop-in scale, settles toward 1.0
    pub visual_scale: f32,
    /// Has touched the floor or another fruit since it was dropped
    #[serde(default)]
    pub landed: bool,
}

impl Body {
    pub fn new(id: BodyId, tier: usize, radius: f32, pos: Vec2) -> Self {
        Self {
            id,
            tier,
            pos,
            vel: Vec2::ZERO,
            radius,
            merge_lock: 0,
            visual_scale: 1.0,
            landed: false,
        }
    }

    pub fn is_merge_locked(&self) -> bool {
        self.merge_lock > 0
    }

    /// Y of the top edge (screen space, y grows down)
    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    /// Ease the pop-in scale back toward 1
    pub fn settle_visual(&mut self, dt: f32) {
        if self.visual_scale > 1.0 {
            self.visual_scale = lerp(self.visual_scale, 1.0, (VISUAL_SETTLE_RATE * dt).min(1.0));
            if self.visual_scale < 1.001 {
                self.visual_scale = 1.0;
            }
        }
    }
}

/// Monotonic fruit id source
#[derive(Debug, Clone, Default)]
pub struct IdCounter {
    last: BodyId,
}

impl IdCounter {
    /// Counter whose first id is `last + 1`
    pub fn starting_after(last: BodyId) -> Self {
        Self { last }
    }

    pub fn next_id(&mut self) -> BodyId {
        self.last += 1;
        self.last
    }
}

/// Walls, floor and safety line of the well
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldGeometry {
    pub width: f32,
    pub height: f32,
    pub left_wall_x: f32,
    pub right_wall_x: f32,
    pub ground_y: f32,
    pub safety_line_y: f32,
}

impl Default for WorldGeometry {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
            left_wall_x: WALL_INSET,
            right_wall_x: DEFAULT_WORLD_WIDTH - WALL_INSET,
            ground_y: DEFAULT_WORLD_HEIGHT - GROUND_INSET,
            safety_line_y: SAFETY_LINE_Y,
        }
    }
}

impl WorldGeometry {
    pub fn new(
        width: f32,
        height: f32,
        left_wall_x: f32,
        right_wall_x: f32,
        ground_y: f32,
        safety_line_y: f32,
    ) -> Result<Self> {
        let values = [width, height, left_wall_x, right_wall_x, ground_y, safety_line_y];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidGeometry {
                reason: "geometry values must be finite",
            });
        }
        if left_wall_x >= right_wall_x {
            return Err(Error::InvalidGeometry {
                reason: "left wall must be left of right wall",
            });
        }
        if ground_y <= safety_line_y {
            return Err(Error::InvalidGeometry {
                reason: "ground must be below the safety line",
            });
        }
        if right_wall_x - left_wall_x <= 2.0 * POINTER_CLAMP_MARGIN {
            return Err(Error::InvalidGeometry {
                reason: "well is narrower than the pointer clamp margin",
            });
        }
        Ok(Self {
            width,
            height,
            left_wall_x,
            right_wall_x,
            ground_y,
            safety_line_y,
        })
    }

    /// Standard layout for a viewport of the given size
    pub fn from_viewport(width: f32, height: f32) -> Result<Self> {
        Self::new(
            width,
            height,
            WALL_INSET,
            width - WALL_INSET,
            height - GROUND_INSET,
            SAFETY_LINE_Y,
        )
    }

    /// Clamp a pointer target by the fixed margin (not the fruit's radius)
    pub fn clamp_target_x(&self, x: f32) -> f32 {
        x.clamp(
            self.left_wall_x + POINTER_CLAMP_MARGIN,
            self.right_wall_x - POINTER_CLAMP_MARGIN,
        )
    }

    pub fn center_x(&self) -> f32 {
        (self.left_wall_x + self.right_wall_x) * 0.5
    }
}

/// Combo multiplier bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub multiplier: u32,
    /// Seconds since the last merge (or drop) while a combo is live
    pub decay_timer: f32,
    pub best_multiplier: u32,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            multiplier: 1,
            decay_timer: 0.0,
            best_multiplier: 1,
        }
    }
}

/// Overflow detector status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowStatus {
    #[default]
    Safe,
    InDanger,
    /// Terminal
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverflowState {
    pub status: OverflowStatus,
    pub danger_timer: f32,
}

/// Score, combo and overflow state for one run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationState {
    pub score: u64,
    pub combo: ComboState,
    pub overflow: OverflowState,
    /// Simulated play time in seconds
    pub elapsed: f32,
    /// Highest tier that has existed in the well this run
    pub best_tier: usize,
    pub merges: u32,
    pub drops: u32,
}

/// Payload reported once when the run ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverReport {
    pub score: u64,
    pub best_tier: usize,
    pub best_tier_name: String,
    pub best_combo: u32,
    pub duration_secs: f32,
}

/// A merge, as seen by score/audio/particle collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeEvent {
    pub id: BodyId,
    pub tier: usize,
    pub pos: Vec2,
    /// 0..=1 hint for effect strength, grows with tier
    pub intensity: f32,
    pub points: u64,
    pub multiplier: u32,
}

/// Discrete events emitted by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    HeldSpawned { tier: usize },
    Dropped { id: BodyId, tier: usize, x: f32 },
    Merged(MergeEvent),
    GameOver(GameOverReport),
}

/// Read-only view of a fruit for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyView {
    pub id: BodyId,
    pub tier: usize,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub scale: f32,
}

impl From<&Body> for BodyView {
    fn from(body: &Body) -> Self {
        Self {
            id: body.id,
            tier: body.tier,
            x: body.pos.x,
            y: body.pos.y,
            radius: body.radius,
            scale: body.visual_scale,
        }
    }
}

/// Per-frame copy of everything a renderer or HUD needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub geometry: WorldGeometry,
    pub bodies: Vec<BodyView>,
    pub held: Option<BodyView>,
    pub next_tier: usize,
    pub score: u64,
    pub multiplier: u32,
    pub best_multiplier: u32,
    pub danger_ratio: f32,
    pub status: OverflowStatus,
    pub elapsed: f32,
    pub screen_shake: f32,
    pub particles: Vec<Particle>,
    pub game_over: Option<GameOverReport>,
}

/// The simulation world: fruit, geometry, and per-run state
#[derive(Debug, Clone)]
pub struct World {
    pub geometry: WorldGeometry,
    pub tiers: TierTable,
    pub tuning: Tuning,
    /// Active fruit (subject to gravity and collisions)
    pub bodies: Vec<Body>,
    /// Fruit under player control, not yet simulated
    pub held: Option<Body>,
    /// Tier of the fruit that will be held next
    pub next_tier: usize,
    /// Clamped horizontal input target
    pub target_x: f32,
    pub sim: SimulationState,
    /// Seconds until the next held fruit appears (only while none is held)
    pub respawn_timer: f32,
    pub rng: Random,
    pub cosmetic_rng: Random,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub max_particles: usize,
    pub screen_shake: f32,
    pub report: Option<GameOverReport>,
    pub(crate) ids: IdCounter,
    events: Vec<GameEvent>,
}

impl World {
    /// Start a run: pick the first tier and hand the player a fruit
    pub fn new(seed: u64, geometry: WorldGeometry, tiers: TierTable, tuning: Tuning) -> Self {
        let mut world = Self {
            geometry,
            tiers,
            tuning,
            bodies: Vec::new(),
            held: None,
            next_tier: 0,
            target_x: geometry.center_x(),
            sim: SimulationState::default(),
            respawn_timer: 0.0,
            rng: Random::new(seed),
            cosmetic_rng: Random::with_stream(seed, COSMETIC_STREAM),
            particles: Vec::new(),
            max_particles: super::particles::MAX_PARTICLES,
            screen_shake: 0.0,
            report: None,
            ids: IdCounter::default(),
            events: Vec::new(),
        };
        world.next_tier = world.pick_tier();
        world.spawn_held();
        world
    }

    /// Default geometry, tiers and tuning
    pub fn with_seed(seed: u64) -> Self {
        Self::new(
            seed,
            WorldGeometry::default(),
            TierTable::classic(),
            Tuning::default(),
        )
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn next_body_id(&mut self) -> BodyId {
        self.ids.next_id()
    }

    pub fn is_over(&self) -> bool {
        self.sim.overflow.status == OverflowStatus::Over
    }

    fn pick_tier(&mut self) -> usize {
        pick_next_tier(&self.tiers, &self.tuning, &mut self.rng, self.sim.elapsed)
    }

    /// Resting height of a held fruit of `tier`, including the idle bob
    pub fn held_y(&self, tier: usize) -> f32 {
        let bob = (self.sim.elapsed * HELD_BOB_RATE).sin() * HELD_BOB_AMPLITUDE;
        self.tiers.get(tier).radius + HELD_Y_OFFSET + bob
    }

    /// Give the player the queued fruit and queue the next one
    pub fn spawn_held(&mut self) {
        let tier = self.next_tier;
        let id = self.next_body_id();
        let pos = Vec2::new(self.target_x, self.held_y(tier));
        self.held = Some(Body::new(id, tier, self.tiers.get(tier).radius, pos));
        self.sim.best_tier = self.sim.best_tier.max(tier);
        self.next_tier = self.pick_tier();
        self.events.push(GameEvent::HeldSpawned { tier });
    }

    /// Set the horizontal input target, clamped by the fixed pointer margin
    pub fn set_target_x(&mut self, x: f32) {
        if !x.is_finite() {
            log::warn!("Ignoring non-finite target x");
            return;
        }
        self.target_x = self.geometry.clamp_target_x(x);
        if let Some(held) = &mut self.held {
            held.pos.x = self.target_x;
        }
    }

    /// Move the held fruit to the target and apply its idle bob
    pub fn update_held(&mut self) {
        if let Some(tier) = self.held.as_ref().map(|h| h.tier) {
            let y = self.held_y(tier);
            if let Some(held) = &mut self.held {
                held.pos = Vec2::new(self.target_x, y);
            }
        }
    }

    /// Release the held fruit into the well
    ///
    /// Refreshes the combo window without scoring. Returns false when there
    /// is nothing to drop.
    pub fn drop_held(&mut self) -> bool {
        let Some(body) = self.held.take() else {
            return false;
        };
        log::debug!("Dropped tier {} at x={:.1}", body.tier, body.pos.x);
        self.events.push(GameEvent::Dropped {
            id: body.id,
            tier: body.tier,
            x: body.pos.x,
        });
        self.bodies.push(body);
        super::combo::refresh_window(&mut self.sim.combo);
        self.sim.drops += 1;
        self.respawn_timer = self.tuning.respawn_delay;
        true
    }

    /// Count down to the next held fruit
    pub fn tick_respawn(&mut self, dt: f32) {
        if self.held.is_some() {
            return;
        }
        self.respawn_timer -= dt;
        if self.respawn_timer <= 0.0 {
            self.respawn_timer = 0.0;
            self.spawn_held();
        }
    }

    /// Rebuild geometry for a new viewport size
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        self.geometry = WorldGeometry::from_viewport(width, height)?;
        self.target_x = self.geometry.clamp_target_x(self.target_x);
        self.update_held();
        log::info!("World resized to {}x{}", width, height);
        Ok(())
    }

    /// Warning level for the HUD, 0 (safe) to 1 (about to overflow)
    pub fn danger_ratio(&self) -> f32 {
        (self.sim.overflow.danger_timer / self.tuning.danger_threshold).min(1.0)
    }

    pub fn game_over_report(&self) -> GameOverReport {
        let best_tier = self.tiers.get(self.sim.best_tier);
        GameOverReport {
            score: self.sim.score,
            best_tier: best_tier.index,
            best_tier_name: best_tier.name.clone(),
            best_combo: self.sim.combo.best_multiplier,
            duration_secs: self.sim.elapsed,
        }
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            geometry: self.geometry,
            bodies: self.bodies.iter().map(BodyView::from).collect(),
            held: self.held.as_ref().map(BodyView::from),
            next_tier: self.next_tier,
            score: self.sim.score,
            multiplier: self.sim.combo.multiplier,
            best_multiplier: self.sim.combo.best_multiplier,
            danger_ratio: self.danger_ratio(),
            status: self.sim.overflow.status,
            elapsed: self.sim.elapsed,
            screen_shake: self.screen_shake,
            particles: self.particles.clone(),
            game_over: self.report.clone(),
        }
    }
}
