//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Index-stable pair iteration (removals are compacted after the pass)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod combo;
pub mod overflow;
pub mod particles;
pub mod rng;
pub mod state;
pub mod tick;
pub mod tiers;

pub use clock::{FixedTimestep, FrameAccumulator};
pub use collision::{Contact, Merge, circle_contact, resolve_bodies};
pub use particles::Particle;
pub use rng::Random;
pub use state::{
    Body, BodyId, BodyView, ComboState, GameEvent, GameOverReport, MergeEvent, OverflowState,
    OverflowStatus, SimulationState, Snapshot, World, WorldGeometry,
};
pub use tick::{TickInput, pick_next_tier, tick};
pub use tiers::{Tier, TierTable};
