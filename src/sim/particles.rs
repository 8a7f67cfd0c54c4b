//! Merge burst particles
//!
//! Purely cosmetic. Draws come from the cosmetic random stream so they never
//! shift the spawn sequence.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::rng::Random;

/// Maximum particles alive at once
pub const MAX_PARTICLES: usize = 256;
/// Downward pull on particles (units/s²)
pub const PARTICLE_GRAVITY: f32 = 1600.0;

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Lifetime in seconds
    pub life: f32,
    pub age: f32,
    pub size: f32,
    /// HSL hue in degrees
    pub hue: f32,
}

/// Spray particles from a merge of the given resulting tier
pub fn spawn_burst(
    particles: &mut Vec<Particle>,
    rng: &mut Random,
    pos: Vec2,
    tier: usize,
    cap: usize,
) {
    let count = 12 + (tier as f32 * 1.5) as usize;
    let power = 160.0 + tier as f32 * 10.0;
    let base_hue = 20.0 + tier as f32 * 20.0;

    for _ in 0..count {
        if particles.len() >= cap {
            break;
        }
        let angle = rng.range(0.0, TAU);
        let speed = rng.range(power * 0.3, power);
        particles.push(Particle {
            pos,
            vel: Vec2::from_angle(angle) * speed,
            life: rng.range(0.5, 0.9),
            age: 0.0,
            size: rng.range(2.0, 6.0),
            hue: base_hue + rng.range(-18.0, 18.0),
        });
    }
}

/// Age, move and cull particles
pub fn update(particles: &mut Vec<Particle>, dt: f32) {
    for p in particles.iter_mut() {
        p.age += dt;
        p.vel.y += PARTICLE_GRAVITY * dt;
        p.pos += p.vel * dt;
    }
    particles.retain(|p| p.age < p.life);
}
