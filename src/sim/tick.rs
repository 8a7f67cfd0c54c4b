//! Fixed timestep simulation tick
//!
//! Core game loop that advances the world deterministically.

use super::collision::{resolve_bodies, resolve_floor, resolve_walls};
use super::combo;
use super::overflow;
use super::particles;
use super::rng::Random;
use super::state::{GameEvent, MergeEvent, World};
use super::tiers::TierTable;
use crate::tuning::Tuning;

/// Screen shake added per merge
const MERGE_SHAKE: f32 = 0.25;
/// Screen shake decay per second
const SHAKE_DECAY: f32 = 3.6;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal target for the held fruit (world units, pre-clamp)
    pub target_x: Option<f32>,
    /// Release the held fruit
    pub drop: bool,
    /// Play time from an external clock; the world's own clock is used if absent
    pub play_time: Option<f32>,
}

/// Choose the tier of the next spawned fruit
///
/// The spawn ceiling grows from `spawn_base_max_tier` by up to
/// `spawn_tier_growth` as difficulty ramps, never reaches the reserved top
/// tiers, and never drops below `spawn_min_max_tier`.
pub fn pick_next_tier(tiers: &TierTable, tuning: &Tuning, rng: &mut Random, elapsed: f32) -> usize {
    let difficulty = tuning.difficulty_at(elapsed);
    let grown = tuning.spawn_base_max_tier
        + (difficulty * tuning.spawn_tier_growth as f32).floor() as usize;
    let max_tier = grown.min(tiers.len().saturating_sub(tuning.spawn_reserved_top_tiers));
    let ceiling = max_tier.max(tuning.spawn_min_max_tier).min(tiers.top());
    rng.int(0, ceiling)
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    debug_assert!(dt > 0.0 && dt.is_finite(), "fixed timestep must be positive, got {dt}");
    if !(dt > 0.0 && dt.is_finite()) {
        log::warn!("Skipping tick with invalid timestep {}", dt);
        return;
    }

    // Over is terminal
    if world.is_over() {
        return;
    }

    world.sim.elapsed = match input.play_time {
        Some(t) if t.is_finite() => t.max(0.0),
        _ => world.sim.elapsed + dt,
    };
    let elapsed = world.sim.elapsed;

    // Held fruit follows the input target
    if let Some(x) = input.target_x {
        world.set_target_x(x);
    }
    world.update_held();
    if input.drop {
        world.drop_held();
    }
    world.tick_respawn(dt);

    // Merge locks expire here, never in the render pass
    for body in &mut world.bodies {
        body.merge_lock = body.merge_lock.saturating_sub(1);
    }

    // Integrate and resolve bounds
    let gravity = world.tuning.gravity_at(elapsed);
    let geometry = world.geometry;
    for body in &mut world.bodies {
        body.vel.y += gravity * dt;
        body.pos += body.vel * dt;
        resolve_walls(body, &geometry, world.tuning.wall_restitution);
        resolve_floor(
            body,
            &geometry,
            world.tuning.floor_restitution,
            world.tuning.floor_friction,
        );
    }

    // Pairwise contacts and merges
    let merges = resolve_bodies(&mut world.bodies, &world.tiers, &world.tuning, &mut world.ids);
    for merge in merges {
        let tier = world.tiers.get(merge.tier);
        let (tier_score, tier_count) = (tier.score, world.tiers.len());
        let points = combo::register_merge(&mut world.sim, tier_score, world.tuning.combo_max);
        world.sim.best_tier = world.sim.best_tier.max(merge.tier);

        log::debug!(
            "Merged tier {} -> {} (+{} x{})",
            merge.source_tier,
            merge.tier,
            points,
            world.sim.combo.multiplier
        );

        particles::spawn_burst(
            &mut world.particles,
            &mut world.cosmetic_rng,
            merge.pos,
            merge.tier,
            world.max_particles,
        );
        world.screen_shake = (world.screen_shake + MERGE_SHAKE).min(1.0);

        world.push_event(GameEvent::Merged(MergeEvent {
            id: merge.id,
            tier: merge.tier,
            pos: merge.pos,
            intensity: (merge.tier + 1) as f32 / tier_count as f32,
            points,
            multiplier: world.sim.combo.multiplier,
        }));
    }

    combo::decay(&mut world.sim.combo, dt, world.tuning.combo_window);

    // Overflow
    let above = overflow::any_above_line(&world.bodies, world.geometry.safety_line_y);
    if overflow::observe(&mut world.sim.overflow, above, dt, &world.tuning) {
        let report = world.game_over_report();
        log::info!(
            "Game over: score {}, best tier {}, best combo x{}, {:.1}s",
            report.score,
            report.best_tier_name,
            report.best_combo,
            report.duration_secs
        );
        world.report = Some(report.clone());
        world.push_event(GameEvent::GameOver(report));
    }

    // Cosmetics
    for body in &mut world.bodies {
        body.settle_visual(dt);
    }
    particles::update(&mut world.particles, dt);
    world.screen_shake = (world.screen_shake - SHAKE_DECAY * dt).max(0.0);
}
