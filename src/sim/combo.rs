//! Combo and score ledger
//!
//! Mutated only by merge events, plus a per-step decay of the combo window.

use super::state::{ComboState, SimulationState};

/// Record a merge: grow the multiplier, restart the window, award points
///
/// `tier_score` is the score value of the tier the merge produced. Returns
/// the points awarded.
pub fn register_merge(state: &mut SimulationState, tier_score: u32, max_multiplier: u32) -> u64 {
    let combo = &mut state.combo;
    combo.multiplier = (combo.multiplier + 1).min(max_multiplier);
    combo.best_multiplier = combo.best_multiplier.max(combo.multiplier);
    combo.decay_timer = 0.0;

    let points = (tier_score as f32 * combo.multiplier as f32).round() as u64;
    state.score += points;
    state.merges += 1;
    points
}

/// Advance the combo window; resets the multiplier once it runs out
pub fn decay(combo: &mut ComboState, dt: f32, window: f32) {
    if combo.multiplier > 1 {
        combo.decay_timer += dt;
        if combo.decay_timer > window {
            combo.multiplier = 1;
            combo.decay_timer = 0.0;
        }
    }
}

/// Restart the window without touching the multiplier (used on drop)
pub fn refresh_window(combo: &mut ComboState) {
    combo.decay_timer = 0.0;
}
