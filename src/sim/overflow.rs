//! Overflow detector
//!
//! Safe -> InDanger while any fruit pokes above the safety line; the danger
//! timer accumulates at 1x and drains at `danger_decay`x once clear. Reaching
//! `danger_threshold` moves to Over, which is terminal.

use super::state::{Body, OverflowState, OverflowStatus};
use crate::tuning::Tuning;

/// Whether any landed fruit's top edge is above the line
///
/// Fruit still falling in from the drop height are not counted until they
/// first touch the floor or another fruit.
pub fn any_above_line(bodies: &[Body], safety_line_y: f32) -> bool {
    bodies.iter().any(|b| b.landed && b.top() < safety_line_y)
}

/// Feed one step of observation; returns true on the transition into Over
pub fn observe(state: &mut OverflowState, any_above: bool, dt: f32, tuning: &Tuning) -> bool {
    if state.status == OverflowStatus::Over {
        return false;
    }

    if any_above {
        state.danger_timer += dt;
        state.status = OverflowStatus::InDanger;
        if state.danger_timer >= tuning.danger_threshold {
            state.status = OverflowStatus::Over;
            return true;
        }
    } else {
        state.danger_timer = (state.danger_timer - dt * tuning.danger_decay).max(0.0);
        if state.danger_timer == 0.0 {
            state.status = OverflowStatus::Safe;
        }
    }
    false
}
