//! Fixed-step timing
//!
//! The host feeds wall-clock frame deltas in; the accumulator hands out a
//! whole number of constant steps, so results do not depend on refresh rate.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::error::{Error, Result};

/// A validated, strictly positive simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimestep(f32);

impl Default for FixedTimestep {
    fn default() -> Self {
        Self(SIM_DT)
    }
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Result<Self> {
        if dt > 0.0 && dt.is_finite() {
            Ok(Self(dt))
        } else {
            Err(Error::InvalidTimestep(dt))
        }
    }

    pub fn secs(self) -> f32 {
        self.0
    }
}

/// Fixed-step-with-accumulator frame driver
#[derive(Debug, Clone)]
pub struct FrameAccumulator {
    step: FixedTimestep,
    accumulator: f32,
    max_frame_dt: f32,
    max_substeps: u32,
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new(FixedTimestep::default())
    }
}

impl FrameAccumulator {
    pub fn new(step: FixedTimestep) -> Self {
        Self {
            step,
            accumulator: 0.0,
            max_frame_dt: MAX_FRAME_DT,
            max_substeps: MAX_SUBSTEPS,
        }
    }

    pub fn step(&self) -> FixedTimestep {
        self.step
    }

    /// Add one frame's delta; returns how many fixed steps to run now
    ///
    /// Negative or non-finite deltas count as zero. Time beyond the substep
    /// cap is dropped rather than carried into the next frame.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, self.max_frame_dt)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let dt = self.step.secs();
        let mut steps = 0;
        while self.accumulator >= dt && steps < self.max_substeps {
            self.accumulator -= dt;
            steps += 1;
        }
        if steps == self.max_substeps && self.accumulator >= dt {
            self.accumulator = 0.0;
        }
        steps
    }

    /// Forget leftover time (on pause, restart)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
