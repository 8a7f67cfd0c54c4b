//! Crate error type
//!
//! The simulation itself has no recoverable failures. Everything here is a
//! rejected precondition (bad timestep, bad geometry, bad tuning) or an
//! outer-surface failure while loading/saving persisted data.

use thiserror::Error;

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Fixed timestep was zero, negative, or not finite
    #[error("fixed timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),

    /// Wall/floor/safety-line layout violates its ordering invariants
    #[error("invalid world geometry: {reason}")]
    InvalidGeometry { reason: &'static str },

    /// Tier table is too short or not strictly increasing
    #[error("invalid tier table: {reason}")]
    InvalidTierTable { reason: String },

    /// A tuning constant is outside its usable range
    #[error("tuning value `{name}` out of range: {value}")]
    InvalidTuning { name: &'static str, value: f32 },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
