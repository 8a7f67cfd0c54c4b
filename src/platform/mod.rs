//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - JS bindings for the browser host (`web`)

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed derived from the wall clock, for runs that need not be reproducible
pub fn clock_seed() -> u64 {
    now_ms() as u64
}

/// Seconds between two `now_ms`/animation-frame timestamps, never negative
pub fn frame_delta_secs(last_ms: f64, now_ms: f64) -> f32 {
    if last_ms <= 0.0 || !now_ms.is_finite() {
        return 0.0;
    }
    ((now_ms - last_ms) / 1000.0).max(0.0) as f32
}
