//! Audio and haptic cues
//!
//! The simulation only emits events; this module maps them to cues the host
//! plays. Cues are gated by the player's settings.

use serde::Serialize;

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Vibration length for a merge
pub const MERGE_VIBRATION_MS: u32 = 35;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// Fruit released
    Drop,
    /// Two fruit merged
    Merge,
    /// Overflow ended the run
    GameOver,
}

/// What the host should play for one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Feedback {
    pub sound: Option<SoundCue>,
    pub vibrate_ms: Option<u32>,
}

impl Feedback {
    /// Map a simulation event to its cues under the given settings
    pub fn for_event(event: &GameEvent, settings: &Settings) -> Self {
        let (sound, vibrate_ms) = match event {
            GameEvent::Dropped { .. } => (Some(SoundCue::Drop), None),
            GameEvent::Merged(_) => (Some(SoundCue::Merge), Some(MERGE_VIBRATION_MS)),
            GameEvent::GameOver(_) => (Some(SoundCue::GameOver), None),
            GameEvent::HeldSpawned { .. } => (None, None),
        };
        Self {
            sound: sound.filter(|_| settings.sound),
            vibrate_ms: vibrate_ms.filter(|_| settings.vibration),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sound.is_none() && self.vibrate_ms.is_none()
    }
}

/// Cues for a batch of events, skipping events with nothing to play
pub fn cues(events: &[GameEvent], settings: &Settings) -> Vec<Feedback> {
    events
        .iter()
        .map(|e| Feedback::for_event(e, settings))
        .filter(|f| !f.is_empty())
        .collect()
}
