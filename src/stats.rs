//! Lifetime statistics
//!
//! Updated once per finished run. Persisted to LocalStorage on the web and
//! to a JSON file by the native binary.

use serde::{Deserialize, Serialize};

use crate::sim::GameOverReport;

/// Aggregated results across all runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub best_score: u64,
    pub best_tier: usize,
    pub best_tier_name: String,
    pub best_combo: u32,
    pub total_games: u32,
    pub total_score: u64,
    /// Whole seconds of play across all runs
    pub time_played_secs: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            best_score: 0,
            best_tier: 0,
            best_tier_name: "-".to_string(),
            best_combo: 1,
            total_games: 0,
            total_score: 0,
            time_played_secs: 0,
        }
    }
}

impl Stats {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fruit_merge_stats_v1";

    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a score beats every previous run
    pub fn is_new_best(&self, score: u64) -> bool {
        score > self.best_score
    }

    /// Fold a finished run into the totals
    pub fn record_game(&mut self, report: &GameOverReport) {
        self.total_games += 1;
        self.total_score += report.score;
        self.time_played_secs += report.duration_secs.max(0.0).floor() as u64;
        if report.score > self.best_score {
            self.best_score = report.score;
        }
        if report.best_tier > self.best_tier {
            self.best_tier = report.best_tier;
            self.best_tier_name = report.best_tier_name.clone();
        }
        if report.best_combo > self.best_combo {
            self.best_combo = report.best_combo;
        }
        log::info!(
            "Recorded game {} (score {}, best {})",
            self.total_games,
            report.score,
            self.best_score
        );
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary::from(self)
    }

    /// Mean score per run, rounded
    pub fn average_score(&self) -> u64 {
        if self.total_games == 0 {
            return 0;
        }
        (self.total_score as f64 / self.total_games as f64).round() as u64
    }

    /// Load stats from a JSON file; a missing file means fresh stats
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write stats to a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Stats saved to {}", path.display());
        Ok(())
    }

    /// Load stats from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<Stats>(&json) {
                    Ok(stats) => {
                        log::info!("Loaded stats ({} games)", stats.total_games);
                        return stats;
                    }
                    Err(e) => log::warn!("Discarding unreadable stats: {}", e),
                }
            }
        }

        log::info!("No stats found, starting fresh");
        Self::new()
    }

    /// Save stats to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Stats saved ({} games)", self.total_games);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // Native callers persist through save_to
    }
}

/// What the stats screen shows, with derived values filled in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub best_score: u64,
    pub best_tier: usize,
    pub best_tier_name: String,
    pub best_combo: u32,
    pub total_games: u32,
    pub total_score: u64,
    pub average_score: u64,
    pub time_played_secs: u64,
    /// `time_played_secs` as shown to the player, e.g. "2m 05s"
    pub time_played: String,
}

impl From<&Stats> for StatsSummary {
    fn from(stats: &Stats) -> Self {
        Self {
            best_score: stats.best_score,
            best_tier: stats.best_tier,
            best_tier_name: stats.best_tier_name.clone(),
            best_combo: stats.best_combo,
            total_games: stats.total_games,
            total_score: stats.total_score,
            average_score: stats.average_score(),
            time_played_secs: stats.time_played_secs,
            time_played: format_duration(stats.time_played_secs),
        }
    }
}

/// Format a play-time total for the stats screen
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(score: u64, best_tier: usize, best_combo: u32, secs: f32) -> GameOverReport {
        GameOverReport {
            score,
            best_tier,
            best_tier_name: format!("tier{best_tier}"),
            best_combo,
            duration_secs: secs,
        }
    }

    #[test]
    fn test_fresh_stats() {
        let stats = Stats::new();
        assert_eq!(stats.best_combo, 1);
        assert_eq!(stats.average_score(), 0);
        assert!(stats.is_new_best(1));
        assert!(!stats.is_new_best(0));
    }

    #[test]
    fn test_record_keeps_bests() {
        let mut stats = Stats::new();
        stats.record_game(&report(100, 4, 3, 61.9));
        stats.record_game(&report(50, 6, 2, 30.2));

        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.total_score, 150);
        assert_eq!(stats.best_score, 100);
        assert_eq!(stats.best_tier, 6);
        assert_eq!(stats.best_tier_name, "tier6");
        assert_eq!(stats.best_combo, 3);
        assert_eq!(stats.time_played_secs, 91);
        assert_eq!(stats.average_score(), 75);
    }

    #[test]
    fn test_negative_duration_ignored() {
        let mut stats = Stats::new();
        stats.record_game(&report(10, 0, 1, -5.0));
        assert_eq!(stats.time_played_secs, 0);
    }

    #[test]
    fn test_file_roundtrip() {
        let file = format!("fruit_merge_stats_{}.json", std::process::id());
        let path = std::env::temp_dir().join(file);
        let _ = std::fs::remove_file(&path);
        assert_eq!(Stats::load_from(&path).unwrap(), Stats::new());

        let mut stats = Stats::new();
        stats.record_game(&report(320, 5, 4, 120.0));
        stats.save_to(&path).unwrap();
        assert_eq!(Stats::load_from(&path).unwrap(), stats);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_summary_carries_derived_values() {
        let mut stats = Stats::new();
        stats.record_game(&report(100, 4, 3, 60.0));
        stats.record_game(&report(51, 2, 2, 65.5));

        let summary = stats.summary();
        assert_eq!(summary.average_score, 76);
        assert_eq!(summary.time_played, "2m 05s");

        let json: serde_json::Value = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["average_score"], 76);
        assert_eq!(json["time_played"], "2m 05s");
        assert_eq!(json["best_tier_name"], "tier4");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 05s");
        assert_eq!(format_duration(3720), "1h 02m");
    }
}
