//! Game session
//!
//! Owns a `World` and drives it from wall-clock frames: menu/pause/game-over
//! flow, the fixed-step accumulator, one-shot inputs and the stats update at
//! the end of a run.

use serde::Serialize;

use crate::consts::KEYBOARD_NUDGE;
use crate::error::Result;
use crate::feedback::{self, Feedback};
use crate::settings::Settings;
use crate::sim::{
    FrameAccumulator, GameEvent, Snapshot, TickInput, TierTable, World, WorldGeometry, tick,
};
use crate::stats::Stats;
use crate::tuning::Tuning;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Title screen; the world is built but not stepped
    #[default]
    Menu,
    Playing,
    Paused,
    /// Run ended; stats already recorded
    GameOver,
}

/// A playable session around one world at a time
#[derive(Debug, Clone)]
pub struct Game {
    world: World,
    phase: SessionPhase,
    clock: FrameAccumulator,
    /// Input applied to the next fixed step
    input: TickInput,
    settings: Settings,
    stats: Stats,
    tiers: TierTable,
    tuning: Tuning,
    seed: u64,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(
        seed: u64,
        width: f32,
        height: f32,
        tuning: Tuning,
        settings: Settings,
        stats: Stats,
    ) -> Result<Self> {
        tuning.validate()?;
        let geometry = WorldGeometry::from_viewport(width, height)?;
        Ok(Self::from_parts(seed, geometry, tuning, settings, stats))
    }

    /// Session with default tuning, settings and fresh stats
    pub fn with_seed(seed: u64) -> Self {
        Self::from_parts(
            seed,
            WorldGeometry::default(),
            Tuning::default(),
            Settings::default(),
            Stats::default(),
        )
    }

    fn from_parts(
        seed: u64,
        geometry: WorldGeometry,
        tuning: Tuning,
        settings: Settings,
        stats: Stats,
    ) -> Self {
        let tiers = TierTable::classic();
        let world = World::new(seed, geometry, tiers.clone(), tuning.clone());

        let mut game = Self {
            world,
            phase: SessionPhase::Menu,
            clock: FrameAccumulator::default(),
            input: TickInput::default(),
            settings,
            stats,
            tiers,
            tuning,
            seed,
            events: Vec::new(),
        };
        game.apply_settings();
        game.collect_events();
        game
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for scenario tests; bypasses the session rules
    #[doc(hidden)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace settings and apply them to the running world
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.apply_settings();
        self.settings.save();
    }

    fn apply_settings(&mut self) {
        self.world.max_particles = self.settings.max_particles();
        self.world.particles.truncate(self.world.max_particles);
    }

    /// Leave the menu (or a finished run) and start playing
    ///
    /// A finished run is replaced by a fresh world on the next seed.
    pub fn start(&mut self) {
        match self.phase {
            SessionPhase::Menu => {
                self.clock.reset();
                self.phase = SessionPhase::Playing;
                log::info!("Game started (seed {})", self.seed);
            }
            SessionPhase::GameOver => self.restart(self.seed.wrapping_add(1)),
            SessionPhase::Playing | SessionPhase::Paused => {}
        }
    }

    /// Throw away the current run and play a fresh one
    pub fn restart(&mut self, seed: u64) {
        self.reset_world(seed);
        self.phase = SessionPhase::Playing;
        log::info!("Game restarted (seed {})", seed);
    }

    /// Returns true if the session was playing
    pub fn pause(&mut self) -> bool {
        if self.phase != SessionPhase::Playing {
            return false;
        }
        self.phase = SessionPhase::Paused;
        self.input.drop = false;
        self.clock.reset();
        log::info!("Paused");
        true
    }

    /// Returns true if the session was paused
    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        self.phase = SessionPhase::Playing;
        self.clock.reset();
        log::info!("Resumed");
        true
    }

    /// Abandon the run and return to the title screen with a fresh world
    pub fn back_to_menu(&mut self) {
        self.reset_world(self.seed);
        self.phase = SessionPhase::Menu;
    }

    fn reset_world(&mut self, seed: u64) {
        let geometry = self.world.geometry;
        self.seed = seed;
        self.world = World::new(seed, geometry, self.tiers.clone(), self.tuning.clone());
        self.input = TickInput::default();
        self.clock.reset();
        self.events.clear();
        self.apply_settings();
        self.collect_events();
    }

    /// Pointer target; the held fruit follows immediately
    pub fn set_target_x(&mut self, x: f32) {
        if !x.is_finite() {
            return;
        }
        self.world.set_target_x(x);
        self.input.target_x = Some(self.world.target_x);
    }

    /// Keyboard step left (negative) or right (positive)
    pub fn nudge(&mut self, direction: f32) {
        if direction == 0.0 || !direction.is_finite() {
            return;
        }
        let x = self.world.target_x + direction.signum() * KEYBOARD_NUDGE;
        self.set_target_x(x);
    }

    /// Queue a drop for the next fixed step (ignored outside play)
    pub fn request_drop(&mut self) {
        if self.phase == SessionPhase::Playing {
            self.input.drop = true;
        }
    }

    /// Viewport changed
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        if let Err(e) = self.world.resize(width, height) {
            log::warn!("Ignoring resize to {}x{}: {}", width, height, e);
            return Err(e);
        }
        self.input.target_x = Some(self.world.target_x);
        Ok(())
    }

    /// Feed one display frame; returns the number of fixed steps run
    ///
    /// A queued drop is consumed by the first step only. The run ends in the
    /// step that overflows; no further steps are taken in that frame.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if self.phase != SessionPhase::Playing {
            return 0;
        }

        let steps = self.clock.advance(frame_dt);
        let dt = self.clock.step().secs();
        for step in 0..steps {
            tick(&mut self.world, &self.input, dt);
            self.input.drop = false;
            self.collect_events();

            if self.world.is_over() {
                self.finish_run();
                return step + 1;
            }
        }
        steps
    }

    fn finish_run(&mut self) {
        self.phase = SessionPhase::GameOver;
        self.input = TickInput::default();
        self.clock.reset();
        if let Some(report) = self.world.report.clone() {
            if self.stats.is_new_best(report.score) {
                log::info!("New best score: {}", report.score);
            }
            self.stats.record_game(&report);
            self.stats.save();
        }
    }

    fn collect_events(&mut self) {
        self.events.extend(self.world.drain_events());
    }

    /// Take all events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Sound/vibration cues for a batch of drained events
    pub fn feedback(&self, events: &[GameEvent]) -> Vec<Feedback> {
        feedback::cues(events, &self.settings)
    }

    /// Render view of the world, with shake removed when it is turned off
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = self.world.snapshot();
        if !self.settings.effective_screen_shake() {
            snapshot.screen_shake = 0.0;
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::{Body, OverflowStatus};
    use glam::Vec2;

    const FRAME: f32 = 1.0 / 60.0;

    fn still_game(seed: u64) -> Game {
        let tuning = Tuning {
            gravity_base: 0.0,
            gravity_ramp: 0.0,
            ..Default::default()
        };
        Game::new(
            seed,
            DEFAULT_WORLD_WIDTH,
            DEFAULT_WORLD_HEIGHT,
            tuning,
            Settings::default(),
            Stats::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_menu_does_not_step() {
        let mut game = Game::with_seed(1);
        assert_eq!(game.phase(), SessionPhase::Menu);
        assert_eq!(game.advance(FRAME), 0);
        assert_eq!(game.world().sim.elapsed, 0.0);

        game.start();
        assert_eq!(game.phase(), SessionPhase::Playing);
        let steps: u32 = (0..10).map(|_| game.advance(FRAME)).sum();
        assert!(steps >= 19);
        assert!(game.world().sim.elapsed > 0.0);
    }

    #[test]
    fn test_with_seed_matches_default_session() {
        let quick = Game::with_seed(9);
        let full = Game::new(
            9,
            DEFAULT_WORLD_WIDTH,
            DEFAULT_WORLD_HEIGHT,
            Tuning::default(),
            Settings::default(),
            Stats::default(),
        )
        .unwrap();

        assert_eq!(quick.world().geometry, full.world().geometry);
        assert_eq!(quick.world().next_tier, full.world().next_tier);
        assert_eq!(
            quick.world().held.as_ref().map(|b| b.tier),
            full.world().held.as_ref().map(|b| b.tier)
        );
        assert_eq!(quick.world().max_particles, full.world().max_particles);
    }

    #[test]
    fn test_rejects_bad_viewport() {
        let result = Game::new(
            1,
            30.0,
            DEFAULT_WORLD_HEIGHT,
            Tuning::default(),
            Settings::default(),
            Stats::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_drop_is_one_shot() {
        let mut game = Game::with_seed(2);
        game.request_drop();
        // Not playing yet
        game.start();
        game.advance(FRAME);
        assert!(game.world().bodies.is_empty());

        game.request_drop();
        // No step ran, so the drop stays queued
        assert_eq!(game.advance(0.0), 0);
        assert!(game.world().bodies.is_empty());

        assert!(game.advance(FRAME) >= 1);
        assert_eq!(game.world().bodies.len(), 1);
        let drops = game
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Dropped { .. }))
            .count();
        assert_eq!(drops, 1);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut game = Game::with_seed(3);
        assert!(!game.pause());
        game.start();
        game.advance(FRAME);
        assert!(game.pause());
        let elapsed = game.world().sim.elapsed;
        assert_eq!(game.advance(FRAME), 0);
        assert_eq!(game.world().sim.elapsed, elapsed);
        game.request_drop();
        assert!(game.resume());
        game.advance(FRAME);
        assert!(game.world().sim.elapsed > elapsed);
        assert!(game.world().bodies.is_empty());
    }

    #[test]
    fn test_nudge_clamps_to_margin() {
        let mut game = Game::with_seed(4);
        let start = game.world().target_x;
        game.nudge(1.0);
        assert_eq!(game.world().target_x, start + KEYBOARD_NUDGE);
        for _ in 0..100 {
            game.nudge(-1.0);
        }
        let min_x = game.world().geometry.left_wall_x + POINTER_CLAMP_MARGIN;
        assert_eq!(game.world().target_x, min_x);
        assert_eq!(game.world().held.as_ref().unwrap().pos.x, min_x);
    }

    #[test]
    fn test_game_over_records_stats() {
        let mut game = still_game(5);
        game.start();
        let world = game.world_mut();
        let id = world.next_body_id();
        let radius = world.tiers.get(0).radius;
        let mut stuck = Body::new(id, 0, radius, Vec2::new(300.0, 100.0));
        stuck.landed = true;
        world.bodies.push(stuck);

        for _ in 0..120 {
            game.advance(FRAME);
        }
        assert_eq!(game.phase(), SessionPhase::GameOver);
        assert_eq!(game.world().sim.overflow.status, OverflowStatus::Over);
        assert_eq!(game.stats().total_games, 1);
        assert_eq!(game.advance(FRAME), 0);

        let events = game.drain_events();
        let cues = game.feedback(&events);
        assert!(cues.iter().any(|c| c.sound == Some(crate::feedback::SoundCue::GameOver)));

        // Next start is a fresh run on the next seed
        game.start();
        assert_eq!(game.phase(), SessionPhase::Playing);
        assert_eq!(game.seed(), 6);
        assert!(game.world().bodies.is_empty());
        assert_eq!(game.stats().total_games, 1);
    }

    #[test]
    fn test_restart_and_menu() {
        let mut game = Game::with_seed(7);
        game.start();
        game.request_drop();
        game.advance(FRAME);
        game.restart(42);
        assert_eq!(game.seed(), 42);
        assert!(game.world().bodies.is_empty());
        assert_eq!(game.phase(), SessionPhase::Playing);

        game.back_to_menu();
        assert_eq!(game.phase(), SessionPhase::Menu);
        assert_eq!(game.advance(FRAME), 0);
    }

    #[test]
    fn test_settings_shape_cosmetics() {
        let mut game = Game::with_seed(8);
        game.set_settings(Settings {
            particles: false,
            screen_shake: false,
            ..Default::default()
        });
        assert_eq!(game.world().max_particles, 0);
        game.world_mut().screen_shake = 0.5;
        assert_eq!(game.snapshot().screen_shake, 0.0);
    }
}
