//! Fruit Merge entry point
//!
//! On the web the page drives `platform::web::WebGame`. Natively this runs a
//! headless autopilot session, useful for balancing and soak testing.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;
    use serde::Serialize;

    use fruit_merge::consts::{DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH};
    use fruit_merge::sim::{GameOverReport, Random};
    use fruit_merge::stats::StatsSummary;
    use fruit_merge::{Game, QualityPreset, SessionPhase, Settings, Stats, Tuning};

    /// RNG stream for autopilot choices, separate from the world's streams
    const AUTOPILOT_STREAM: u64 = 2;
    /// Autopilot frame length (60 Hz display)
    const FRAME_DT: f32 = 1.0 / 60.0;

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Headless Fruit Merge autopilot")]
    struct Cli {
        /// World seed (defaults to the clock)
        #[arg(long)]
        seed: Option<u64>,
        /// Stop after this much play time if the well never overflows
        #[arg(long, default_value_t = 300.0)]
        max_seconds: f32,
        /// Seconds between autopilot drops
        #[arg(long, default_value_t = 0.8)]
        drop_interval: f32,
        /// Tuning JSON (partial documents keep defaults)
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Stats JSON to update with the result
        #[arg(long)]
        stats: Option<PathBuf>,
        /// Effects quality preset: low, medium or high
        #[arg(long, default_value = "medium", value_parser = parse_quality)]
        quality: QualityPreset,
    }

    fn parse_quality(s: &str) -> Result<QualityPreset, String> {
        QualityPreset::parse(s).ok_or_else(|| format!("unknown quality preset `{s}`"))
    }

    #[derive(Debug, Serialize)]
    struct RunSummary {
        seed: u64,
        game_over: bool,
        merges: u32,
        drops: u32,
        report: GameOverReport,
        /// Lifetime totals, when a stats file is in use
        #[serde(skip_serializing_if = "Option::is_none")]
        lifetime: Option<StatsSummary>,
    }

    pub fn run() -> fruit_merge::Result<()> {
        env_logger::init();
        let cli = Cli::parse();

        let tuning = match &cli.tuning {
            Some(path) => Tuning::load_from(path)?,
            None => Tuning::default(),
        };
        let stats = match &cli.stats {
            Some(path) => Stats::load_from(path)?,
            None => Stats::new(),
        };
        let seed = cli.seed.unwrap_or_else(fruit_merge::platform::clock_seed);
        log::info!(
            "Fruit Merge (headless) seed {}, quality {}",
            seed,
            cli.quality.as_str()
        );

        let mut game = Game::new(
            seed,
            DEFAULT_WORLD_WIDTH,
            DEFAULT_WORLD_HEIGHT,
            tuning,
            Settings::from_preset(cli.quality),
            stats,
        )?;
        let mut pilot = Random::with_stream(seed, AUTOPILOT_STREAM);
        game.start();

        let mut since_drop = 0.0;
        while game.phase() == SessionPhase::Playing
            && game.world().sim.elapsed < cli.max_seconds
        {
            since_drop += FRAME_DT;
            if since_drop >= cli.drop_interval && game.world().held.is_some() {
                since_drop = 0.0;
                let geometry = game.world().geometry;
                let x = pilot.range(geometry.left_wall_x, geometry.right_wall_x);
                game.set_target_x(x);
                game.request_drop();
            }
            game.advance(FRAME_DT);
            game.drain_events();
        }

        let world = game.world();
        let game_over = game.phase() == SessionPhase::GameOver;
        let summary = RunSummary {
            seed,
            game_over,
            merges: world.sim.merges,
            drops: world.sim.drops,
            report: world
                .report
                .clone()
                .unwrap_or_else(|| world.game_over_report()),
            lifetime: cli.stats.as_ref().map(|_| game.stats().summary()),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);

        if let Some(path) = &cli.stats {
            if game_over {
                game.stats().save_to(path)?;
            } else {
                log::warn!("Run hit the time limit; stats not updated");
            }
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = headless::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}
