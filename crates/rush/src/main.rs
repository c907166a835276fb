// rush: headless driver for the lane rhythm game.
//
// Runs a session on a simulated frame clock, fed by autoplay or a
// recorded input script, and prints the final score as JSON.

mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rush_config::{DEFAULT_CONFIG_PATH, GameConfig};
use rush_play::Autoplay;
use tracing::info;

use run::{InputSource, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "rush", about = "Lane rhythm game session runner")]
struct Args {
    /// Path to game config JSON file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Use the nine-lane layout when no config file exists.
    #[arg(long)]
    nine_key: bool,

    /// Write the default config to --config and exit.
    #[arg(long)]
    write_default_config: bool,

    /// Seed for note generation.
    #[arg(long, env = "RUSH_SEED", default_value_t = 0)]
    seed: u64,

    /// Session length in seconds.
    #[arg(long, default_value_t = 60)]
    duration: u64,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// JSON file with recorded lane input events (replaces autoplay).
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Autoplay aim offset in position units (positive presses early).
    #[arg(long, default_value_t = 0.0)]
    offset: f64,

    /// Fraction of notes autoplay lets through.
    #[arg(long, default_value_t = 0.0)]
    miss_rate: f64,

    /// Log every judge event.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "info,rush=debug,rush_play=debug,rush_pattern=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    info!("rush starting");

    if args.write_default_config {
        let config = default_config(args.nine_key);
        config.write(&args.config)?;
        info!(path = %args.config.display(), "Wrote default config");
        return Ok(());
    }

    // Load config from file, falling back to defaults if not found
    let config = if args.config.exists() {
        let config = GameConfig::read(&args.config)?;
        info!(path = %args.config.display(), "Loaded game config");
        config
    } else {
        info!(
            path = %args.config.display(),
            "Config not found, using defaults"
        );
        default_config(args.nine_key)
    };

    let source = match &args.inputs {
        Some(path) => {
            let events = run::read_inputs(path)?;
            info!(path = %path.display(), count = events.len(), "Loaded input script");
            InputSource::Script(events)
        }
        None => InputSource::Autoplay(
            Autoplay::new()
                .with_offset(args.offset)
                .with_miss_rate(args.miss_rate, args.seed),
        ),
    };

    let options = RunOptions {
        duration_ms: run::duration_ms(args.duration)?,
        fps: args.fps,
    };
    let summary = run::run(config, StdRng::seed_from_u64(args.seed), source, &options)?;
    info!(
        total = summary.score.total,
        max_combo = summary.score.max_combo,
        difficulty = summary.difficulty,
        "Session finished"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn default_config(nine_key: bool) -> GameConfig {
    if nine_key {
        GameConfig::nine_key()
    } else {
        GameConfig::default()
    }
}
