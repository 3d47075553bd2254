#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Defense Evolution simulation headlessly.

mod autoplay;
mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use defense_evolution_core::CellCoord;
use defense_evolution_system_progression::Progression;
use tracing_subscriber::EnvFilter;

use autoplay::{Autoplay, AutoplayConfig, Summary};

/// Command-line arguments accepted by the Defense Evolution CLI.
#[derive(Debug, Parser)]
#[command(name = "defense-evolution")]
#[command(about = "Plays Defense Evolution waves headlessly and reports the outcome")]
struct CliArgs {
    /// Wave definition file.
    #[arg(long, value_name = "PATH", default_value = "data/waves.de")]
    waves: PathBuf,

    /// Optional TOML file overriding balance parameters.
    #[arg(long, value_name = "PATH")]
    balance: Option<PathBuf>,

    /// Number of grid rows.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(2..))]
    rows: u32,

    /// Number of grid columns.
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(1..))]
    columns: u32,

    /// Buys a shooter at ROW:COL before the first wave. May be repeated.
    #[arg(long = "place", value_name = "ROW:COL", value_parser = parse_cell)]
    placements: Vec<CellCoord>,

    /// Stops after this many waves have been cleared.
    #[arg(long, default_value_t = 5)]
    waves_to_play: u32,

    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,

    /// Upper bound on simulated frames.
    #[arg(long, default_value_t = 200_000)]
    max_frames: u64,

    /// Overrides the lane layout seed from the balance file.
    #[arg(long)]
    seed: Option<u64>,

    /// Prints the summary as JSON instead of text.
    #[arg(long)]
    summary_json: bool,
}

/// Entry point for the Defense Evolution command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let mut balance = config::load_balance(args.balance.as_deref())?;
    if let Some(seed) = args.seed {
        balance.seed = seed;
    }

    let mut progression = Progression::new(balance, args.columns);
    if let Err(error) = progression.load_waves(&args.waves) {
        tracing::warn!(%error, "continuing without waves");
    }

    let autoplay = Autoplay::new(
        progression,
        AutoplayConfig {
            rows: args.rows,
            columns: args.columns,
            frame: Duration::from_millis(args.frame_ms),
            max_frames: args.max_frames,
            waves_to_play: args.waves_to_play,
            placements: args.placements,
        },
    );
    let summary = autoplay.run();

    if args.summary_json {
        let json = serde_json::to_string_pretty(&summary).context("failed to encode summary")?;
        println!("{json}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn print_summary(summary: &Summary) {
    println!(
        "waves cleared: {} ({} era)",
        summary.waves_cleared, summary.era
    );
    println!(
        "frames: {} ({:.1}s simulated)",
        summary.frames, summary.simulated_seconds
    );
    println!("gold: {}", summary.gold_display);
    if summary.building_fallen {
        println!("building: fallen");
    } else {
        println!("building health: {}", summary.building_health);
    }
    println!(
        "shooters: {}, enemies killed: {}, breaches: {}, upgrades: {}",
        summary.shooters, summary.enemies_killed, summary.enemies_breached, summary.upgrades
    );
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (row, column) = value
        .split_once(':')
        .ok_or_else(|| format!("expected ROW:COL, got `{value}`"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|_| format!("invalid row `{row}`"))?;
    let column = column
        .trim()
        .parse()
        .map_err(|_| format!("invalid column `{column}`"))?;
    Ok(CellCoord::new(row, column))
}
