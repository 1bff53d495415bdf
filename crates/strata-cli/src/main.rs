//! `strata`: command-line front end for the world generator.
//!
//! Loads `strata.ron`, applies command-line overrides, and either prints a
//! statistical preview or runs the full pipeline and reports the result.
//!
//! Run with: `cargo run -p strata-cli -- --seed 42 --districts 4..6`

mod render;

use std::process::ExitCode;

use clap::Parser;
use strata_config::{CliArgs, Config};
use strata_worldgen::{Parallelism, RoomId, WorldGenerator, preview};
use tracing::{error, info, warn};

/// CLI arguments for the generator binary.
#[derive(Parser, Debug)]
#[command(name = "strata", about = "Procedural hierarchical world generator")]
struct StrataArgs {
    #[command(flatten)]
    overrides: CliArgs,

    /// Print expected counts from range means and exit.
    #[arg(long)]
    preview: bool,

    /// Print the tile grid of one room.
    #[arg(long, value_name = "ROOM")]
    dump_room: Option<u32>,

    /// Print run statistics as JSON instead of a text summary.
    #[arg(long)]
    json: bool,

    /// Write the effective config (with overrides) back to `strata.ron`.
    #[arg(long)]
    save: bool,
}

fn main() -> ExitCode {
    let args = StrataArgs::parse();

    let config_dir = args.overrides.config.clone().or_else(Config::default_dir);
    let (mut config, load_error) = match config_dir.as_deref().map(Config::load_or_create) {
        Some(Ok(config)) => (config, None),
        Some(Err(e)) => (Config::default(), Some(e)),
        None => (Config::default(), None),
    };
    config.apply_cli_overrides(&args.overrides);

    let log_dir = config_dir.as_ref().map(|d| d.join("logs"));
    strata_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {e}");
    }
    if args.save
        && let Some(dir) = &config_dir
        && let Err(e) = config.save(dir)
    {
        warn!("Failed to save config: {e}");
    }

    let generation = config.generation_config();

    if args.preview {
        let estimate = preview::estimate(&generation);
        if args.json {
            match serde_json::to_string_pretty(&estimate) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    error!("Failed to encode preview: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{estimate}");
        }
        return ExitCode::SUCCESS;
    }

    let parallelism = if config.runtime.sequential {
        Parallelism::Sequential
    } else {
        Parallelism::Threads(config.runtime.worker_threads)
    };
    info!(?parallelism, mode = ?generation.randomization_mode, "Starting generation");

    let generated = match WorldGenerator::new(generation)
        .with_parallelism(parallelism)
        .generate()
    {
        Ok(generated) => generated,
        Err(e) => {
            error!("Generation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&generated.stats) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!("Failed to encode statistics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", render::summary(&generated.stats));
    }

    if let Some(room) = args.dump_room {
        match render::render_room(&generated, RoomId(room)) {
            Some(text) => print!("{text}"),
            None => {
                error!(
                    "Room {room} does not exist (world has {} rooms)",
                    generated.world.rooms.len()
                );
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
