//! Command-line argument parsing for the generator.

use std::path::PathBuf;

use clap::Args;

use crate::Config;
use crate::generation::{CountRange, RandomizationMode};

/// Generation overrides accepted on the command line.
///
/// CLI values override settings loaded from `strata.ron`.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    /// Run seed (0 draws a random seed).
    #[arg(long)]
    pub seed: Option<u64>,

    /// World width in world units.
    #[arg(long)]
    pub width: Option<f64>,

    /// World height in world units.
    #[arg(long)]
    pub height: Option<f64>,

    /// District count, `N` or `MIN..MAX`.
    #[arg(long)]
    pub districts: Option<CountRange>,

    /// Sectors per district, `N` or `MIN..MAX`.
    #[arg(long)]
    pub sectors: Option<CountRange>,

    /// Rooms per sector, `N` or `MIN..MAX`.
    #[arg(long)]
    pub rooms: Option<CountRange>,

    /// Rule randomization mode (none, partial, full).
    #[arg(long)]
    pub mode: Option<RandomizationMode>,

    /// Target loop density for room graphs.
    #[arg(long)]
    pub loop_density: Option<f64>,

    /// Worker threads for pooled stages (0 = one per CPU).
    #[arg(long)]
    pub threads: Option<usize>,

    /// Run every stage on the calling thread.
    #[arg(long)]
    pub sequential: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let has_world_override = args.seed.is_some()
            || args.width.is_some()
            || args.height.is_some()
            || args.districts.is_some()
            || args.sectors.is_some()
            || args.rooms.is_some()
            || args.mode.is_some()
            || args.loop_density.is_some();

        if has_world_override {
            let base = self.generation_config();
            let world = self.world_mut();
            if let Some(seed) = args.seed {
                world.seed = Some(seed);
            }
            if args.width.is_some() || args.height.is_some() {
                let mut bounds = world.world.unwrap_or(base.world);
                if let Some(w) = args.width {
                    bounds.width = w;
                }
                if let Some(h) = args.height {
                    bounds.height = h;
                }
                world.world = Some(bounds);
            }
            if let Some(r) = args.districts {
                world.district_count = Some(r);
            }
            if let Some(r) = args.sectors {
                world.sectors_per_district = Some(r);
            }
            if let Some(r) = args.rooms {
                world.rooms_per_sector = Some(r);
            }
            if let Some(mode) = args.mode {
                world.randomization_mode = Some(mode);
            }
            if let Some(density) = args.loop_density {
                world.target_loop_density = Some(density);
            }
        }

        if let Some(threads) = args.threads {
            self.runtime.worker_threads = threads;
        }
        if args.sequential {
            self.runtime.sequential = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
