//! End-to-end generation: config in, world graph and statistics out.

use std::sync::Arc;

use strata_config::GenerationConfig;
use tracing::info;

use crate::biome::{BiomeField, BiomeRegistry};
use crate::district::{connect_districts, place_districts, verify_connected};
use crate::error::GenerationError;
use crate::hierarchy::{assemble, plan_district};
use crate::pool::{CancelToken, Parallelism, run_indexed};
use crate::resolve::{ResolvedRun, resolve};
use crate::rules::Rulebook;
use crate::stats::RunStats;
use crate::synth::Synthesizer;
use crate::tiles::TileCatalogue;
use crate::world::World;

/// Everything a successful run produces.
#[derive(Debug, Clone)]
pub struct GeneratedWorld {
    pub run: ResolvedRun,
    pub world: World,
    pub field: BiomeField,
    pub biomes: BiomeRegistry,
    pub tiles: TileCatalogue,
    /// Final rules per biome, shareable with consumers.
    pub rulebook: Arc<Rulebook>,
    pub stats: RunStats,
}

/// Runs the generation pipeline for one configuration.
///
/// ```no_run
/// use strata_config::GenerationConfig;
/// use strata_worldgen::{Parallelism, WorldGenerator};
///
/// let config = GenerationConfig { seed: 42, ..Default::default() };
/// let generated = WorldGenerator::new(config)
///     .with_parallelism(Parallelism::Threads(4))
///     .generate()?;
/// println!("{} rooms", generated.world.rooms.len());
/// # Ok::<(), strata_worldgen::GenerationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct WorldGenerator {
    config: GenerationConfig,
    tiles: TileCatalogue,
    parallelism: Parallelism,
    cancel: CancelToken,
}

impl WorldGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            tiles: TileCatalogue::default(),
            parallelism: Parallelism::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Use a custom tile catalogue instead of the built-in one.
    pub fn with_tiles(mut self, tiles: TileCatalogue) -> Self {
        self.tiles = tiles;
        self
    }

    /// Share an existing token, e.g. one owned by a UI thread.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels this generator's runs.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run every stage.
    ///
    /// # Errors
    ///
    /// Configuration and placement errors, or [`GenerationError::Cancelled`].
    /// No partial world is returned with an error.
    pub fn generate(&self) -> Result<GeneratedWorld, GenerationError> {
        let cancel = &self.cancel;
        let tiles = &self.tiles;

        let run = resolve(&self.config)?;
        info!(
            seed = run.seed,
            derived = run.seed_was_derived,
            biome_seeds = run.biome_count,
            districts = run.district_count,
            "Run resolved"
        );
        cancel.check()?;

        let biomes = BiomeRegistry::from_specs(&run.config.biomes, tiles)
            .map_err(|e| GenerationError::invalid("biomes", e.to_string()))?;
        let (field, mut rejections) = BiomeField::generate(&run, &biomes);
        info!(seeds = field.seeds().len(), "Biome field generated");
        cancel.check()?;

        let layout = place_districts(&run, &field)?;
        rejections += layout.rejected;
        let mut districts = layout.districts;
        let edges = connect_districts(&run, &mut districts);
        verify_connected(&districts)?;
        info!(
            districts = districts.len(),
            tree_edges = edges.tree,
            extra_edges = edges.extra,
            "Districts placed and connected"
        );
        cancel.check()?;

        let jobs: Vec<_> = districts.iter().map(|d| (d.id, d.position)).collect();
        let plans = run_indexed("district", jobs, self.parallelism, cancel, |_, (id, position)| {
            plan_district(&run, id, position)
        })?
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
        let mut world = assemble(districts, plans);
        info!(
            sectors = world.sectors.len(),
            rooms = world.rooms.len(),
            "Hierarchy built"
        );
        cancel.check()?;

        let rulebook = Arc::new(Rulebook::build(&run, &biomes, tiles));
        info!(mode = ?rulebook.mode(), biomes = biomes.len(), "Rules finalized");

        let weights: Vec<Vec<f64>> = biomes.ids().map(|b| biomes.tile_weights(b, tiles)).collect();
        let (width, height) = (run.config.room_width, run.config.room_height);
        let retries = run.config.synthesis_retries;
        let jobs: Vec<_> = world.rooms.iter().map(|r| (r.id, r.biome)).collect();
        let outcomes = run_indexed("synth", jobs, self.parallelism, cancel, |_, (id, biome)| {
            Synthesizer::new(
                rulebook.get(biome),
                &weights[usize::from(biome.0)],
                width,
                height,
            )
            .synthesize(run.seed, u64::from(id.0), retries)
        })?;

        for (room, outcome) in world.rooms.iter_mut().zip(outcomes) {
            room.tiles = Some(outcome.grid);
            room.status = outcome.status;
        }

        let stats = RunStats::collect(&run, &world, field.seeds().len(), rejections);
        info!(
            resolved = stats.resolved_rooms,
            unresolved = stats.unresolved_rooms.len(),
            attempts = stats.synthesis_attempts,
            "World generated"
        );

        Ok(GeneratedWorld {
            run,
            world,
            field,
            biomes,
            tiles: tiles.clone(),
            rulebook,
            stats,
        })
    }
}

/// Generate with default parallelism and no external cancellation.
///
/// # Errors
///
/// See [`WorldGenerator::generate`].
pub fn generate(config: GenerationConfig) -> Result<GeneratedWorld, GenerationError> {
    WorldGenerator::new(config).generate()
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
