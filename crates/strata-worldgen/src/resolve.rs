//! Configuration resolver: validates a [`GenerationConfig`] and fixes the
//! run-level random choices.

use rand::Rng;
use rustc_hash::FxHashSet;
use strata_config::{CountRange, GenerationConfig};

use crate::error::GenerationError;
use crate::seed::{SeedStream, stream_rng};

/// Concrete parameters for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRun {
    /// The seed every stream derives from. Never zero.
    pub seed: u64,
    /// `true` when the configured seed was `0` and this one came from entropy.
    pub seed_was_derived: bool,
    /// Biome seed points to scatter.
    pub biome_count: u32,
    /// Districts to place.
    pub district_count: u32,
    /// Side of one sector cell in world units.
    pub sector_cell_size: f64,
    /// World width in sector cells (rounded up).
    pub grid_width: u32,
    /// World height in sector cells (rounded up).
    pub grid_height: u32,
    /// The validated configuration.
    pub config: GenerationConfig,
}

impl ResolvedRun {
    /// Spacing used when scattering biome seeds.
    pub fn biome_min_distance(&self) -> f64 {
        self.config.district_min_distance * BIOME_SPACING_FACTOR
    }
}

/// Biome seeds are scattered with this fraction of the district spacing.
pub const BIOME_SPACING_FACTOR: f64 = 0.5;

/// Validate `config` and draw the run-level counts.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidConfig`] for the first malformed field.
pub fn resolve(config: &GenerationConfig) -> Result<ResolvedRun, GenerationError> {
    validate(config)?;

    let (seed, seed_was_derived) = if config.seed == 0 {
        (rand::random::<u64>().max(1), true)
    } else {
        (config.seed, false)
    };

    let mut rng = stream_rng(seed, SeedStream::Counts, &[]);
    let biome_count = draw(&mut rng, config.biome_count);
    let district_count = draw(&mut rng, config.district_count);

    let sector_cell_size = config.district_min_distance / f64::from(config.sector_grid_size);
    let grid_width = (config.world.width / sector_cell_size).ceil() as u32;
    let grid_height = (config.world.height / sector_cell_size).ceil() as u32;

    Ok(ResolvedRun {
        seed,
        seed_was_derived,
        biome_count,
        district_count,
        sector_cell_size,
        grid_width,
        grid_height,
        config: config.clone(),
    })
}

/// Draw uniformly from an inclusive range.
pub fn draw<R: Rng + ?Sized>(rng: &mut R, range: CountRange) -> u32 {
    rng.random_range(range.min..=range.max)
}

fn validate(config: &GenerationConfig) -> Result<(), GenerationError> {
    check_range("biome_count", config.biome_count)?;
    check_range("district_count", config.district_count)?;
    check_range("sectors_per_district", config.sectors_per_district)?;
    check_range("rooms_per_sector", config.rooms_per_sector)?;

    check_positive("world.width", config.world.width)?;
    check_positive("world.height", config.world.height)?;
    check_positive("district_min_distance", config.district_min_distance)?;
    check_positive("traversal_cost_scale", config.traversal_cost_scale)?;

    for (field, value) in [
        ("sector_grid_size", config.sector_grid_size),
        ("room_grid_size", config.room_grid_size),
        ("room_width", config.room_width),
        ("room_height", config.room_height),
        ("placement_attempts", config.placement_attempts),
        ("synthesis_retries", config.synthesis_retries),
    ] {
        if value == 0 {
            return Err(GenerationError::invalid(field, "must be greater than zero"));
        }
    }

    check_unit("target_loop_density", config.target_loop_density)?;
    check_unit("one_way_ratio", config.one_way_ratio)?;
    check_unit("polarity_ratio", config.polarity_ratio)?;
    check_unit("partial_mutation_fraction", config.partial_mutation_fraction)?;
    if !(config.district_extra_edge_ratio >= 0.0 && config.district_extra_edge_ratio.is_finite()) {
        return Err(GenerationError::invalid(
            "district_extra_edge_ratio",
            format!("must be finite and >= 0, got {}", config.district_extra_edge_ratio),
        ));
    }

    if config.polarity_ratio > 0.0 && config.polarity_tags.is_empty() {
        return Err(GenerationError::invalid(
            "polarity_tags",
            "polarity_ratio is non-zero but no polarity tags are defined",
        ));
    }
    if config.polarity_tags.len() > usize::from(u8::MAX) + 1 {
        return Err(GenerationError::invalid("polarity_tags", "at most 256 tags"));
    }

    if config.biomes.is_empty() {
        return Err(GenerationError::invalid("biomes", "at least one biome is required"));
    }
    let mut names = FxHashSet::default();
    for biome in &config.biomes {
        if !names.insert(biome.name.as_str()) {
            return Err(GenerationError::invalid(
                "biomes",
                format!("duplicate biome name `{}`", biome.name),
            ));
        }
        if !(biome.weight > 0.0 && biome.weight.is_finite()) {
            return Err(GenerationError::invalid(
                "biomes",
                format!("biome `{}` weight must be > 0, got {}", biome.name, biome.weight),
            ));
        }
    }
    if config.biomes.len() > usize::from(u16::MAX) {
        return Err(GenerationError::invalid("biomes", "too many biomes"));
    }

    Ok(())
}

fn check_range(field: &'static str, range: CountRange) -> Result<(), GenerationError> {
    if range.min == 0 {
        return Err(GenerationError::invalid(field, format!("min must be > 0 in {range}")));
    }
    if range.min > range.max {
        return Err(GenerationError::invalid(field, format!("min exceeds max in {range}")));
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), GenerationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GenerationError::invalid(field, format!("must be finite and > 0, got {value}")))
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), GenerationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GenerationError::invalid(field, format!("must be within [0, 1], got {value}")))
    }
}
