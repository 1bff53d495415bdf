//! Reconciles the legacy and current configuration representations into one
//! canonical [`GenerationConfig`].
//!
//! Precedence is current > legacy > base. The merge is pure: no fields are
//! remembered between calls and no generation happens here.

use serde::{Deserialize, Serialize};

use crate::generation::{BiomeSpec, CountRange, GenerationConfig, RandomizationMode, WorldBounds};

/// The older flat settings layout.
///
/// World bounds are stored as inclusive integer corners and count ranges as
/// separate `min_*`/`max_*` fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LegacySettings {
    /// Run seed.
    pub seed: Option<u64>,
    /// Inclusive lower world corner.
    pub world_min: Option<[i32; 2]>,
    /// Inclusive upper world corner.
    pub world_max: Option<[i32; 2]>,
    /// Lower bound on biome seeds.
    pub min_biomes: Option<u32>,
    /// Upper bound on biome seeds.
    pub max_biomes: Option<u32>,
    /// Lower bound on districts.
    pub min_districts: Option<u32>,
    /// Upper bound on districts.
    pub max_districts: Option<u32>,
    /// Lower bound on sectors per district.
    pub min_sectors: Option<u32>,
    /// Upper bound on sectors per district.
    pub max_sectors: Option<u32>,
    /// Lower bound on rooms per sector.
    pub min_rooms: Option<u32>,
    /// Upper bound on rooms per sector.
    pub max_rooms: Option<u32>,
    /// Minimum district spacing.
    pub district_spacing: Option<f64>,
    /// Loop chance in percent (`0..=100`).
    pub loop_chance_percent: Option<u32>,
    /// Whether tile rules were randomized at all.
    pub randomize_rules: Option<bool>,
    /// Whether randomization regenerated the rules completely.
    pub full_randomization: Option<bool>,
}

/// The current settings layout: every canonical field, each optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldSettings {
    pub seed: Option<u64>,
    pub world: Option<WorldBounds>,
    pub biome_count: Option<CountRange>,
    pub district_count: Option<CountRange>,
    pub sectors_per_district: Option<CountRange>,
    pub rooms_per_sector: Option<CountRange>,
    pub district_min_distance: Option<f64>,
    pub sector_grid_size: Option<u32>,
    pub room_grid_size: Option<u32>,
    pub room_width: Option<u32>,
    pub room_height: Option<u32>,
    pub target_loop_density: Option<f64>,
    pub district_extra_edge_ratio: Option<f64>,
    pub one_way_ratio: Option<f64>,
    pub polarity_ratio: Option<f64>,
    pub polarity_tags: Option<Vec<String>>,
    pub traversal_cost_scale: Option<f64>,
    pub randomization_mode: Option<RandomizationMode>,
    pub partial_mutation_fraction: Option<f64>,
    pub placement_attempts: Option<u32>,
    pub synthesis_retries: Option<u32>,
    pub biomes: Option<Vec<BiomeSpec>>,
}

/// Merge both representations over `base`.
///
/// Returns `base` untouched when neither representation is present.
pub fn reconcile(
    base: GenerationConfig,
    legacy: Option<&LegacySettings>,
    current: Option<&WorldSettings>,
) -> GenerationConfig {
    let mut config = base;
    if let Some(legacy) = legacy {
        apply_legacy(&mut config, legacy);
    }
    if let Some(current) = current {
        apply_current(&mut config, current);
    }
    config
}

fn apply_legacy(config: &mut GenerationConfig, legacy: &LegacySettings) {
    if let Some(seed) = legacy.seed {
        config.seed = seed;
    }
    if let (Some(lo), Some(hi)) = (legacy.world_min, legacy.world_max) {
        config.world = WorldBounds {
            width: inclusive_extent(lo[0], hi[0]),
            height: inclusive_extent(lo[1], hi[1]),
        };
    }
    merge_range(&mut config.biome_count, legacy.min_biomes, legacy.max_biomes);
    merge_range(&mut config.district_count, legacy.min_districts, legacy.max_districts);
    merge_range(&mut config.sectors_per_district, legacy.min_sectors, legacy.max_sectors);
    merge_range(&mut config.rooms_per_sector, legacy.min_rooms, legacy.max_rooms);
    if let Some(spacing) = legacy.district_spacing {
        config.district_min_distance = spacing;
    }
    if let Some(pct) = legacy.loop_chance_percent {
        config.target_loop_density = f64::from(pct.min(100)) / 100.0;
    }
    if let Some(randomize) = legacy.randomize_rules {
        config.randomization_mode = match (randomize, legacy.full_randomization.unwrap_or(false)) {
            (false, _) => RandomizationMode::None,
            (true, false) => RandomizationMode::Partial,
            (true, true) => RandomizationMode::Full,
        };
    }
}

fn apply_current(config: &mut GenerationConfig, current: &WorldSettings) {
    fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
        if let Some(v) = value {
            *slot = v.clone();
        }
    }

    set(&mut config.seed, &current.seed);
    set(&mut config.world, &current.world);
    set(&mut config.biome_count, &current.biome_count);
    set(&mut config.district_count, &current.district_count);
    set(&mut config.sectors_per_district, &current.sectors_per_district);
    set(&mut config.rooms_per_sector, &current.rooms_per_sector);
    set(&mut config.district_min_distance, &current.district_min_distance);
    set(&mut config.sector_grid_size, &current.sector_grid_size);
    set(&mut config.room_grid_size, &current.room_grid_size);
    set(&mut config.room_width, &current.room_width);
    set(&mut config.room_height, &current.room_height);
    set(&mut config.target_loop_density, &current.target_loop_density);
    set(&mut config.district_extra_edge_ratio, &current.district_extra_edge_ratio);
    set(&mut config.one_way_ratio, &current.one_way_ratio);
    set(&mut config.polarity_ratio, &current.polarity_ratio);
    set(&mut config.polarity_tags, &current.polarity_tags);
    set(&mut config.traversal_cost_scale, &current.traversal_cost_scale);
    set(&mut config.randomization_mode, &current.randomization_mode);
    set(&mut config.partial_mutation_fraction, &current.partial_mutation_fraction);
    set(&mut config.placement_attempts, &current.placement_attempts);
    set(&mut config.synthesis_retries, &current.synthesis_retries);
    set(&mut config.biomes, &current.biomes);
}

/// Size of an inclusive integer interval. Reversed corners yield zero or a
/// negative extent, which the resolver rejects.
fn inclusive_extent(lo: i32, hi: i32) -> f64 {
    f64::from(hi) - f64::from(lo) + 1.0
}

fn merge_range(range: &mut CountRange, min: Option<u32>, max: Option<u32>) {
    if let Some(min) = min {
        range.min = min;
    }
    if let Some(max) = max {
        range.max = max;
    }
}
