//! The canonical generation record consumed by the world generator.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Inclusive `[min, max]` count range drawn from once per generation unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CountRange {
    /// Smallest count that may be drawn.
    pub min: u32,
    /// Largest count that may be drawn.
    pub max: u32,
}

impl CountRange {
    /// Create a range. No validation happens here; the resolver rejects
    /// malformed ranges at run start.
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A range that always yields `n`.
    pub const fn exact(n: u32) -> Self {
        Self { min: n, max: n }
    }

    /// Arithmetic mean of the two bounds.
    pub fn mean(&self) -> f64 {
        (f64::from(self.min) + f64::from(self.max)) * 0.5
    }

    /// `true` when `0 < min <= max`.
    pub fn is_valid(&self) -> bool {
        self.min > 0 && self.min <= self.max
    }
}

impl std::fmt::Display for CountRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Parses `"3"` or `"2..5"`.
impl FromStr for CountRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidRange(s.to_string());
        match s.split_once("..") {
            Some((lo, hi)) => {
                let min = lo.trim().parse().map_err(|_| invalid())?;
                let max = hi.trim().trim_start_matches('=').parse().map_err(|_| invalid())?;
                Ok(Self { min, max })
            }
            None => {
                let n = s.trim().parse().map_err(|_| invalid())?;
                Ok(Self::exact(n))
            }
        }
    }
}

/// How aggressively the default tile-adjacency rules are mutated per biome.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RandomizationMode {
    /// Defaults are used verbatim.
    #[default]
    None,
    /// A bounded fraction of adjacency entries is swapped within tile categories.
    Partial,
    /// Rules are regenerated from category affinities.
    Full,
}

impl FromStr for RandomizationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "partial" => Ok(Self::Partial),
            "full" => Ok(Self::Full),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// World extent in world units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldBounds {
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            width: 96.0,
            height: 96.0,
        }
    }
}

/// A biome type that biome seeds may be assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomeSpec {
    /// Unique biome name.
    pub name: String,
    /// Relative selection weight; also scales the seed's influence.
    pub weight: f64,
}

impl BiomeSpec {
    /// Shorthand constructor.
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Canonical configuration for one generation run.
///
/// A `seed` of `0` asks the resolver to draw a fresh seed from process
/// entropy and record it in the run statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Run seed (`0` = derive one).
    pub seed: u64,
    /// World extent.
    pub world: WorldBounds,
    /// Number of biome seed points.
    pub biome_count: CountRange,
    /// Number of districts.
    pub district_count: CountRange,
    /// Sectors drawn per district.
    pub sectors_per_district: CountRange,
    /// Rooms drawn per sector.
    pub rooms_per_sector: CountRange,
    /// Minimum distance between any two district centres.
    pub district_min_distance: f64,
    /// Side length of each district's local sector grid, in cells.
    pub sector_grid_size: u32,
    /// Side length of each sector's local room grid, in cells.
    pub room_grid_size: u32,
    /// Tile grid width of a room.
    pub room_width: u32,
    /// Tile grid height of a room.
    pub room_height: u32,
    /// Extra room edges per room beyond the spanning tree, in `[0, 1]`.
    pub target_loop_density: f64,
    /// Extra district edges as a fraction of spanning-tree edges.
    pub district_extra_edge_ratio: f64,
    /// Chance that an extra district edge is one-way.
    pub one_way_ratio: f64,
    /// Chance that a district edge requires a polarity.
    pub polarity_ratio: f64,
    /// Names of the available polarity gates.
    pub polarity_tags: Vec<String>,
    /// Traversal cost per world unit of edge length (floored at 0.1).
    pub traversal_cost_scale: f64,
    /// Rule randomization strategy.
    pub randomization_mode: RandomizationMode,
    /// Upper bound on the share of adjacency entries touched in `Partial` mode.
    pub partial_mutation_fraction: f64,
    /// Candidate draws allowed per placed district or biome seed.
    pub placement_attempts: u32,
    /// Synthesis attempts per room before it is marked unresolved.
    pub synthesis_retries: u32,
    /// Biome types and their weights.
    pub biomes: Vec<BiomeSpec>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world: WorldBounds::default(),
            biome_count: CountRange::new(3, 5),
            district_count: CountRange::new(4, 6),
            sectors_per_district: CountRange::new(2, 4),
            rooms_per_sector: CountRange::new(2, 4),
            district_min_distance: 16.0,
            sector_grid_size: 4,
            room_grid_size: 3,
            room_width: 12,
            room_height: 8,
            target_loop_density: 0.25,
            district_extra_edge_ratio: 0.3,
            one_way_ratio: 0.0,
            polarity_ratio: 0.2,
            polarity_tags: vec!["crimson".to_string(), "azure".to_string()],
            traversal_cost_scale: 0.1,
            randomization_mode: RandomizationMode::None,
            partial_mutation_fraction: 0.25,
            placement_attempts: 200,
            synthesis_retries: 8,
            biomes: vec![
                BiomeSpec::new("cavern", 1.0),
                BiomeSpec::new("overgrowth", 0.8),
                BiomeSpec::new("foundry", 0.6),
                BiomeSpec::new("flooded", 0.5),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_pair() {
        let r: CountRange = "2..5".parse().unwrap();
        assert_eq!(r, CountRange::new(2, 5));
        let r: CountRange = "2..=5".parse().unwrap();
        assert_eq!(r, CountRange::new(2, 5));
    }

    #[test]
    fn test_parse_range_single() {
        let r: CountRange = "4".parse().unwrap();
        assert_eq!(r, CountRange::exact(4));
    }

    #[test]
    fn test_parse_range_garbage() {
        assert!("two..five".parse::<CountRange>().is_err());
        assert!("".parse::<CountRange>().is_err());
    }

    #[test]
    fn test_range_validity() {
        assert!(CountRange::new(1, 1).is_valid());
        assert!(!CountRange::new(0, 3).is_valid());
        assert!(!CountRange::new(4, 3).is_valid());
    }

    #[test]
    fn test_mode_parse_case_insensitive() {
        assert_eq!("Full".parse::<RandomizationMode>().unwrap(), RandomizationMode::Full);
        assert_eq!("none".parse::<RandomizationMode>().unwrap(), RandomizationMode::None);
        assert!("chaos".parse::<RandomizationMode>().is_err());
    }

    #[test]
    fn test_defaults_are_valid_ranges() {
        let cfg = GenerationConfig::default();
        for r in [
            cfg.biome_count,
            cfg.district_count,
            cfg.sectors_per_district,
            cfg.rooms_per_sector,
        ] {
            assert!(r.is_valid(), "default range {r} should be valid");
        }
    }
}
