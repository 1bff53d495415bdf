//! Statistical preview: expected entity counts from range means, without
//! running generation.

use std::fmt;

use serde::Serialize;
use strata_config::GenerationConfig;

/// Expected counts for a configuration. Values are means, not draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreviewEstimate {
    pub biome_seeds: f64,
    pub districts: f64,
    pub sectors: f64,
    pub rooms: f64,
    pub tiles: f64,
}

/// Multiply range means down the hierarchy.
pub fn estimate(config: &GenerationConfig) -> PreviewEstimate {
    let districts = config.district_count.mean();
    let sectors = districts * config.sectors_per_district.mean();
    let rooms = sectors * config.rooms_per_sector.mean();
    let tiles = rooms * f64::from(config.room_width) * f64::from(config.room_height);
    PreviewEstimate {
        biome_seeds: config.biome_count.mean(),
        districts,
        sectors,
        rooms,
        tiles,
    }
}

impl PreviewEstimate {
    /// Whole counts, rounded half away from zero.
    pub fn rounded(&self) -> [u64; 5] {
        [
            self.biome_seeds,
            self.districts,
            self.sectors,
            self.rooms,
            self.tiles,
        ]
        .map(|v| v.round() as u64)
    }
}

impl fmt::Display for PreviewEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [biomes, districts, sectors, rooms, tiles] = self.rounded();
        write!(
            f,
            "~{districts} districts, ~{sectors} sectors, ~{rooms} rooms, ~{tiles} tiles ({biomes} biome seeds)"
        )
    }
}
