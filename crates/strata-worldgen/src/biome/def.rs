//! Biome definition: the properties of a single biome type.

use crate::tiles::{TileCatalogue, TileCategory, TileId};

/// Full descriptor for a biome type.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeDef {
    /// Human-readable biome name (e.g., "flooded").
    pub name: String,
    /// Relative weight when assigning biome seeds.
    pub weight: f64,
    /// Tile weights used when collapsing cells in rooms of this biome.
    pub palette: Vec<(TileId, f64)>,
}

impl BiomeDef {
    /// A biome with the palette [`default_palette`] picks for its name.
    pub fn with_default_palette(
        name: impl Into<String>,
        weight: f64,
        tiles: &TileCatalogue,
    ) -> Self {
        let name = name.into();
        let palette = default_palette(&name, tiles);
        Self {
            name,
            weight,
            palette,
        }
    }
}

/// Weight multiplier for the category a biome name favours.
const FAVOURED_WEIGHT: f64 = 3.0;

/// Every catalogue tile at weight 1, with the category suggested by the
/// biome name tripled. Unknown names favour walls.
pub fn default_palette(name: &str, tiles: &TileCatalogue) -> Vec<(TileId, f64)> {
    let lower = name.to_ascii_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| lower.contains(k));

    let favoured = if has(&["flood", "water", "marsh"]) {
        TileCategory::Liquid
    } else if has(&["foundry", "lava", "fire", "forge"]) {
        TileCategory::Hazard
    } else if has(&["overgrowth", "forest", "garden"]) {
        TileCategory::Decor
    } else {
        TileCategory::Wall
    };

    tiles
        .iter()
        .map(|(id, def)| {
            let weight = if def.category == favoured {
                FAVOURED_WEIGHT
            } else {
                1.0
            };
            (id, weight)
        })
        .collect()
}
