//! Biome registry: maps [`BiomeId`] to [`BiomeDef`] with name-based lookup.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use strata_config::BiomeSpec;

use super::BiomeDef;
use crate::tiles::TileCatalogue;

/// Unique identifier for a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BiomeId(pub u16);

/// Errors that can occur when registering biomes.
#[derive(Debug, thiserror::Error)]
pub enum BiomeRegistryError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
}

/// Stores all registered biome definitions with O(1) lookup by ID.
#[derive(Clone, Debug, Default)]
pub struct BiomeRegistry {
    biomes: Vec<BiomeDef>,
    name_to_id: FxHashMap<String, BiomeId>,
}

impl BiomeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every configured biome with its default palette, in order.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRegistryError::DuplicateName`] on a repeated name.
    pub fn from_specs(
        specs: &[BiomeSpec],
        tiles: &TileCatalogue,
    ) -> Result<Self, BiomeRegistryError> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(BiomeDef::with_default_palette(
                spec.name.clone(),
                spec.weight,
                tiles,
            ))?;
        }
        Ok(registry)
    }

    /// Registers a new biome definition, returning its assigned [`BiomeId`].
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRegistryError::DuplicateName`] if a biome with the same name exists.
    pub fn register(&mut self, def: BiomeDef) -> Result<BiomeId, BiomeRegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(BiomeRegistryError::DuplicateName(def.name.clone()));
        }
        let id = BiomeId(self.biomes.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.biomes.push(def);
        Ok(id)
    }

    /// Returns the definition for the given biome ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn get(&self, id: BiomeId) -> &BiomeDef {
        &self.biomes[id.0 as usize]
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// All biome ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = BiomeId> + '_ {
        (0..self.biomes.len()).map(|i| BiomeId(i as u16))
    }

    /// Selection weights, indexed by biome id.
    pub fn weights(&self) -> Vec<f64> {
        self.biomes.iter().map(|b| b.weight).collect()
    }

    /// Palette weights for `id`, indexed by tile id. Tiles missing from the
    /// palette get weight 0.
    pub fn tile_weights(&self, id: BiomeId, tiles: &TileCatalogue) -> Vec<f64> {
        let mut weights = vec![0.0; tiles.len()];
        for &(tile, weight) in &self.get(id).palette {
            if let Some(slot) = weights.get_mut(usize::from(tile.0)) {
                *slot = weight;
            }
        }
        weights
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}
