//! Biome system: registry, per-biome tile palettes, and the seed-point
//! influence field sampled by later stages.

mod def;
mod field;
mod registry;

pub use def::{BiomeDef, default_palette};
pub use field::{BiomeField, BiomeSample, BiomeSeed};
pub use registry::{BiomeId, BiomeRegistry, BiomeRegistryError};
