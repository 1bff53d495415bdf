//! Procedural hierarchical world generation: biome field, connected
//! districts, sector and room hierarchy, per-biome adjacency rules and
//! constraint-propagation tile synthesis.

mod district;
mod error;
mod fingerprint;
mod graph;
mod hierarchy;
mod pipeline;
mod pool;
mod resolve;
mod seed;
mod spacing;
mod stats;
mod world;

pub mod biome;
pub mod preview;
pub mod rules;
pub mod synth;
pub mod tiles;

pub use biome::{BiomeDef, BiomeField, BiomeId, BiomeRegistry, BiomeSample, BiomeSeed};
pub use district::{
    DistrictEdgeCounts, DistrictLayout, connect_districts, place_districts, verify_connected,
};
pub use error::{Contradiction, GenerationError, PlacementStage};
pub use fingerprint::world_fingerprint;
pub use hierarchy::{DistrictPlan, LocalEdge, SectorPlan, assemble, plan_district};
pub use pipeline::{GeneratedWorld, WorldGenerator, generate};
pub use pool::{CancelToken, Parallelism, run_indexed};
pub use resolve::{BIOME_SPACING_FACTOR, ResolvedRun, resolve};
pub use rules::{Rulebook, Ruleset, default_ruleset};
pub use seed::{SeedStream, derive_seed, stream_rng, weighted_index};
pub use stats::{RunStats, UnresolvedRoom};
pub use synth::{SynthesisOutcome, SynthesisStatus, Synthesizer, TileCell, TileGrid};
pub use tiles::{Direction, TileCatalogue, TileCategory, TileDef, TileId, TileSet};
pub use world::{
    Connection, ConnectionKind, District, DistrictId, GridCoord, MIN_TRAVERSAL_COST, Polarity,
    Room, RoomEdge, RoomId, Sector, SectorId, World,
};
