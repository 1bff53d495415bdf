//! Biome influence field: scattered seed points, sampled by nearest
//! weighted distance.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{BiomeId, BiomeRegistry};
use crate::resolve::ResolvedRun;
use crate::seed::{SeedStream, stream_rng, weighted_index};
use crate::spacing::scatter_spaced;

/// Random spread applied to each seed's influence radius.
const RADIUS_JITTER: std::ops::Range<f64> = 0.75..1.25;

/// One scattered biome seed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeSeed {
    /// World position of the seed.
    pub position: DVec2,
    /// Biome this seed spreads.
    pub biome: BiomeId,
    /// Influence radius; larger radii win at greater distances.
    pub radius: f64,
}

/// Result of sampling the field at one position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeSample {
    /// Biome of the nearest seed.
    pub primary: BiomeId,
    /// Biome of the second-nearest seed (equal to `primary` with one seed).
    pub secondary: BiomeId,
    /// How strongly `secondary` bleeds in, in `[0, 1]`. `0` at a seed,
    /// `1` halfway between two equally weighted seeds.
    pub blend: f64,
}

/// Immutable set of biome seeds. Sampling has no hidden state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BiomeField {
    seeds: Vec<BiomeSeed>,
}

impl BiomeField {
    /// Scatter `run.biome_count` seeds over the world with spacing
    /// [`ResolvedRun::biome_min_distance`].
    ///
    /// Returns the field and the number of rejected placement candidates.
    /// A crowded world keeps the seeds that fit; the first always does.
    pub fn generate(run: &ResolvedRun, registry: &BiomeRegistry) -> (Self, u32) {
        let mut rng = stream_rng(run.seed, SeedStream::BiomeField, &[]);
        let spacing = run.biome_min_distance();
        let world = run.config.world;

        let placed = scatter_spaced(
            &mut rng,
            run.biome_count,
            DVec2::ZERO,
            DVec2::new(world.width, world.height),
            spacing,
            run.config.placement_attempts,
        );
        if placed.points.len() < run.biome_count as usize {
            tracing::warn!(
                placed = placed.points.len(),
                requested = run.biome_count,
                min_distance = spacing,
                "Biome seeds crowded out"
            );
        }

        let weights = registry.weights();
        let seeds = placed
            .points
            .into_iter()
            .map(|position| {
                let biome = weighted_index(&mut rng, &weights).unwrap_or(0);
                BiomeSeed {
                    position,
                    biome: BiomeId(biome as u16),
                    radius: spacing * rng.random_range(RADIUS_JITTER),
                }
            })
            .collect();

        (Self { seeds }, placed.rejected)
    }

    /// Build a field from explicit seeds.
    pub fn from_seeds(seeds: Vec<BiomeSeed>) -> Self {
        Self { seeds }
    }

    /// The seeds, in placement order.
    pub fn seeds(&self) -> &[BiomeSeed] {
        &self.seeds
    }

    /// Sample the field at `position`.
    ///
    /// Distance to each seed is divided by its radius; the two smallest
    /// win (first in seed order on ties). An empty field samples as
    /// `BiomeId(0)` everywhere.
    pub fn sample(&self, position: DVec2) -> BiomeSample {
        let mut nearest: Option<(f64, BiomeId)> = None;
        let mut second: Option<(f64, BiomeId)> = None;

        for seed in &self.seeds {
            let d = position.distance(seed.position) / seed.radius;
            match nearest {
                Some((d1, _)) if d >= d1 => {
                    if second.is_none_or(|(d2, _)| d < d2) {
                        second = Some((d, seed.biome));
                    }
                }
                _ => {
                    second = nearest;
                    nearest = Some((d, seed.biome));
                }
            }
        }

        match (nearest, second) {
            (None, _) => BiomeSample {
                primary: BiomeId(0),
                secondary: BiomeId(0),
                blend: 0.0,
            },
            (Some((_, primary)), None) => BiomeSample {
                primary,
                secondary: primary,
                blend: 0.0,
            },
            (Some((d1, primary)), Some((d2, secondary))) => {
                let blend = if d2 > 0.0 {
                    (d1 / d2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                BiomeSample {
                    primary,
                    secondary,
                    blend,
                }
            }
        }
    }
}
