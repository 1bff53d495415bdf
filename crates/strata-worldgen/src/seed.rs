//! Deterministic seeded randomness.
//!
//! Every unit of work (a district, a sector, a room attempt, a biome's rules)
//! derives its own RNG from the run seed, a stream tag and stable ids, so the
//! same unit draws the same numbers no matter which thread runs it or in
//! what order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Independent random streams within one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeedStream {
    /// Concrete counts drawn by the resolver.
    Counts,
    /// Biome seed scattering.
    BiomeField,
    /// District placement.
    Districts,
    /// District edge extras, polarity and direction.
    DistrictEdges,
    /// Sector selection, keyed by district id.
    Sectors,
    /// Room selection, keyed by district id and sector index.
    Rooms,
    /// Rule randomization, keyed by biome id.
    Rules,
    /// Tile synthesis, keyed by room id and attempt.
    Synthesis,
}

/// Derive a u64 seed from the run seed, a stream and stable keys.
///
/// Uses SipHash (via std's `DefaultHasher`) to mix the inputs into a
/// well-distributed u64.
pub fn derive_seed(run_seed: u64, stream: SeedStream, keys: &[u64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    run_seed.hash(&mut hasher);
    stream.hash(&mut hasher);
    keys.hash(&mut hasher);
    hasher.finish()
}

/// RNG for one unit of work.
pub fn stream_rng(run_seed: u64, stream: SeedStream, keys: &[u64]) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(run_seed, stream, keys))
}

/// Pick an index with probability proportional to `weights`.
///
/// Non-positive weights are never picked. Returns `None` when no weight is
/// positive.
pub fn weighted_index<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let mut roll = rng.random::<f64>() * total;
    let mut last_positive = None;
    for (i, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        last_positive = Some(i);
        roll -= weight;
        if roll < 0.0 {
            return Some(i);
        }
    }
    // Float rounding can leave a sliver past the final bucket.
    last_positive
}
