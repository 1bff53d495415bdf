//! Per-biome rule randomization.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use strata_config::RandomizationMode;

use super::{CANONICAL_DIRECTIONS, Ruleset, default_ruleset};
use crate::biome::{BiomeId, BiomeRegistry};
use crate::resolve::ResolvedRun;
use crate::seed::{SeedStream, stream_rng};
use crate::tiles::{TileCatalogue, TileId, affinity};

/// The finalized ruleset of every biome, indexed by [`BiomeId`].
///
/// Immutable once built; synthesis workers share it read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rulebook {
    mode: RandomizationMode,
    rulesets: Vec<Ruleset>,
}

impl Rulebook {
    /// Derive each biome's ruleset from the defaults under the run's mode.
    /// Each biome draws from its own stream.
    pub fn build(run: &ResolvedRun, biomes: &BiomeRegistry, tiles: &TileCatalogue) -> Self {
        let defaults = default_ruleset(tiles);
        let mode = run.config.randomization_mode;

        let rulesets = biomes
            .ids()
            .map(|biome| {
                let mut rng = stream_rng(run.seed, SeedStream::Rules, &[u64::from(biome.0)]);
                let rules = randomize(
                    &defaults,
                    tiles,
                    mode,
                    run.config.partial_mutation_fraction,
                    &mut rng,
                );
                tracing::debug!(
                    biome = biome.0,
                    entries = rules.entries().len(),
                    "Ruleset finalized"
                );
                rules
            })
            .collect();

        Self { mode, rulesets }
    }

    pub fn mode(&self) -> RandomizationMode {
        self.mode
    }

    /// Ruleset for `biome`.
    ///
    /// # Panics
    ///
    /// Panics if `biome` was not in the registry the book was built from.
    pub fn get(&self, biome: BiomeId) -> &Ruleset {
        &self.rulesets[usize::from(biome.0)]
    }

    pub fn rulesets(&self) -> &[Ruleset] {
        &self.rulesets
    }
}

/// Apply `mode` to a copy of `defaults`.
///
/// Neither randomizing mode leaves a tile without an allowed neighbor on
/// any side.
pub fn randomize<R: Rng + ?Sized>(
    defaults: &Ruleset,
    tiles: &TileCatalogue,
    mode: RandomizationMode,
    mutation_fraction: f64,
    rng: &mut R,
) -> Ruleset {
    match mode {
        RandomizationMode::None => defaults.clone(),
        RandomizationMode::Partial => mutate_partial(defaults, tiles, mutation_fraction, rng),
        RandomizationMode::Full => regenerate_full(tiles, rng),
    }
}

/// Swap up to `fraction` of the canonical entries to a same-category
/// neighbor. A swap that would strip the old neighbor's last allowance on
/// that side is skipped.
fn mutate_partial<R: Rng + ?Sized>(
    defaults: &Ruleset,
    tiles: &TileCatalogue,
    fraction: f64,
    rng: &mut R,
) -> Ruleset {
    let mut rules = defaults.clone();
    let budget = (fraction * defaults.entries().len() as f64).ceil() as usize;
    if budget == 0 {
        return rules;
    }
    let mutations = rng.random_range(1..=budget);

    let mut applied = 0usize;
    for _ in 0..mutations {
        let entries = rules.entries();
        let Some(entry) = entries.choose(rng).copied() else {
            break;
        };

        let category = tiles.category(entry.neighbor);
        let candidates: Vec<TileId> = tiles
            .iter()
            .filter(|(id, def)| {
                def.category == category
                    && *id != entry.neighbor
                    && !rules.is_allowed(entry.tile, entry.dir, *id)
            })
            .map(|(id, _)| id)
            .collect();
        let Some(&replacement) = candidates.choose(rng) else {
            continue;
        };

        if rules.neighbors(entry.neighbor, entry.dir.opposite()).len() <= 1 {
            continue;
        }

        rules.forbid(entry.tile, entry.dir, entry.neighbor);
        rules.allow(entry.tile, entry.dir, replacement);
        applied += 1;
    }

    tracing::trace!(requested = mutations, applied, "Partial rule mutation");
    rules
}

/// Build a ruleset from scratch: each directed pair is allowed with
/// probability equal to its category affinity, then orphans are repaired.
fn regenerate_full<R: Rng + ?Sized>(tiles: &TileCatalogue, rng: &mut R) -> Ruleset {
    let mut rules = Ruleset::empty(tiles.len());
    for (a, a_def) in tiles.iter() {
        for (b, b_def) in tiles.iter() {
            for dir in CANONICAL_DIRECTIONS {
                if rng.random_bool(affinity(a_def.category, b_def.category)) {
                    rules.allow(a, dir, b);
                }
            }
        }
    }
    rules.repair_orphans();
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{SeedStream, stream_rng};
    use crate::tiles::Direction;

    fn rng(seed: u64) -> rand_chacha::ChaCha8Rng {
        stream_rng(seed, SeedStream::Rules, &[0])
    }

    #[test]
    fn test_none_returns_defaults() {
        let tiles = TileCatalogue::default();
        let defaults = default_ruleset(&tiles);
        let rules = randomize(&defaults, &tiles, RandomizationMode::None, 0.25, &mut rng(1));
        assert_eq!(rules, defaults);
    }

    #[test]
    fn test_partial_changes_bounded_fraction_without_orphans() {
        let tiles = TileCatalogue::default();
        let defaults = default_ruleset(&tiles);
        let total = defaults.entries().len();

        let mut changed_any = false;
        for seed in 0..20 {
            let rules =
                randomize(&defaults, &tiles, RandomizationMode::Partial, 0.25, &mut rng(seed));
            assert!(rules.orphans().is_empty(), "seed {seed} orphaned a tile");
            assert_eq!(rules.entries().len(), total, "swaps keep the entry count");

            let before = defaults.entries();
            let removed = before
                .iter()
                .filter(|e| !rules.is_allowed(e.tile, e.dir, e.neighbor))
                .count();
            assert!(removed <= total.div_ceil(4), "seed {seed} removed {removed}");
            changed_any |= removed > 0;
        }
        assert!(changed_any);
    }

    #[test]
    fn test_partial_swaps_within_category() {
        let tiles = TileCatalogue::default();
        let defaults = default_ruleset(&tiles);
        let rules = randomize(&defaults, &tiles, RandomizationMode::Partial, 1.0, &mut rng(3));

        for entry in rules.entries() {
            if defaults.is_allowed(entry.tile, entry.dir, entry.neighbor) {
                continue;
            }
            // Every new allowance replaced a removed one of the same category.
            let category = tiles.category(entry.neighbor);
            let replaced = tiles.iter().any(|(id, def)| {
                def.category == category
                    && defaults.is_allowed(entry.tile, entry.dir, id)
                    && !rules.is_allowed(entry.tile, entry.dir, id)
            });
            assert!(replaced, "{entry:?} appeared without a swap");
        }
    }

    #[test]
    fn test_zero_fraction_is_identity() {
        let tiles = TileCatalogue::default();
        let defaults = default_ruleset(&tiles);
        let rules = randomize(&defaults, &tiles, RandomizationMode::Partial, 0.0, &mut rng(5));
        assert_eq!(rules, defaults);
    }

    #[test]
    fn test_full_has_no_orphans_and_is_deterministic() {
        let tiles = TileCatalogue::default();
        let defaults = default_ruleset(&tiles);
        for seed in 0..20 {
            let a = randomize(&defaults, &tiles, RandomizationMode::Full, 0.25, &mut rng(seed));
            let b = randomize(&defaults, &tiles, RandomizationMode::Full, 0.25, &mut rng(seed));
            assert_eq!(a, b);
            assert!(a.orphans().is_empty());
            for tile in a.all_tiles().iter() {
                for dir in Direction::ALL {
                    assert!(!a.neighbors(tile, dir).is_empty());
                }
            }
        }
    }
}
