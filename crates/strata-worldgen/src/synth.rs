//! Constraint-propagation tile synthesis (wave function collapse).
//!
//! Every cell starts as the set of tiles the room's biome can place. The
//! lowest-entropy cell is collapsed to one weighted pick, and the choice is
//! propagated to neighbors until the grid is resolved or some cell has no
//! candidates left. A contradiction restarts the room from scratch with the
//! next attempt's stream; once the retry budget is spent the room is filled
//! with a fallback tile and marked unresolved.

use serde::{Deserialize, Serialize};

use crate::error::Contradiction;
use crate::rules::Ruleset;
use crate::seed::{SeedStream, stream_rng, weighted_index};
use crate::tiles::{Direction, TileId, TileSet};

/// One cell of a [`TileGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileCell {
    /// Superposition of candidate tiles.
    Unresolved(TileSet),
    /// A single concrete tile.
    Resolved(TileId),
}

impl TileCell {
    pub fn tile(self) -> Option<TileId> {
        match self {
            TileCell::Resolved(tile) => Some(tile),
            TileCell::Unresolved(_) => None,
        }
    }
}

/// Row-major tile grid of one room.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileGrid {
    width: u32,
    height: u32,
    cells: Vec<TileCell>,
}

impl TileGrid {
    /// A grid where every cell is `tile`.
    pub fn uniform(width: u32, height: u32, tile: TileId) -> Self {
        Self {
            width,
            height,
            cells: vec![TileCell::Resolved(tile); (width * height) as usize],
        }
    }

    /// Snapshot of a wave; single-candidate cells become resolved.
    fn from_wave(width: u32, height: u32, wave: &[TileSet]) -> Self {
        let cells = wave
            .iter()
            .map(|set| match set.only() {
                Some(tile) => TileCell::Resolved(tile),
                None => TileCell::Unresolved(*set),
            })
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<TileCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get((y * self.width + x) as usize).copied()
    }

    /// Resolved tile at `(x, y)`.
    pub fn tile(&self, x: u32, y: u32) -> Option<TileId> {
        self.get(x, y).and_then(TileCell::tile)
    }

    pub fn cells(&self) -> &[TileCell] {
        &self.cells
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.cells.iter().all(|c| matches!(c, TileCell::Resolved(_)))
    }

    /// Whether the grid is fully resolved and every east and south neighbor
    /// pair is allowed by `rules`.
    pub fn satisfies(&self, rules: &Ruleset) -> bool {
        for y in 0..self.height {
            for x in 0..self.width {
                let Some(tile) = self.tile(x, y) else {
                    return false;
                };
                if let Some(east) = self.tile(x + 1, y)
                    && !rules.is_allowed(tile, Direction::East, east)
                {
                    return false;
                }
                if let Some(south) = self.tile(x, y + 1)
                    && !rules.is_allowed(tile, Direction::South, south)
                {
                    return false;
                }
            }
        }
        true
    }
}

/// Synthesis state of a room.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynthesisStatus {
    /// Not synthesized yet.
    #[default]
    Pending,
    /// Every cell resolved and compatible.
    Resolved {
        /// Attempts used, including the successful one.
        attempts: u32,
    },
    /// Retries ran out; the grid holds fallback content.
    Unresolved { attempts: u32, reason: String },
}

/// Output of [`Synthesizer::synthesize`].
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisOutcome {
    pub grid: TileGrid,
    pub status: SynthesisStatus,
}

impl SynthesisOutcome {
    /// Attempts spent on the room.
    pub fn attempts(&self) -> u32 {
        match &self.status {
            SynthesisStatus::Pending => 0,
            SynthesisStatus::Resolved { attempts } | SynthesisStatus::Unresolved { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Fills rooms of one shape under one ruleset and palette.
pub struct Synthesizer<'a> {
    rules: &'a Ruleset,
    /// Palette weight per tile id.
    weights: &'a [f64],
    width: u32,
    height: u32,
}

impl<'a> Synthesizer<'a> {
    pub fn new(rules: &'a Ruleset, weights: &'a [f64], width: u32, height: u32) -> Self {
        Self {
            rules,
            weights,
            width,
            height,
        }
    }

    /// Synthesize room `room_key`, retrying up to `max_attempts` times.
    ///
    /// Attempt `n` draws from the synthesis stream keyed by
    /// `[room_key, n]`, so the outcome only depends on the run seed, the key
    /// and the inputs of this synthesizer.
    pub fn synthesize(&self, run_seed: u64, room_key: u64, max_attempts: u32) -> SynthesisOutcome {
        let mut last = None;
        for attempt in 0..max_attempts {
            let mut rng = stream_rng(run_seed, SeedStream::Synthesis, &[room_key, u64::from(attempt)]);
            match self.attempt(&mut rng) {
                Ok(grid) => {
                    return SynthesisOutcome {
                        grid,
                        status: SynthesisStatus::Resolved {
                            attempts: attempt + 1,
                        },
                    };
                }
                Err(contradiction) => {
                    tracing::trace!(room = room_key, attempt, %contradiction, "Retrying room");
                    last = Some(contradiction);
                }
            }
        }

        let fallback = self.fallback_tile();
        let reason = match last {
            Some(c) => format!("{c} after {max_attempts} attempts"),
            None => "no synthesis attempts allowed".to_string(),
        };
        tracing::warn!(room = room_key, %reason, "Room left unresolved");

        SynthesisOutcome {
            grid: TileGrid::uniform(self.width, self.height, fallback),
            status: SynthesisStatus::Unresolved {
                attempts: max_attempts,
                reason,
            },
        }
    }

    /// One collapse from the initial state.
    ///
    /// # Errors
    ///
    /// The first cell whose candidate set becomes empty.
    pub fn attempt<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Result<TileGrid, Contradiction> {
        let mut wave = vec![self.initial_set(); (self.width * self.height) as usize];

        // Border cells have no outside neighbor to constrain them, but inner
        // cells may already lack support.
        let mut stack: Vec<usize> = (0..wave.len()).collect();
        self.propagate(&mut wave, &mut stack)?;

        while let Some(index) = lowest_entropy(&wave) {
            let candidates: Vec<TileId> = wave[index].iter().collect();
            let weights: Vec<f64> = candidates.iter().map(|t| self.weight(*t)).collect();
            let pick = weighted_index(rng, &weights).unwrap_or(0);

            wave[index] = TileSet::single(candidates[pick]);
            stack.push(index);
            self.propagate(&mut wave, &mut stack)?;
        }

        Ok(TileGrid::from_wave(self.width, self.height, &wave))
    }

    /// Tiles with positive palette weight, or every tile if none has one.
    fn initial_set(&self) -> TileSet {
        let all = self.rules.all_tiles();
        let weighted: TileSet = all.iter().filter(|t| self.weight(*t) > 0.0).collect();
        if weighted.is_empty() { all } else { weighted }
    }

    /// Self-compatible palette tile, else any self-compatible tile, else
    /// tile 0.
    fn fallback_tile(&self) -> TileId {
        self.initial_set()
            .iter()
            .find(|&t| Direction::ALL.iter().all(|&d| self.rules.is_allowed(t, d, t)))
            .or_else(|| self.rules.fallback_tile())
            .unwrap_or(TileId(0))
    }

    fn weight(&self, tile: TileId) -> f64 {
        self.weights.get(usize::from(tile.0)).copied().unwrap_or(0.0)
    }

    fn neighbor(&self, index: usize, dir: Direction) -> Option<usize> {
        let x = (index % self.width as usize) as i64;
        let y = (index / self.width as usize) as i64;
        let (dx, dy) = dir.offset();
        let (nx, ny) = (x + i64::from(dx), y + i64::from(dy));
        if nx < 0 || ny < 0 || nx >= i64::from(self.width) || ny >= i64::from(self.height) {
            return None;
        }
        Some((ny * i64::from(self.width) + nx) as usize)
    }

    fn propagate(&self, wave: &mut [TileSet], stack: &mut Vec<usize>) -> Result<(), Contradiction> {
        while let Some(index) = stack.pop() {
            for dir in Direction::ALL {
                let Some(n) = self.neighbor(index, dir) else {
                    continue;
                };
                let narrowed = wave[n].intersect(self.rules.support(wave[index], dir));
                if narrowed == wave[n] {
                    continue;
                }
                if narrowed.is_empty() {
                    return Err(Contradiction {
                        x: n as u32 % self.width,
                        y: n as u32 / self.width,
                    });
                }
                wave[n] = narrowed;
                stack.push(n);
            }
        }
        Ok(())
    }
}

/// Unresolved cell with the fewest candidates; the first in row-major order
/// wins ties.
fn lowest_entropy(wave: &[TileSet]) -> Option<usize> {
    let mut best: Option<(u32, usize)> = None;
    for (index, set) in wave.iter().enumerate() {
        let count = set.len();
        if count > 1 && best.is_none_or(|(c, _)| count < c) {
            best = Some((count, index));
        }
    }
    best.map(|(_, index)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::default_ruleset;
    use crate::tiles::TileCatalogue;

    fn uniform_weights(n: usize) -> Vec<f64> {
        vec![1.0; n]
    }

    #[test]
    fn test_default_rules_resolve_compatibly() {
        let tiles = TileCatalogue::default();
        let rules = default_ruleset(&tiles);
        let weights = uniform_weights(tiles.len());
        let synth = Synthesizer::new(&rules, &weights, 12, 8);

        for room in 0..10 {
            let outcome = synth.synthesize(42, room, 8);
            if let SynthesisStatus::Resolved { .. } = outcome.status {
                assert!(outcome.grid.is_fully_resolved());
                assert!(outcome.grid.satisfies(&rules), "room {room} broke adjacency");
            }
            assert_eq!(outcome.grid.width(), 12);
            assert_eq!(outcome.grid.height(), 8);
        }
    }

    #[test]
    fn test_synthesis_deterministic() {
        let tiles = TileCatalogue::default();
        let rules = default_ruleset(&tiles);
        let weights = uniform_weights(tiles.len());
        let synth = Synthesizer::new(&rules, &weights, 10, 10);
        assert_eq!(synth.synthesize(7, 3, 8), synth.synthesize(7, 3, 8));
    }

    #[test]
    fn test_palette_restricts_candidates() {
        let tiles = TileCatalogue::default();
        let rules = default_ruleset(&tiles);
        let mut weights = vec![0.0; tiles.len()];
        let floor = tiles.lookup_by_name("floor").unwrap();
        let wall = tiles.lookup_by_name("wall").unwrap();
        weights[usize::from(floor.0)] = 1.0;
        weights[usize::from(wall.0)] = 1.0;

        let outcome = Synthesizer::new(&rules, &weights, 6, 6).synthesize(1, 0, 4);
        assert_eq!(outcome.status, SynthesisStatus::Resolved { attempts: 1 });
        assert!(
            outcome
                .grid
                .cells()
                .iter()
                .all(|c| matches!(c.tile(), Some(t) if t == floor || t == wall))
        );
    }

    fn vertical_only_rules() -> Ruleset {
        // Tiles may only stack vertically; nothing is allowed side by side.
        let mut rules = Ruleset::empty(2);
        rules.allow(TileId(0), Direction::North, TileId(0));
        rules.allow(TileId(1), Direction::North, TileId(1));
        rules
    }

    #[test]
    fn test_contradiction_degrades_to_fallback() {
        let rules = vertical_only_rules();
        let weights = uniform_weights(2);
        let outcome = Synthesizer::new(&rules, &weights, 3, 2).synthesize(5, 9, 4);

        match &outcome.status {
            SynthesisStatus::Unresolved { attempts, reason } => {
                assert_eq!(*attempts, 4);
                assert!(reason.contains("contradiction at cell"), "{reason}");
                assert!(reason.ends_with("after 4 attempts"), "{reason}");
            }
            other => panic!("expected unresolved, got {other:?}"),
        }
        assert_eq!(outcome.attempts(), 4);
        assert_eq!(outcome.grid, TileGrid::uniform(3, 2, TileId(0)));
    }

    #[test]
    fn test_fallback_prefers_palette_tile() {
        let mut rules = Ruleset::empty(3);
        for tile in [TileId(0), TileId(2)] {
            for dir in Direction::ALL {
                rules.allow(tile, dir, tile);
            }
        }
        assert_eq!(rules.fallback_tile(), Some(TileId(0)));

        let weights = [0.0, 1.0, 2.0];
        let outcome = Synthesizer::new(&rules, &weights, 4, 3).synthesize(1, 0, 0);
        assert!(matches!(outcome.status, SynthesisStatus::Unresolved { attempts: 0, .. }));
        assert_eq!(outcome.grid, TileGrid::uniform(4, 3, TileId(2)));
    }

    #[test]
    fn test_single_column_has_no_horizontal_constraint() {
        let rules = vertical_only_rules();
        let weights = uniform_weights(2);
        let outcome = Synthesizer::new(&rules, &weights, 1, 5).synthesize(5, 0, 1);
        assert_eq!(outcome.status, SynthesisStatus::Resolved { attempts: 1 });
        let first = outcome.grid.tile(0, 0).unwrap();
        assert!((0..5).all(|y| outcome.grid.tile(0, y) == Some(first)));
    }

    #[test]
    fn test_lowest_entropy_ties_take_first() {
        let wave = [
            TileSet::single(TileId(0)),
            TileSet(0b110),
            TileSet(0b011),
            TileSet(0b111),
        ];
        assert_eq!(lowest_entropy(&wave), Some(1));
        assert_eq!(lowest_entropy(&wave[..1]), None);
    }

    #[test]
    fn test_grid_accessors() {
        let grid = TileGrid::uniform(2, 3, TileId(4));
        assert_eq!(grid.tile(1, 2), Some(TileId(4)));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 3), None);
        assert!(grid.is_fully_resolved());
    }
}
