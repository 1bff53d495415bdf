//! Tile adjacency rules.
//!
//! A [`Ruleset`] records, per tile and direction, which tiles may sit on
//! that side. Every change is applied to both ends of the pair, so
//! `b` east of `a` is allowed exactly when `a` west of `b` is.

mod randomize;

pub use randomize::{Rulebook, randomize};

use serde::{Deserialize, Serialize};

use crate::tiles::{Direction, TileCatalogue, TileId, TileSet, compatible_by_default};

/// Directions whose entries are stored canonically; the other two are
/// their mirrors.
pub const CANONICAL_DIRECTIONS: [Direction; 2] = [Direction::North, Direction::East];

/// Directed adjacency fact: `neighbor` may sit on side `dir` of `tile`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleEntry {
    pub tile: TileId,
    pub dir: Direction,
    pub neighbor: TileId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ruleset {
    /// `allowed[tile][dir]` is the set of tiles permitted on side `dir`.
    allowed: Vec<[TileSet; 4]>,
}

impl Ruleset {
    /// A ruleset over `tile_count` tiles with nothing allowed.
    pub fn empty(tile_count: usize) -> Self {
        Self {
            allowed: vec![[TileSet::EMPTY; 4]; tile_count],
        }
    }

    pub fn tile_count(&self) -> usize {
        self.allowed.len()
    }

    /// Every tile this ruleset covers.
    pub fn all_tiles(&self) -> TileSet {
        TileSet::first_n(self.allowed.len())
    }

    pub fn allow(&mut self, tile: TileId, dir: Direction, neighbor: TileId) {
        self.allowed[usize::from(tile.0)][dir.index()].insert(neighbor);
        self.allowed[usize::from(neighbor.0)][dir.opposite().index()].insert(tile);
    }

    pub fn forbid(&mut self, tile: TileId, dir: Direction, neighbor: TileId) {
        self.allowed[usize::from(tile.0)][dir.index()].remove(neighbor);
        self.allowed[usize::from(neighbor.0)][dir.opposite().index()].remove(tile);
    }

    pub fn is_allowed(&self, tile: TileId, dir: Direction, neighbor: TileId) -> bool {
        self.neighbors(tile, dir).contains(neighbor)
    }

    /// Tiles allowed on side `dir` of `tile`.
    pub fn neighbors(&self, tile: TileId, dir: Direction) -> TileSet {
        self.allowed
            .get(usize::from(tile.0))
            .map_or(TileSet::EMPTY, |sides| sides[dir.index()])
    }

    /// Tiles that may sit on side `dir` of at least one member of `set`.
    pub fn support(&self, set: TileSet, dir: Direction) -> TileSet {
        set.iter()
            .fold(TileSet::EMPTY, |acc, t| acc.union(self.neighbors(t, dir)))
    }

    /// Tiles with no allowed neighbor in at least one direction.
    pub fn orphans(&self) -> Vec<TileId> {
        self.all_tiles()
            .iter()
            .filter(|&t| Direction::ALL.iter().any(|&d| self.neighbors(t, d).is_empty()))
            .collect()
    }

    /// Give every orphaned side a self-adjacency so no tile is unplaceable.
    pub fn repair_orphans(&mut self) {
        for tile in self.all_tiles().iter() {
            for dir in Direction::ALL {
                if self.neighbors(tile, dir).is_empty() {
                    self.allow(tile, dir, tile);
                }
            }
        }
    }

    /// First tile that may border itself on every side. A grid filled with it
    /// satisfies the ruleset.
    pub fn fallback_tile(&self) -> Option<TileId> {
        self.all_tiles()
            .iter()
            .find(|&t| Direction::ALL.iter().all(|&d| self.is_allowed(t, d, t)))
    }

    /// Allowed entries in canonical directions, ordered by tile, direction,
    /// neighbor.
    pub fn entries(&self) -> Vec<RuleEntry> {
        let mut entries = Vec::new();
        for tile in self.all_tiles().iter() {
            for dir in CANONICAL_DIRECTIONS {
                for neighbor in self.neighbors(tile, dir).iter() {
                    entries.push(RuleEntry {
                        tile,
                        dir,
                        neighbor,
                    });
                }
            }
        }
        entries
    }
}

/// The default ruleset: tile pairs that are [`compatible_by_default`] may
/// touch in every direction.
pub fn default_ruleset(tiles: &TileCatalogue) -> Ruleset {
    let mut rules = Ruleset::empty(tiles.len());
    for (a, a_def) in tiles.iter() {
        for (b, b_def) in tiles.iter() {
            if compatible_by_default(a_def, b_def) {
                for dir in Direction::ALL {
                    rules.allow(a, dir, b);
                }
            }
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_is_mirrored() {
        let mut rules = Ruleset::empty(3);
        rules.allow(TileId(0), Direction::East, TileId(2));
        assert!(rules.is_allowed(TileId(2), Direction::West, TileId(0)));
        assert!(!rules.is_allowed(TileId(0), Direction::West, TileId(2)));

        rules.forbid(TileId(2), Direction::West, TileId(0));
        assert!(!rules.is_allowed(TileId(0), Direction::East, TileId(2)));
    }

    #[test]
    fn test_default_ruleset_has_no_orphans() {
        let tiles = TileCatalogue::default();
        let rules = default_ruleset(&tiles);
        assert!(rules.orphans().is_empty());
        assert_eq!(rules.fallback_tile(), Some(TileId(0)));
    }

    #[test]
    fn test_default_ruleset_follows_affinity() {
        let tiles = TileCatalogue::default();
        let rules = default_ruleset(&tiles);
        let water = tiles.lookup_by_name("water").unwrap();
        let wall = tiles.lookup_by_name("wall").unwrap();
        let floor = tiles.lookup_by_name("floor").unwrap();
        assert!(!rules.is_allowed(water, Direction::North, wall));
        assert!(rules.is_allowed(water, Direction::North, floor));
    }

    #[test]
    fn test_repair_orphans() {
        let mut rules = Ruleset::empty(2);
        rules.allow(TileId(0), Direction::East, TileId(1));
        assert_eq!(rules.orphans(), vec![TileId(0), TileId(1)]);

        rules.repair_orphans();
        assert!(rules.orphans().is_empty());
        assert!(rules.is_allowed(TileId(0), Direction::North, TileId(0)));
    }

    #[test]
    fn test_support_unions_neighbors() {
        let mut rules = Ruleset::empty(4);
        rules.allow(TileId(0), Direction::South, TileId(1));
        rules.allow(TileId(2), Direction::South, TileId(3));
        let set: TileSet = [TileId(0), TileId(2)].into_iter().collect();
        let support = rules.support(set, Direction::South);
        assert_eq!(support.iter().collect::<Vec<_>>(), vec![TileId(1), TileId(3)]);
    }

    #[test]
    fn test_entries_are_canonical() {
        let mut rules = Ruleset::empty(2);
        rules.allow(TileId(1), Direction::South, TileId(0));
        // Listed from the mirrored side: tile 1 to the north of tile 0.
        assert_eq!(
            rules.entries(),
            vec![RuleEntry {
                tile: TileId(0),
                dir: Direction::North,
                neighbor: TileId(1),
            }]
        );
    }
}
