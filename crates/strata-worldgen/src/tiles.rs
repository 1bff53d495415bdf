//! Tile catalogue, tile categories, grid directions and compact tile sets.

use serde::{Deserialize, Serialize};

/// Index of a tile type in the [`TileCatalogue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u8);

/// Largest catalogue a [`TileSet`] can represent.
pub const MAX_TILES: usize = 64;

/// Broad tile families; rule mutations swap only within a category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileCategory {
    Ground,
    Wall,
    Liquid,
    Hazard,
    Decor,
}

impl TileCategory {
    /// All categories in affinity-table order.
    pub const ALL: [TileCategory; 5] = [
        TileCategory::Ground,
        TileCategory::Wall,
        TileCategory::Liquid,
        TileCategory::Hazard,
        TileCategory::Decor,
    ];

    /// Row/column in [`CATEGORY_AFFINITY`].
    pub fn index(self) -> usize {
        match self {
            TileCategory::Ground => 0,
            TileCategory::Wall => 1,
            TileCategory::Liquid => 2,
            TileCategory::Hazard => 3,
            TileCategory::Decor => 4,
        }
    }
}

/// Symmetric likelihood that tiles of two categories sit side by side.
///
/// Default rules allow a pair when its affinity reaches both tiles'
/// [`TileDef::min_affinity`]; full randomization uses the values as
/// probabilities.
pub const CATEGORY_AFFINITY: [[f64; 5]; 5] = [
    // Ground Wall  Liquid Hazard Decor
    [1.0, 0.8, 0.6, 0.5, 0.7], // Ground
    [0.8, 1.0, 0.2, 0.3, 0.6], // Wall
    [0.6, 0.2, 1.0, 0.4, 0.3], // Liquid
    [0.5, 0.3, 0.4, 0.9, 0.2], // Hazard
    [0.7, 0.6, 0.3, 0.2, 0.8], // Decor
];

/// Minimum affinity accepted by ordinary tiles.
pub const DEFAULT_AFFINITY_THRESHOLD: f64 = 0.5;

/// Minimum affinity accepted by variant tiles, which border fewer kinds.
pub const VARIANT_AFFINITY_THRESHOLD: f64 = 0.7;

/// Affinity between two categories.
pub fn affinity(a: TileCategory, b: TileCategory) -> f64 {
    CATEGORY_AFFINITY[a.index()][b.index()]
}

/// Whether the default rules let `a` and `b` touch.
pub fn compatible_by_default(a: &TileDef, b: &TileDef) -> bool {
    affinity(a.category, b.category) >= a.min_affinity.max(b.min_affinity)
}

/// One of the four grid-adjacent directions. `North` is `-y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions, in index order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Index into per-direction arrays.
    pub fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    /// The direction pointing back.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Grid offset `(dx, dy)`.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// A set of tile ids packed into a bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileSet(pub u64);

impl TileSet {
    /// The empty set.
    pub const EMPTY: TileSet = TileSet(0);

    /// A set holding one tile.
    pub fn single(tile: TileId) -> Self {
        TileSet(1u64 << tile.0)
    }

    /// Every tile id below `count`.
    pub fn first_n(count: usize) -> Self {
        if count >= MAX_TILES {
            TileSet(u64::MAX)
        } else {
            TileSet((1u64 << count) - 1)
        }
    }

    pub fn contains(self, tile: TileId) -> bool {
        self.0 & (1u64 << tile.0) != 0
    }

    pub fn insert(&mut self, tile: TileId) {
        self.0 |= 1u64 << tile.0;
    }

    pub fn remove(&mut self, tile: TileId) {
        self.0 &= !(1u64 << tile.0);
    }

    pub fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: TileSet) -> TileSet {
        TileSet(self.0 | other.0)
    }

    pub fn intersect(self, other: TileSet) -> TileSet {
        TileSet(self.0 & other.0)
    }

    /// The single member, if there is exactly one.
    pub fn only(self) -> Option<TileId> {
        (self.len() == 1).then(|| TileId(self.0.trailing_zeros() as u8))
    }

    /// Members in ascending id order.
    pub fn iter(self) -> impl Iterator<Item = TileId> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let tile = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(TileId(tile))
        })
    }
}

impl FromIterator<TileId> for TileSet {
    fn from_iter<I: IntoIterator<Item = TileId>>(iter: I) -> Self {
        let mut set = TileSet::EMPTY;
        for tile in iter {
            set.insert(tile);
        }
        set
    }
}

/// Descriptor for one tile type.
#[derive(Clone, Debug, PartialEq)]
pub struct TileDef {
    /// Human-readable tile name.
    pub name: String,
    /// Character used in text dumps.
    pub glyph: char,
    /// Family used by rule generation and mutation.
    pub category: TileCategory,
    /// Lowest category affinity this tile accepts in the default rules.
    pub min_affinity: f64,
}

/// All tile types known to a run, indexed by [`TileId`].
#[derive(Clone, Debug, PartialEq)]
pub struct TileCatalogue {
    tiles: Vec<TileDef>,
}

impl TileCatalogue {
    /// Build a catalogue, truncated to [`MAX_TILES`] entries.
    pub fn new(mut tiles: Vec<TileDef>) -> Self {
        tiles.truncate(MAX_TILES);
        Self { tiles }
    }

    /// Returns the definition for the given tile.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn get(&self, id: TileId) -> &TileDef {
        &self.tiles[usize::from(id.0)]
    }

    /// Category of a tile.
    pub fn category(&self, id: TileId) -> TileCategory {
        self.get(id).category
    }

    /// Looks up a tile id by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<TileId> {
        self.tiles
            .iter()
            .position(|t| t.name == name)
            .map(|i| TileId(i as u8))
    }

    /// All ids with their definitions.
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &TileDef)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, def)| (TileId(i as u8), def))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl Default for TileCatalogue {
    fn default() -> Self {
        let def = |name: &str, glyph, category, min_affinity| TileDef {
            name: name.to_string(),
            glyph,
            category,
            min_affinity,
        };
        let base = DEFAULT_AFFINITY_THRESHOLD;
        let variant = VARIANT_AFFINITY_THRESHOLD;
        Self::new(vec![
            def("floor", '.', TileCategory::Ground, base),
            def("rubble", ',', TileCategory::Ground, variant),
            def("wall", '#', TileCategory::Wall, base),
            def("pillar", 'I', TileCategory::Wall, variant),
            def("water", '~', TileCategory::Liquid, base),
            def("sludge", '%', TileCategory::Liquid, variant),
            def("spikes", '^', TileCategory::Hazard, base),
            def("embers", '*', TileCategory::Hazard, variant),
            def("moss", '"', TileCategory::Decor, base),
            def("vines", '&', TileCategory::Decor, variant),
        ])
    }
}
