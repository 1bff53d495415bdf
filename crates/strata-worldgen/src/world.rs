//! The generated world graph.
//!
//! Districts, sectors and rooms live in flat tables indexed by their ids.
//! Ownership runs one way (district -> sector -> room, by id lists); the
//! district and room graphs are edge lists keyed by id.

use std::collections::VecDeque;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::biome::{BiomeId, BiomeSample};
use crate::synth::{SynthesisStatus, TileGrid};

/// Index into [`World::districts`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DistrictId(pub u32);

/// Index into [`World::sectors`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectorId(pub u32);

/// Index into [`World::rooms`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomId(pub u32);

/// Index into the configured polarity tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polarity(pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// Traversable only from the owning district to `to`.
    OneWay,
    /// Mirrored by an identical connection on the other district.
    Bidirectional,
}

/// An outgoing edge of a district.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub to: DistrictId,
    pub kind: ConnectionKind,
    /// Gate a traveller must satisfy, if any.
    pub required_polarity: Option<Polarity>,
    /// Traversal cost, always at least [`MIN_TRAVERSAL_COST`].
    pub cost: f64,
}

/// Floor applied to every traversal cost.
pub const MIN_TRAVERSAL_COST: f64 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: DistrictId,
    pub position: DVec2,
    /// Dominant biome (the field's primary biome at `position`).
    pub biome: BiomeId,
    /// Full field sample at `position`.
    pub biome_sample: BiomeSample,
    pub connections: Vec<Connection>,
    pub sectors: Vec<SectorId>,
}

/// Cell coordinate inside a local grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: u32,
    pub y: u32,
}

impl GridCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Whether the two cells share a side.
    pub fn is_adjacent(self, other: GridCoord) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }

    pub fn distance(self, other: GridCoord) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

/// Undirected edge between two rooms of one sector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomEdge {
    pub a: RoomId,
    pub b: RoomId,
    /// Distance between the rooms' local coordinates.
    pub length: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub district: DistrictId,
    /// Cell in the district's sector grid.
    pub coord: GridCoord,
    /// World position of the cell's centre.
    pub world_position: DVec2,
    pub rooms: Vec<RoomId>,
    pub room_edges: Vec<RoomEdge>,
}

impl Sector {
    /// Rooms sharing an edge with `room`, in edge order.
    pub fn room_neighbors(&self, room: RoomId) -> impl Iterator<Item = RoomId> + '_ {
        self.room_edges.iter().filter_map(move |e| {
            if e.a == room {
                Some(e.b)
            } else if e.b == room {
                Some(e.a)
            } else {
                None
            }
        })
    }

    /// Whether every room can reach every other through `room_edges`.
    pub fn is_room_graph_connected(&self) -> bool {
        let Some(&start) = self.rooms.first() else {
            return true;
        };
        let mut seen = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(room) = queue.pop_front() {
            for next in self.room_neighbors(room) {
                if !seen.contains(&next) {
                    seen.push(next);
                    queue.push_back(next);
                }
            }
        }
        seen.len() == self.rooms.len()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub sector: SectorId,
    /// Cell in the sector's room grid.
    pub coord: GridCoord,
    /// Biome whose rules and palette fill this room.
    pub biome: BiomeId,
    /// Populated by synthesis.
    pub tiles: Option<TileGrid>,
    pub status: SynthesisStatus,
}

/// The complete world graph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub districts: Vec<District>,
    pub sectors: Vec<Sector>,
    pub rooms: Vec<Room>,
}

impl World {
    pub fn district(&self, id: DistrictId) -> Option<&District> {
        self.districts.get(id.0 as usize)
    }

    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.get(id.0 as usize)
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(id.0 as usize)
    }

    /// Districts reachable from `start` along outgoing connections,
    /// including `start`, in breadth-first order.
    pub fn district_reachable_from(&self, start: DistrictId) -> Vec<DistrictId> {
        reachable(&self.districts, start, false)
    }

    /// Whether every district can reach, and be reached from, every other.
    pub fn is_district_graph_connected(&self) -> bool {
        unreachable_districts(&self.districts).is_empty()
    }

    /// All rooms owned by `district`, in sector order.
    pub fn rooms_of_district(&self, district: DistrictId) -> Vec<RoomId> {
        self.district(district)
            .map(|d| {
                d.sectors
                    .iter()
                    .filter_map(|s| self.sector(*s))
                    .flat_map(|s| s.rooms.iter().copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// District owning `room`.
    pub fn district_of_room(&self, room: RoomId) -> Option<DistrictId> {
        let room = self.room(room)?;
        Some(self.sector(room.sector)?.district)
    }
}

/// Breadth-first reachability over district connections, optionally along
/// reversed edges.
fn reachable(districts: &[District], start: DistrictId, reverse: bool) -> Vec<DistrictId> {
    if start.0 as usize >= districts.len() {
        return Vec::new();
    }

    let mut incoming: Vec<Vec<DistrictId>> = vec![Vec::new(); districts.len()];
    if reverse {
        for d in districts {
            for c in &d.connections {
                if let Some(list) = incoming.get_mut(c.to.0 as usize) {
                    list.push(d.id);
                }
            }
        }
    }

    let mut seen = vec![false; districts.len()];
    let mut order = vec![start];
    let mut queue = VecDeque::from([start]);
    seen[start.0 as usize] = true;

    while let Some(current) = queue.pop_front() {
        let next: Vec<DistrictId> = if reverse {
            incoming[current.0 as usize].clone()
        } else {
            districts[current.0 as usize]
                .connections
                .iter()
                .map(|c| c.to)
                .collect()
        };
        for n in next {
            if let Some(slot) = seen.get_mut(n.0 as usize)
                && !*slot
            {
                *slot = true;
                order.push(n);
                queue.push_back(n);
            }
        }
    }
    order
}

/// Districts not mutually reachable with district 0, ascending.
pub(crate) fn unreachable_districts(districts: &[District]) -> Vec<DistrictId> {
    if districts.is_empty() {
        return Vec::new();
    }
    let forward = reachable(districts, DistrictId(0), false);
    let backward = reachable(districts, DistrictId(0), true);
    districts
        .iter()
        .map(|d| d.id)
        .filter(|id| !forward.contains(id) || !backward.contains(id))
        .collect()
}
