//! Sector and room hierarchy.
//!
//! Each district is subdivided independently: [`plan_district`] only reads
//! the run and the district's own position, so districts can be planned on
//! any thread. [`assemble`] then hands out global ids in district order.

use glam::DVec2;
use rand::Rng;
use rustc_hash::FxHashSet;

use crate::error::{GenerationError, PlacementStage};
use crate::graph::{Edge, complete_graph, kruskal_mst};
use crate::resolve::{ResolvedRun, draw};
use crate::seed::{SeedStream, stream_rng};
use crate::synth::SynthesisStatus;
use crate::tiles::Direction;
use crate::world::{
    District, DistrictId, GridCoord, Room, RoomEdge, RoomId, Sector, SectorId, World,
};

/// Edge between two rooms of one sector, by index into [`SectorPlan::rooms`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalEdge {
    pub a: usize,
    pub b: usize,
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorPlan {
    pub coord: GridCoord,
    pub world_position: DVec2,
    pub rooms: Vec<GridCoord>,
    pub edges: Vec<LocalEdge>,
}

/// Sectors and rooms for one district, before global ids exist.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictPlan {
    pub sectors: Vec<SectorPlan>,
}

/// Subdivide one district into sectors and each sector into rooms.
///
/// # Errors
///
/// [`GenerationError::PlacementExhausted`] when a grid cannot hold the
/// drawn count.
pub fn plan_district(
    run: &ResolvedRun,
    district: DistrictId,
    position: DVec2,
) -> Result<DistrictPlan, GenerationError> {
    let config = &run.config;
    let mut rng = stream_rng(run.seed, SeedStream::Sectors, &[u64::from(district.0)]);

    let sector_count = draw(&mut rng, config.sectors_per_district);
    let sector_cells = select_clustered(
        &mut rng,
        config.sector_grid_size,
        sector_count,
        || PlacementStage::Sectors {
            district,
            grid_size: config.sector_grid_size,
        },
    )?;

    let half_grid = f64::from(config.sector_grid_size) / 2.0;
    let mut sectors = Vec::with_capacity(sector_cells.len());

    for (index, coord) in sector_cells.into_iter().enumerate() {
        let sector_index = index as u32;
        let mut room_rng = stream_rng(
            run.seed,
            SeedStream::Rooms,
            &[u64::from(district.0), u64::from(sector_index)],
        );
        let room_count = draw(&mut room_rng, config.rooms_per_sector);
        let rooms = select_clustered(
            &mut room_rng,
            config.room_grid_size,
            room_count,
            || PlacementStage::Rooms {
                district,
                sector_index,
                grid_size: config.room_grid_size,
            },
        )?;
        let edges = connect_rooms(&rooms, config.target_loop_density);

        let offset = DVec2::new(f64::from(coord.x) + 0.5, f64::from(coord.y) + 0.5)
            - DVec2::splat(half_grid);
        sectors.push(SectorPlan {
            coord,
            world_position: position + offset * run.sector_cell_size,
            rooms,
            edges,
        });
    }

    tracing::debug!(
        district = district.0,
        sectors = sectors.len(),
        rooms = sectors.iter().map(|s| s.rooms.len()).sum::<usize>(),
        "District subdivided"
    );
    Ok(DistrictPlan { sectors })
}

/// Pick `count` distinct cells of a `grid_size` square grid, each after the
/// first sharing a side with an earlier one.
///
/// The next cell is drawn from the free cells bordering the chosen ones, in
/// row-major order, so the cluster only fails to grow when the grid is full.
fn select_clustered<R: Rng + ?Sized>(
    rng: &mut R,
    grid_size: u32,
    count: u32,
    stage: impl Fn() -> PlacementStage,
) -> Result<Vec<GridCoord>, GenerationError> {
    let exhausted = |placed: usize| GenerationError::PlacementExhausted {
        stage: stage(),
        placed: placed as u32,
        requested: count,
        attempts: 0,
    };

    if u64::from(count) > u64::from(grid_size) * u64::from(grid_size) {
        return Err(exhausted(0));
    }

    let mut chosen: Vec<GridCoord> = Vec::with_capacity(count as usize);
    if count == 0 {
        return Ok(chosen);
    }
    let first = GridCoord::new(rng.random_range(0..grid_size), rng.random_range(0..grid_size));
    let mut taken = FxHashSet::default();
    taken.insert(first);
    chosen.push(first);

    while chosen.len() < count as usize {
        let mut frontier: Vec<GridCoord> = chosen
            .iter()
            .flat_map(|&cell| grid_neighbors(cell, grid_size))
            .filter(|cell| !taken.contains(cell))
            .collect();
        frontier.sort_unstable_by_key(|c| (c.y, c.x));
        frontier.dedup();

        if frontier.is_empty() {
            return Err(exhausted(chosen.len()));
        }
        let cell = frontier[rng.random_range(0..frontier.len())];
        taken.insert(cell);
        chosen.push(cell);
    }
    Ok(chosen)
}

/// In-bounds cells sharing a side with `cell`.
fn grid_neighbors(cell: GridCoord, grid_size: u32) -> impl Iterator<Item = GridCoord> {
    let size = i64::from(grid_size);
    Direction::ALL.into_iter().filter_map(move |dir| {
        let (dx, dy) = dir.offset();
        let x = i64::from(cell.x) + i64::from(dx);
        let y = i64::from(cell.y) + i64::from(dy);
        (x >= 0 && y >= 0 && x < size && y < size).then(|| GridCoord::new(x as u32, y as u32))
    })
}

/// Spanning tree over the room cells plus `floor(density * rooms)` extra
/// edges, shortest first.
fn connect_rooms(rooms: &[GridCoord], density: f64) -> Vec<LocalEdge> {
    let points: Vec<DVec2> = rooms
        .iter()
        .map(|c| DVec2::new(f64::from(c.x), f64::from(c.y)))
        .collect();
    let edges = complete_graph(&points);
    let in_tree = kruskal_mst(&edges, points.len());
    let extra_budget = (density * rooms.len() as f64).floor() as usize;

    let as_local = |e: &Edge| LocalEdge {
        a: e.from,
        b: e.to,
        length: e.weight,
    };

    let tree = edges.iter().zip(&in_tree).filter(|(_, t)| **t);
    let extras = edges
        .iter()
        .zip(&in_tree)
        .filter(|(_, t)| !**t)
        .take(extra_budget);

    tree.chain(extras).map(|(e, _)| as_local(e)).collect()
}

/// Turn per-district plans into the world tables, numbering sectors and
/// rooms globally in district order.
pub fn assemble(mut districts: Vec<District>, plans: Vec<DistrictPlan>) -> World {
    let mut sectors = Vec::new();
    let mut rooms = Vec::new();

    for (district, plan) in districts.iter_mut().zip(plans) {
        for sector_plan in plan.sectors {
            let sector_id = SectorId(sectors.len() as u32);
            let first_room = rooms.len() as u32;

            let room_ids: Vec<RoomId> = sector_plan
                .rooms
                .iter()
                .enumerate()
                .map(|(i, &coord)| {
                    let id = RoomId(first_room + i as u32);
                    rooms.push(Room {
                        id,
                        sector: sector_id,
                        coord,
                        biome: district.biome,
                        tiles: None,
                        status: SynthesisStatus::Pending,
                    });
                    id
                })
                .collect();

            let room_edges = sector_plan
                .edges
                .iter()
                .map(|e| RoomEdge {
                    a: room_ids[e.a],
                    b: room_ids[e.b],
                    length: e.length,
                })
                .collect();

            district.sectors.push(sector_id);
            sectors.push(Sector {
                id: sector_id,
                district: district.id,
                coord: sector_plan.coord,
                world_position: sector_plan.world_position,
                rooms: room_ids,
                room_edges,
            });
        }
    }

    World {
        districts,
        sectors,
        rooms,
    }
}
