//! Run statistics reported alongside the world graph.

use serde::Serialize;
use strata_config::RandomizationMode;

use crate::resolve::ResolvedRun;
use crate::synth::SynthesisStatus;
use crate::world::{ConnectionKind, RoomId, World};

/// A room whose synthesis gave up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedRoom {
    pub room: RoomId,
    pub attempts: u32,
    pub reason: String,
}

/// Summary of one successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    /// Seed every stream derived from.
    pub seed: u64,
    /// Whether `seed` was drawn because the config asked for `0`.
    pub seed_was_derived: bool,
    pub randomization_mode: RandomizationMode,
    /// Biome seeds placed. Less than `biome_seeds_requested` when spacing
    /// crowded some out.
    pub biome_seeds: u32,
    pub biome_seeds_requested: u32,
    pub districts: u32,
    pub sectors: u32,
    pub rooms: u32,
    /// Undirected district edges.
    pub bidirectional_edges: u32,
    pub one_way_edges: u32,
    pub room_edges: u32,
    /// Candidate positions rejected while spacing biome seeds and districts.
    pub placement_rejections: u32,
    pub resolved_rooms: u32,
    pub unresolved_rooms: Vec<UnresolvedRoom>,
    /// Synthesis attempts over all rooms, successful or not.
    pub synthesis_attempts: u64,
}

impl RunStats {
    /// Count everything in a finished world.
    pub fn collect(
        run: &ResolvedRun,
        world: &World,
        biome_seeds: usize,
        placement_rejections: u32,
    ) -> Self {
        let mut bidirectional = 0u32;
        let mut one_way = 0u32;
        for district in &world.districts {
            for connection in &district.connections {
                match connection.kind {
                    // Mirrored pairs: count each from its lower id.
                    ConnectionKind::Bidirectional if district.id < connection.to => {
                        bidirectional += 1;
                    }
                    ConnectionKind::Bidirectional => {}
                    ConnectionKind::OneWay => one_way += 1,
                }
            }
        }

        let mut resolved_rooms = 0;
        let mut unresolved_rooms = Vec::new();
        let mut synthesis_attempts = 0u64;
        for room in &world.rooms {
            match &room.status {
                SynthesisStatus::Pending => {}
                SynthesisStatus::Resolved { attempts } => {
                    resolved_rooms += 1;
                    synthesis_attempts += u64::from(*attempts);
                }
                SynthesisStatus::Unresolved { attempts, reason } => {
                    synthesis_attempts += u64::from(*attempts);
                    unresolved_rooms.push(UnresolvedRoom {
                        room: room.id,
                        attempts: *attempts,
                        reason: reason.clone(),
                    });
                }
            }
        }

        Self {
            seed: run.seed,
            seed_was_derived: run.seed_was_derived,
            randomization_mode: run.config.randomization_mode,
            biome_seeds: biome_seeds as u32,
            biome_seeds_requested: run.biome_count,
            districts: world.districts.len() as u32,
            sectors: world.sectors.len() as u32,
            rooms: world.rooms.len() as u32,
            bidirectional_edges: bidirectional,
            one_way_edges: one_way,
            room_edges: world.sectors.iter().map(|s| s.room_edges.len() as u32).sum(),
            placement_rejections,
            resolved_rooms,
            unresolved_rooms,
            synthesis_attempts,
        }
    }
}
