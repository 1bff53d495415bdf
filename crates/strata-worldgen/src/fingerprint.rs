//! Stable digest of a generated world, for determinism checks.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::DVec2;

use crate::world::World;

/// Hash positions, graphs, tile grids and statuses of `world`.
///
/// Floats are hashed by bit pattern, so two worlds share a fingerprint only
/// if they are bit-identical.
pub fn world_fingerprint(world: &World) -> u64 {
    let mut h = DefaultHasher::new();

    for d in &world.districts {
        d.id.hash(&mut h);
        hash_vec(&mut h, d.position);
        d.biome.hash(&mut h);
        d.biome_sample.secondary.hash(&mut h);
        d.biome_sample.blend.to_bits().hash(&mut h);
        for c in &d.connections {
            c.to.hash(&mut h);
            c.kind.hash(&mut h);
            c.required_polarity.hash(&mut h);
            c.cost.to_bits().hash(&mut h);
        }
        d.sectors.hash(&mut h);
    }

    for s in &world.sectors {
        s.id.hash(&mut h);
        s.district.hash(&mut h);
        s.coord.hash(&mut h);
        hash_vec(&mut h, s.world_position);
        s.rooms.hash(&mut h);
        for e in &s.room_edges {
            e.a.hash(&mut h);
            e.b.hash(&mut h);
            e.length.to_bits().hash(&mut h);
        }
    }

    for r in &world.rooms {
        r.id.hash(&mut h);
        r.sector.hash(&mut h);
        r.coord.hash(&mut h);
        r.biome.hash(&mut h);
        r.tiles.hash(&mut h);
        r.status.hash(&mut h);
    }

    h.finish()
}

fn hash_vec(h: &mut DefaultHasher, v: DVec2) {
    v.x.to_bits().hash(h);
    v.y.to_bits().hash(h);
}
