//! Plain-text rendering of generation results.

use std::fmt::Write;

use strata_worldgen::{GeneratedWorld, RoomId, RunStats, TileCatalogue, TileCell, TileGrid};

/// Glyph printed for cells that never collapsed.
const UNRESOLVED_GLYPH: char = '?';

/// One line per grid row, using each tile's glyph.
pub fn render_grid(grid: &TileGrid, tiles: &TileCatalogue) -> String {
    let mut out = String::with_capacity(((grid.width() + 1) * grid.height()) as usize);
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let glyph = match grid.get(x, y) {
                Some(TileCell::Resolved(tile)) => tiles.get(tile).glyph,
                _ => UNRESOLVED_GLYPH,
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// Header line plus tile rows for one room, or `None` if it does not exist.
pub fn render_room(generated: &GeneratedWorld, room: RoomId) -> Option<String> {
    let r = generated.world.room(room)?;
    let grid = r.tiles.as_ref()?;
    let district = generated.world.district_of_room(room)?;
    let biome = &generated.biomes.get(r.biome).name;

    let mut out = format!(
        "room {} (sector {}, district {}, biome {biome}, {:?})\n",
        room.0, r.sector.0, district.0, r.status
    );
    out.push_str(&render_grid(grid, &generated.tiles));
    Some(out)
}

/// Human-readable run summary.
pub fn summary(stats: &RunStats) -> String {
    let mut out = String::new();
    let seed_note = if stats.seed_was_derived { " (derived)" } else { "" };
    // Writing to a String cannot fail.
    let _ = writeln!(out, "seed: {}{seed_note}", stats.seed);
    let _ = writeln!(
        out,
        "biome seeds: {} of {}  districts: {}  sectors: {}  rooms: {}",
        stats.biome_seeds, stats.biome_seeds_requested, stats.districts, stats.sectors, stats.rooms
    );
    let _ = writeln!(
        out,
        "district edges: {} bidirectional, {} one-way  room edges: {}",
        stats.bidirectional_edges, stats.one_way_edges, stats.room_edges
    );
    let _ = writeln!(
        out,
        "rooms resolved: {}  unresolved: {}  synthesis attempts: {}  placement rejections: {}",
        stats.resolved_rooms,
        stats.unresolved_rooms.len(),
        stats.synthesis_attempts,
        stats.placement_rejections
    );
    for room in &stats.unresolved_rooms {
        let _ = writeln!(out, "  room {}: {}", room.room.0, room.reason);
    }
    out
}
