//! Plain-text rendering of the level for terminals and logs.

use forbidden_rules_core::{TileCoord, TileKind};
use forbidden_rules_world::{query, World};

/// Draws the level one character per tile, rows separated by newlines.
///
/// Agents are drawn on the tile under their hitbox center, the player on top
/// of the pursuer. Item tiles whose item was collected draw as floor.
#[must_use]
pub(crate) fn ascii_map(world: &World) -> String {
    let map = query::tile_map(world);
    let player = map.tile_of(query::player_hitbox(world).center());
    let pursuer = map.tile_of(query::pursuer_hitbox(world).center());

    let mut out = String::with_capacity(((map.columns() + 1) * map.rows()) as usize);
    for (tile, kind) in map.iter() {
        if tile.column() == 0 && tile.row() > 0 {
            out.push('\n');
        }
        out.push(glyph(tile, kind, player, pursuer, map.items()));
    }
    out
}

fn glyph(
    tile: TileCoord,
    kind: TileKind,
    player: TileCoord,
    pursuer: TileCoord,
    items: &[TileCoord],
) -> char {
    if tile == player {
        return 'P';
    }
    if tile == pursuer {
        return 'M';
    }
    match kind {
        TileKind::Wall => '#',
        TileKind::Floor => '.',
        TileKind::Item if items.contains(&tile) => 'o',
        TileKind::Item => '.',
        TileKind::Hazard => '~',
        TileKind::Exit => 'E',
    }
}
