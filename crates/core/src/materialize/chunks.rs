//! Room shells: floor everywhere, walls around the edge.

use super::ZoneBuild;
use crate::zone::{AreaDefinition, FIELD_LAYER, FLOOR_LAYER, TileRect, layer_pair, tiles};

pub const WALL_THICKNESS: i32 = 1;

/// Floor on both areas; the wall ring only exists in the material world.
pub fn carve_shell(base: &mut AreaDefinition, spirit: &mut AreaDefinition, rect: TileRect) {
    let (floor, spirit_floor) = layer_pair(base, spirit, FLOOR_LAYER);
    floor.fill(rect, tiles::FLOOR);
    spirit_floor.fill(rect, tiles::FLOOR);
    base.layer_mut(FIELD_LAYER).frame(rect, WALL_THICKNESS, tiles::WALL);
}

pub fn carve_room_shells(build: &mut ZoneBuild<'_>) {
    for id in build.tree.depth_first() {
        if build.tree[id].area.is_none() {
            continue;
        }
        let Some((binding, rect)) = build.room(id) else {
            continue;
        };
        let (base, spirit) = build.area_pair(binding);
        carve_shell(base, spirit, rect);
    }
}
