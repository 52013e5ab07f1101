//! Zone entrances, wall doors and stairways between placed rooms.

use std::collections::BTreeSet;

use log::debug;

use super::ZoneBuild;
use crate::geometry::{EdgeRelation, Footprint, edge_relation, step};
use crate::tree::{AreaBinding, NodeId};
use crate::types::{Capability, Coords, Direction, KeyKind, Requirement, RoomType};
use crate::zone::{
    DoorDefinition, DoorStatus, DoorType, FIELD_LAYER, FLOOR_LAYER, ObjectDefinition, TILE_SIZE,
    TileRect, tiles,
};

const DOOR_SPAN: i32 = 2;

/// Tiles of a door on `direction`'s wall of a half-cell.
pub fn wall_door_rect(cell: TileRect, direction: Direction) -> TileRect {
    let middle_x = cell.x + cell.w / 2 - DOOR_SPAN / 2;
    let middle_y = cell.y + cell.h / 2 - DOOR_SPAN / 2;
    match direction {
        Direction::Up => TileRect::new(middle_x, cell.y, DOOR_SPAN, 1),
        Direction::Down => TileRect::new(middle_x, cell.bottom(), DOOR_SPAN, 1),
        Direction::Left => TileRect::new(cell.x, middle_y, 1, DOOR_SPAN),
        Direction::Right => TileRect::new(cell.right(), middle_y, 1, DOOR_SPAN),
    }
}

pub fn stairs_rect(cell: TileRect) -> TileRect {
    let (x, y) = cell.center();
    TileRect::new(x - DOOR_SPAN / 2, y - DOOR_SPAN / 2, DOOR_SPAN, DOOR_SPAN)
}

/// The row or column just inside a wall door.
pub fn door_front(door: TileRect, direction: Direction) -> TileRect {
    match direction {
        Direction::Up => TileRect::new(door.x, door.y + 1, door.w, door.h),
        Direction::Down => TileRect::new(door.x, door.y - 1, door.w, door.h),
        Direction::Left => TileRect::new(door.x + 1, door.y, door.w, door.h),
        Direction::Right => TileRect::new(door.x - 1, door.y, door.w, door.h),
    }
}

/// Status of the door on the parent's side of a wall.
pub fn parent_side_status(gate: Option<&Requirement>) -> DoorStatus {
    let Some(gate) = gate else {
        return DoorStatus::Normal;
    };
    match gate.lock() {
        Some(KeyKind::Big) => DoorStatus::BigKeyLocked,
        Some(KeyKind::Small) => DoorStatus::Locked,
        None if gate.is_weapon_gate() => DoorStatus::ClosedEnemy,
        None => DoorStatus::Normal,
    }
}

/// Boss and trap rooms shut behind the hero until cleared; other rooms mirror
/// the lock seen from the parent side.
pub fn child_side_status(parent_side: DoorStatus, child_type: RoomType) -> DoorStatus {
    match child_type {
        RoomType::Boss | RoomType::Trap => DoorStatus::ClosedEnemy,
        _ if parent_side.is_lock() => parent_side,
        _ => DoorStatus::Normal,
    }
}

struct DoorSide {
    id: String,
    binding: AreaBinding,
    rect: TileRect,
    direction: Direction,
    door_type: DoorType,
    status: DoorStatus,
    target_object_id: Option<String>,
}

pub fn add_entrance_doors(build: &mut ZoneBuild<'_>) {
    for id in build.tree.depth_first() {
        let Some(entrance) = build.tree[id].entrance.clone() else {
            continue;
        };
        let Some(footprint) = build.tree[id].footprint() else {
            build.missing(format!("placement for entrance room {}", build.tree[id].name()));
            continue;
        };
        let Some((binding, _)) = build.room(id) else {
            continue;
        };
        let direction = entrance.direction;
        let outer = footprint.cells().find(|&cell| !footprint.contains(step(cell, direction)));
        let Some(cell) = outer else {
            continue;
        };
        let name = format!("{}:entrance", node_name(build, id));
        let door = DoorDefinition {
            id: name.clone(),
            x: 0,
            y: 0,
            w: 0,
            h: 0,
            direction,
            door_type: DoorType::Entrance,
            status: DoorStatus::Normal,
            target_zone: Some(entrance.target_zone),
            target_object_id: Some(entrance.target_object_id),
        };
        let rect = wall_door_rect(build.frame.locate(cell).rect, direction);
        place_door(build, binding, rect, door);
        build.tree[id].door_ids.push(name);
    }
}

/// One door pair per placed edge. Returns the rooms whose doors open only
/// once their enemies are cleared.
///
/// Both sides of a lock share one id, stairways included; a shared stairway
/// links to its partner on the other floor through that id.
pub fn add_edge_doors(build: &mut ZoneBuild<'_>) -> BTreeSet<NodeId> {
    let mut enemy_rooms = BTreeSet::new();
    for (parent, child) in build.tree.edges() {
        let (Some(parent_footprint), Some(child_footprint)) =
            (build.tree[parent].footprint(), build.tree[child].footprint())
        else {
            continue;
        };
        let Some(relation) = edge_relation(parent_footprint, child_footprint) else {
            build.missing(format!(
                "shared wall between {} and {}",
                build.tree[parent].name(),
                build.tree[child].name()
            ));
            continue;
        };
        let (Some((parent_binding, _)), Some((child_binding, _))) =
            (build.room(parent), build.room(child))
        else {
            continue;
        };

        let parent_name = node_name(build, parent);
        let child_name = node_name(build, child);
        let Some(parent_cell) = parent_door_cell(parent_footprint, child_footprint) else {
            continue;
        };
        let gate = build.tree[child].requirement().cloned();
        let parent_status = parent_side_status(gate.as_ref());
        let child_status = child_side_status(parent_status, build.tree[child].room_type);
        let shared = parent_status.is_lock() && parent_status == child_status;
        let parent_id = format!("{parent_name}>{child_name}");
        let child_id =
            if shared { parent_id.clone() } else { format!("{child_name}>{parent_name}") };
        let (parent_side, child_side) = match relation {
            EdgeRelation::Wall(direction) => {
                let child_cell = step(parent_cell, direction);
                (
                    DoorSide {
                        id: parent_id,
                        binding: parent_binding,
                        rect: wall_door_rect(build.frame.locate(parent_cell).rect, direction),
                        direction,
                        door_type: DoorType::Door,
                        status: parent_status,
                        target_object_id: None,
                    },
                    DoorSide {
                        id: child_id,
                        binding: child_binding,
                        rect: wall_door_rect(
                            build.frame.locate(child_cell).rect,
                            direction.opposite(),
                        ),
                        direction: direction.opposite(),
                        door_type: DoorType::Door,
                        status: child_status,
                        target_object_id: None,
                    },
                )
            }
            EdgeRelation::Stairs { ascending } => {
                let child_cell =
                    Coords::new(parent_cell.x, parent_cell.y, child_footprint.origin.z);
                let (up, down) = (
                    (DoorType::StairsUp, Direction::Up),
                    (DoorType::StairsDown, Direction::Down),
                );
                let ((parent_type, parent_direction), (child_type, child_direction)) =
                    if ascending { (up, down) } else { (down, up) };
                (
                    DoorSide {
                        id: parent_id.clone(),
                        binding: parent_binding,
                        rect: stairs_rect(build.frame.locate(parent_cell).rect),
                        direction: parent_direction,
                        door_type: parent_type,
                        status: parent_status,
                        target_object_id: Some(child_id.clone()),
                    },
                    DoorSide {
                        id: child_id,
                        binding: child_binding,
                        rect: stairs_rect(build.frame.locate(child_cell).rect),
                        direction: child_direction,
                        door_type: child_type,
                        status: child_status,
                        target_object_id: Some(parent_id),
                    },
                )
            }
        };

        if parent_side.status == DoorStatus::ClosedEnemy {
            enemy_rooms.insert(parent);
        }
        if child_side.status == DoorStatus::ClosedEnemy {
            enemy_rooms.insert(child);
        }
        if let Some(gate) = &gate {
            carve_obstacles(build, parent, &parent_side, gate);
        }
        debug!("linked {} and {} ({:?})", parent_side.id, child_side.id, parent_side.status);
        for (owner, side) in [(parent, parent_side), (child, child_side)] {
            build.tree[owner].door_ids.push(side.id.clone());
            let linked = side.target_object_id.is_some();
            let door = DoorDefinition {
                id: side.id,
                x: 0,
                y: 0,
                w: 0,
                h: 0,
                direction: side.direction,
                door_type: side.door_type,
                status: side.status,
                target_zone: linked.then(|| build.zone.key.clone()),
                target_object_id: side.target_object_id,
            };
            place_door(build, side.binding, side.rect, door);
        }
    }
    enemy_rooms
}

/// Set the door's pixel rectangle and open its tiles in the wall.
fn place_door(
    build: &mut ZoneBuild<'_>,
    binding: AreaBinding,
    rect: TileRect,
    mut door: DoorDefinition,
) {
    door.x = rect.x * TILE_SIZE;
    door.y = rect.y * TILE_SIZE;
    door.w = rect.w * TILE_SIZE;
    door.h = rect.h * TILE_SIZE;
    let (base, _) = build.area_pair(binding);
    base.layer_mut(FIELD_LAYER).fill(rect, tiles::EMPTY);
    base.layer_mut(FLOOR_LAYER).fill(rect, tiles::FLOOR);
    base.objects.push(ObjectDefinition::Door(door));
}

/// Ring of gaps or light stones in front of the parent-side door. Only open
/// ground inside the parent room is overwritten.
fn carve_obstacles(build: &mut ZoneBuild<'_>, parent: NodeId, side: &DoorSide, gate: &Requirement) {
    let mut rings = Vec::new();
    if gate.contains(&Capability::CanCross2Gaps) {
        rings.push((tiles::GAP, 2));
    }
    if gate.contains(&Capability::CanRemoveLightStones) {
        rings.push((tiles::LIGHT_STONE, 1));
    }
    if rings.is_empty() {
        return;
    }
    let Some((_, room)) = build.room(parent) else {
        return;
    };
    let inner = room.inset(1);
    let front = match side.door_type {
        DoorType::Door => door_front(side.rect, side.direction),
        _ => side.rect,
    };
    let (base, _) = build.area_pair(side.binding);
    let field = base.layer_mut(FIELD_LAYER);
    for (tile, thickness) in rings {
        let Some(region) = front.grow(thickness).intersection(inner) else {
            continue;
        };
        for (x, y) in region.tiles() {
            if front.contains(x, y) {
                continue;
            }
            if matches!(field.get(x, y), Some(tiles::EMPTY | tiles::FLOOR)) {
                field.set(x, y, tile);
            }
        }
    }
}

fn node_name(build: &ZoneBuild<'_>, id: NodeId) -> String {
    build.tree[id].id.clone().unwrap_or_else(|| build.tree[id].name())
}

/// Footprint cell of the door between two rooms, on the parent side.
pub fn parent_door_cell(parent: Footprint, child: Footprint) -> Option<Coords> {
    match edge_relation(parent, child)? {
        EdgeRelation::Wall(direction) => {
            parent.cells().find(|&cell| child.contains(step(cell, direction)))
        }
        EdgeRelation::Stairs { .. } => {
            parent.cells().find(|cell| child.contains(Coords::new(cell.x, cell.y, child.origin.z)))
        }
    }
}
