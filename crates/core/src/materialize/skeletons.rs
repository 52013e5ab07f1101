//! Room skeletons: split a room interior into content slots and walkways.

use crate::random::ZoneRng;
use crate::zone::TileRect;

pub const SLOT_SIZE: i32 = 3;
const SLOT_PITCH: i32 = SLOT_SIZE + 1;
const PATH_WIDTH: i32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Skeleton {
    EmptyRoom,
    VerticalPath,
    PitMaze,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoomLayout {
    pub slots: Vec<TileRect>,
    pub paths: Vec<TileRect>,
}

impl Skeleton {
    /// 30% vertical path, then 20% pit maze, otherwise an empty room.
    pub fn roll(rng: &mut ZoneRng) -> Self {
        if rng.chance(0.3) {
            Self::VerticalPath
        } else if rng.chance(0.2) {
            Self::PitMaze
        } else {
            Self::EmptyRoom
        }
    }

    pub fn generate(self, rng: &mut ZoneRng, interior: TileRect) -> RoomLayout {
        match self {
            Self::EmptyRoom => empty_room(interior),
            Self::VerticalPath => vertical_path(rng, interior),
            Self::PitMaze => pit_maze(rng, interior),
        }
    }
}

/// Slots laid out on a regular pitch from the top-left corner.
fn slot_grid(area: TileRect) -> Vec<TileRect> {
    let columns = (area.w + 1) / SLOT_PITCH;
    let rows = (area.h + 1) / SLOT_PITCH;
    (0..rows)
        .flat_map(|row| {
            (0..columns).map(move |column| {
                let (x, y) = (area.x + column * SLOT_PITCH, area.y + row * SLOT_PITCH);
                TileRect::new(x, y, SLOT_SIZE, SLOT_SIZE)
            })
        })
        .collect()
}

fn empty_room(interior: TileRect) -> RoomLayout {
    RoomLayout { slots: slot_grid(interior), paths: Vec::new() }
}

/// A walkway down the middle with slots on both sides of it.
fn vertical_path(rng: &mut ZoneRng, interior: TileRect) -> RoomLayout {
    let slack = (interior.w - PATH_WIDTH) / 2;
    let offset = if slack > SLOT_SIZE { rng.range(SLOT_SIZE, slack) } else { slack.max(0) };
    let path = TileRect::new(interior.x + offset, interior.y, PATH_WIDTH, interior.h);
    let left = TileRect::new(interior.x, interior.y, (path.x - interior.x - 1).max(0), interior.h);
    let right_w = (interior.right() - path.right() - 1).max(0);
    let right = TileRect::new(path.right() + 2, interior.y, right_w, interior.h);
    let mut slots = slot_grid(left);
    slots.extend(slot_grid(right));
    RoomLayout { slots, paths: vec![path] }
}

/// A cross of walkways splitting the interior into four pockets; slots sit in
/// the corners of the pockets.
fn pit_maze(rng: &mut ZoneRng, interior: TileRect) -> RoomLayout {
    let (center_x, center_y) = interior.center();
    let jitter = rng.range(-1, 1);
    let horizontal =
        TileRect::new(interior.x, center_y + jitter - PATH_WIDTH / 2, interior.w, PATH_WIDTH);
    let vertical =
        TileRect::new(center_x - jitter - PATH_WIDTH / 2, interior.y, PATH_WIDTH, interior.h);
    let corners = [
        (interior.x, interior.y),
        (interior.right() - SLOT_SIZE + 1, interior.y),
        (interior.x, interior.bottom() - SLOT_SIZE + 1),
        (interior.right() - SLOT_SIZE + 1, interior.bottom() - SLOT_SIZE + 1),
    ];
    let slots = corners
        .into_iter()
        .map(|(x, y)| TileRect::new(x, y, SLOT_SIZE, SLOT_SIZE))
        .filter(|slot| {
            slot.intersection(horizontal).is_none() && slot.intersection(vertical).is_none()
        })
        .collect();
    RoomLayout { slots, paths: vec![horizontal, vertical] }
}
