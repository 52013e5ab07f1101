//! Footprint rectangles on the node grid and the relations between them.

use crate::types::{Coords, Dimensions, Direction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Width,
    Height,
}

/// How a child footprint touches its parent footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeRelation {
    /// Same floor; the child lies on this side of the parent.
    Wall(Direction),
    /// Overlapping cells on different floors.
    Stairs { ascending: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Footprint {
    pub origin: Coords,
    pub dims: Dimensions,
}

impl Footprint {
    pub fn new(origin: Coords, dims: Dimensions) -> Self {
        Self { origin, dims }
    }

    pub fn right(self) -> i32 {
        self.origin.x + self.dims.w - 1
    }

    pub fn bottom(self) -> i32 {
        self.origin.y + self.dims.h - 1
    }

    pub fn cells(self) -> impl Iterator<Item = Coords> {
        let Coords { x, y, z } = self.origin;
        (y..y + self.dims.h).flat_map(move |row| {
            (x..x + self.dims.w).map(move |column| Coords::new(column, row, z))
        })
    }

    pub fn contains(self, cell: Coords) -> bool {
        cell.z == self.origin.z
            && (self.origin.x..=self.right()).contains(&cell.x)
            && (self.origin.y..=self.bottom()).contains(&cell.y)
    }

    pub fn overlaps_xy(self, other: Footprint) -> bool {
        self.origin.x <= other.right()
            && self.right() >= other.origin.x
            && self.origin.y <= other.bottom()
            && self.bottom() >= other.origin.y
    }

    pub fn intersects(self, other: Footprint) -> bool {
        self.origin.z == other.origin.z && self.overlaps_xy(other)
    }

    /// Both spans sit inside a single super-tile.
    pub fn is_aligned(self) -> bool {
        span_is_aligned(self.origin.x, self.right())
            && span_is_aligned(self.origin.y, self.bottom())
    }

    /// Origin for a footprint of `dims` attached to this one on `direction`.
    /// The cross axis snaps to the super-tile that contains this footprint's
    /// first row or column.
    pub fn adjacent_origin(self, dims: Dimensions, direction: Direction) -> Coords {
        let Coords { x, y, z } = self.origin;
        match direction {
            Direction::Up => Coords::new(snap(x, dims.w), y - dims.h, z),
            Direction::Down => Coords::new(snap(x, dims.w), self.bottom() + 1, z),
            Direction::Left => Coords::new(x - dims.w, snap(y, dims.h), z),
            Direction::Right => Coords::new(self.right() + 1, snap(y, dims.h), z),
        }
    }

    /// Origin for a footprint of `dims` stacked `dz` floors away.
    pub fn stacked_origin(self, dims: Dimensions, dz: i32) -> Coords {
        let Coords { x, y, z } = self.origin;
        Coords::new(snap(x, dims.w), snap(y, dims.h), z + dz)
    }

    /// This footprint folded together with the neighbouring half-cell column
    /// or row of its super-tile. `None` when that axis is already 2 wide.
    pub fn grown(self, axis: Axis) -> Option<Footprint> {
        let Coords { x, y, z } = self.origin;
        match axis {
            Axis::Width if self.dims.w == 1 => Some(Footprint::new(
                Coords::new(x - x.rem_euclid(2), y, z),
                Dimensions { w: 2, h: self.dims.h },
            )),
            Axis::Height if self.dims.h == 1 => Some(Footprint::new(
                Coords::new(x, y - y.rem_euclid(2), z),
                Dimensions { w: self.dims.w, h: 2 },
            )),
            _ => None,
        }
    }
}

/// A span may not start on an odd half-cell and end on an even one, which
/// would straddle two super-tiles.
pub fn span_is_aligned(min: i32, max: i32) -> bool {
    !(min.rem_euclid(2) != 0 && max.rem_euclid(2) == 0)
}

pub fn edge_relation(parent: Footprint, child: Footprint) -> Option<EdgeRelation> {
    if parent.origin.z != child.origin.z {
        return parent
            .overlaps_xy(child)
            .then_some(EdgeRelation::Stairs { ascending: child.origin.z > parent.origin.z });
    }

    let columns_overlap = parent.origin.x <= child.right() && child.origin.x <= parent.right();
    let rows_overlap = parent.origin.y <= child.bottom() && child.origin.y <= parent.bottom();
    if columns_overlap && child.origin.y == parent.bottom() + 1 {
        Some(EdgeRelation::Wall(Direction::Down))
    } else if columns_overlap && child.bottom() + 1 == parent.origin.y {
        Some(EdgeRelation::Wall(Direction::Up))
    } else if rows_overlap && child.origin.x == parent.right() + 1 {
        Some(EdgeRelation::Wall(Direction::Right))
    } else if rows_overlap && child.right() + 1 == parent.origin.x {
        Some(EdgeRelation::Wall(Direction::Left))
    } else {
        None
    }
}

/// The neighbouring cell on `direction`.
pub fn step(cell: Coords, direction: Direction) -> Coords {
    match direction {
        Direction::Up => Coords::new(cell.x, cell.y - 1, cell.z),
        Direction::Down => Coords::new(cell.x, cell.y + 1, cell.z),
        Direction::Left => Coords::new(cell.x - 1, cell.y, cell.z),
        Direction::Right => Coords::new(cell.x + 1, cell.y, cell.z),
    }
}

fn snap(value: i32, length: i32) -> i32 {
    if length == 2 { value - value.rem_euclid(2) } else { value }
}
