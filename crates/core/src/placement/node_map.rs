//! Cell occupancy on the node grid.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::geometry::Footprint;
use crate::tree::NodeId;
use crate::types::Coords;

/// Sparse map from node-grid cell to the node that owns it. Every cell of a
/// placed footprint is claimed, so a lookup on any cell finds its room.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeMap {
    cells: BTreeMap<Coords, NodeId>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, cell: Coords) -> Option<NodeId> {
        self.cells.get(&cell).copied()
    }

    pub fn is_free(&self, cell: Coords) -> bool {
        !self.cells.contains_key(&cell)
    }

    /// Free for `owner`: cells it already holds count as open, which lets a
    /// room grow over its own footprint.
    pub fn footprint_free(&self, footprint: Footprint, owner: Option<NodeId>) -> bool {
        footprint.cells().all(|cell| match self.get(cell) {
            None => true,
            Some(holder) => Some(holder) == owner,
        })
    }

    pub fn claim(&mut self, footprint: Footprint, node: NodeId) {
        for cell in footprint.cells() {
            self.cells.insert(cell, node);
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coords, NodeId)> + '_ {
        self.cells.iter().map(|(&cell, &node)| (cell, node))
    }

    /// Cells in floor-major order, keyed as `"z:xXy"`.
    pub fn keys(&self) -> String {
        let mut out = String::new();
        for cell in self.cells.keys() {
            let _ = writeln!(out, "{}", cell_key(*cell));
        }
        out
    }
}

pub fn cell_key(cell: Coords) -> String {
    format!("{}:{}x{}", cell.z, cell.x, cell.y)
}
