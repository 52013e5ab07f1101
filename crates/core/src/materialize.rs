//! Grid materializer: turns placed nodes into floors, areas, doors and room
//! contents.
//!
//! Node-grid half-cells map onto super-tile areas at half resolution: cell
//! `(x, y)` lives in area column `x.div_euclid(2)`, row `y.div_euclid(2)`, at
//! tile offset `(x.rem_euclid(2) * 16, y.rem_euclid(2) * 16)`.

pub mod chunks;
pub mod doors;
pub mod populate;
pub mod skeletons;

use log::{debug, error};

use crate::error::GenerationError;
use crate::placement::NodeMap;
use crate::random::ZoneRng;
use crate::tree::{AreaBinding, NodeId, NodeState, RoomTree};
use crate::types::{Bounds, Coords};
use crate::zone::{AreaDefinition, AreaSection, HALF_CELL_TILES, TileRect, Zone, ZoneFloor};

/// Where the zone's area grids sit on the node grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneFrame {
    pub column_min: i32,
    pub row_min: i32,
    pub z_min: i32,
    pub columns: usize,
    pub rows: usize,
    pub floors: usize,
}

/// A half-cell resolved to its area and its tile rectangle inside that area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSpot {
    pub floor: usize,
    pub column: usize,
    pub row: usize,
    pub rect: TileRect,
}

impl ZoneFrame {
    pub fn new(bounds: &Bounds) -> Self {
        let column_min = bounds.x_min.div_euclid(2);
        let row_min = bounds.y_min.div_euclid(2);
        Self {
            column_min,
            row_min,
            z_min: bounds.z_min,
            columns: (bounds.x_max.div_euclid(2) - column_min + 1) as usize,
            rows: (bounds.y_max.div_euclid(2) - row_min + 1) as usize,
            floors: bounds.floor_count(),
        }
    }

    pub fn locate(&self, cell: Coords) -> CellSpot {
        CellSpot {
            floor: (cell.z - self.z_min) as usize,
            column: (cell.x.div_euclid(2) - self.column_min) as usize,
            row: (cell.y.div_euclid(2) - self.row_min) as usize,
            rect: TileRect::new(
                cell.x.rem_euclid(2) * HALF_CELL_TILES,
                cell.y.rem_euclid(2) * HALF_CELL_TILES,
                HALF_CELL_TILES,
                HALF_CELL_TILES,
            ),
        }
    }

    /// Every half-cell the frame covers, floor by floor, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Coords> + '_ {
        let x_min = self.column_min * 2;
        let y_min = self.row_min * 2;
        let width = self.columns as i32 * 2;
        let height = self.rows as i32 * 2;
        (0..self.floors as i32).flat_map(move |floor| {
            (y_min..y_min + height).flat_map(move |y| {
                (x_min..x_min + width).map(move |x| Coords::new(x, y, self.z_min + floor))
            })
        })
    }
}

/// Working state shared by the materialization steps.
pub struct ZoneBuild<'a> {
    pub zone: Zone,
    pub frame: ZoneFrame,
    pub tree: &'a mut RoomTree,
    pub diagnostics: &'a mut Vec<GenerationError>,
}

impl ZoneBuild<'_> {
    pub fn area(&self, binding: AreaBinding) -> &AreaDefinition {
        &self.zone.floors[binding.floor].grid[binding.row][binding.column]
    }

    /// Base and spirit area for one binding.
    pub fn area_pair(
        &mut self,
        binding: AreaBinding,
    ) -> (&mut AreaDefinition, &mut AreaDefinition) {
        let AreaBinding { floor, column, row, .. } = binding;
        let floor = &mut self.zone.floors[floor];
        (&mut floor.grid[row][column], &mut floor.spirit_grid[row][column])
    }

    /// The node's area binding and its room rectangle.
    pub fn room(&mut self, id: NodeId) -> Option<(AreaBinding, TileRect)> {
        let Some(binding) = self.tree[id].area else {
            self.missing(format!("area for {}", self.tree[id].name()));
            return None;
        };
        let rect = self.area(binding).sections.get(binding.section).map(|section| section.rect);
        match rect {
            Some(rect) => Some((binding, rect)),
            None => {
                self.missing(format!("section {} for {}", binding.section, self.tree[id].name()));
                None
            }
        }
    }

    pub fn missing(&mut self, what: String) {
        let failure = GenerationError::MissingLookup { what };
        error!("{failure}");
        self.diagnostics.push(failure);
    }
}

/// Build the zone for a placed tree. Every bound node ends `Materialized`.
pub fn materialize_zone(
    key: &str,
    tree: &mut RoomTree,
    node_map: &NodeMap,
    bounds: Option<Bounds>,
    rng: &ZoneRng,
    diagnostics: &mut Vec<GenerationError>,
) -> Zone {
    let Some(bounds) = bounds else {
        return Zone::empty(key);
    };
    let frame = ZoneFrame::new(&bounds);
    let zone = Zone {
        key: key.to_string(),
        floors: (0..frame.floors)
            .map(|floor| ZoneFloor::new(frame.z_min + floor as i32, frame.columns, frame.rows))
            .collect(),
    };
    let mut build = ZoneBuild { zone, frame, tree, diagnostics };

    bind_sections(&mut build, node_map);
    chunks::carve_room_shells(&mut build);
    doors::add_entrance_doors(&mut build);
    let enemy_rooms = doors::add_edge_doors(&mut build);
    populate::populate_rooms(&mut build, &enemy_rooms, rng);

    let ZoneBuild { zone, tree, .. } = build;
    for id in tree.depth_first() {
        if tree[id].area.is_some() {
            tree[id].state = NodeState::Materialized;
        }
    }
    debug!("materialized zone {} with {} floors", zone.key, zone.floors.len());
    zone
}

/// Empty half-cells get a default section; each node gets one section sized
/// to its footprint, bound on the first cell that touches it.
fn bind_sections(build: &mut ZoneBuild<'_>, node_map: &NodeMap) {
    let cells: Vec<Coords> = build.frame.cells().collect();
    for cell in cells {
        let spot = build.frame.locate(cell);
        let (rect, node) = match node_map.get(cell) {
            None => (spot.rect, None),
            Some(id) if build.tree[id].area.is_some() => continue,
            Some(id) => {
                let dims = build.tree[id].dimensions;
                let rect = TileRect::new(
                    spot.rect.x,
                    spot.rect.y,
                    dims.w * HALF_CELL_TILES,
                    dims.h * HALF_CELL_TILES,
                );
                (rect, Some(id))
            }
        };
        let name = node.and_then(|id| build.tree[id].id.clone());
        let floor = &mut build.zone.floors[spot.floor];
        let section = floor.grid[spot.row][spot.column].sections.len();
        floor.grid[spot.row][spot.column].sections.push(AreaSection { rect, node: name.clone() });
        floor.spirit_grid[spot.row][spot.column].sections.push(AreaSection { rect, node: name });
        if let Some(id) = node {
            build.tree[id].area = Some(AreaBinding {
                floor: spot.floor,
                column: spot.column,
                row: spot.row,
                section,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Footprint;
    use crate::placement::PlacementContext;
    use crate::tree::TreeNode;
    use crate::types::{Dimensions, ZoneConstraints};

    #[test]
    fn frame_maps_half_cells_to_areas() {
        let bounds = Bounds { x_min: -3, x_max: 2, y_min: 0, y_max: 1, z_min: -1, z_max: 0 };
        let frame = ZoneFrame::new(&bounds);
        assert_eq!((frame.columns, frame.rows, frame.floors), (4, 1, 2));

        let spot = frame.locate(Coords::new(-3, 1, 0));
        assert_eq!((spot.floor, spot.column, spot.row), (1, 0, 0));
        assert_eq!(spot.rect, TileRect::new(16, 16, 16, 16));
        assert_eq!(frame.cells().count(), 2 * 8 * 2);
    }

    #[test]
    fn every_half_cell_gets_exactly_one_section_owner() {
        let hall = TreeNode { wide: Some(true), tall: Some(false), ..TreeNode::default() };
        let mut tree = RoomTree::new(hall);
        let root = tree.root();
        let closet = TreeNode { wide: Some(false), tall: Some(false), ..TreeNode::default() };
        let side = tree.add_child(root, closet);
        let mut ctx = PlacementContext::new(ZoneConstraints::default(), ZoneRng::new(1));
        let wide = Footprint::new(Coords::new(0, 0, 0), Dimensions { w: 2, h: 1 });
        ctx.commit(&mut tree, None, root, wide);
        let below = Footprint::new(Coords::new(0, 1, 0), Dimensions::UNIT);
        ctx.commit(&mut tree, Some(root), side, below);

        let mut diagnostics = Vec::new();
        let PlacementContext { node_map, bounds, rng, .. } = ctx;
        let zone =
            materialize_zone("cave", &mut tree, &node_map, bounds, &rng, &mut diagnostics);

        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let sections = &zone.floors[0].grid[0][0].sections;
        assert_eq!(sections.len(), 3, "root, side room and one empty half-cell");
        assert_eq!(sections[0].rect, TileRect::new(0, 0, 32, 16));
        assert_eq!(sections[0].node.as_deref(), Some("n0"));
        assert_eq!(sections.iter().filter(|section| section.node.is_none()).count(), 1);
        assert_eq!(zone.floors[0].spirit_grid[0][0].sections, *sections);
        assert_eq!(tree[root].state, NodeState::Materialized);
        assert_eq!(tree[side].area.map(|binding| binding.section), Some(1));
    }
}
