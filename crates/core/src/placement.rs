//! Spatial placer: assigns every tree node a footprint on the 3D node grid.
//!
//! The root goes down first; then a breadth-first walk places each node's
//! children next to it. Each child tries, in order:
//!
//! 1. in-plane candidates that keep the bounding box (`Fit::Good`),
//! 2. in-plane candidates that grow it (`Fit::Normal`),
//! 3. stairs one floor up or down,
//! 4. stairs two to nine floors away,
//! 5. for key-locked children, a plain wrapper room placed in their stead,
//! 6. for children with an entrance whitelist, a two-hop path through a new
//!    pass-through room.
//!
//! Every attempt either commits fully or leaves the `NodeMap` untouched.

pub mod candidates;
pub mod expand;
pub mod fallback;
pub mod node_map;

use std::collections::VecDeque;

use log::{debug, error, warn};

use crate::error::GenerationError;
use crate::geometry::Footprint;
use crate::random::ZoneRng;
use crate::tree::{NodeId, NodeState, RoomTree, TreeNode};
use crate::types::{Bounds, Coords, ZoneConstraints};

pub use candidates::{Fit, allowed_directions, classify, supports_stairs, value_matches_constraints};
pub use expand::expand_room;
pub use node_map::{NodeMap, cell_key};

pub const DEFAULT_MAX_DEQUEUES: usize = 1000;

/// Everything a placement call reads or writes, threaded through by `&mut`.
#[derive(Clone, Debug)]
pub struct PlacementContext {
    pub node_map: NodeMap,
    pub bounds: Option<Bounds>,
    pub constraints: ZoneConstraints,
    pub rng: ZoneRng,
    pub diagnostics: Vec<GenerationError>,
    pub max_dequeues: usize,
    /// Bounds after each commit, oldest first.
    pub bounds_history: Vec<Bounds>,
    next_id: usize,
}

impl PlacementContext {
    pub fn new(constraints: ZoneConstraints, rng: ZoneRng) -> Self {
        Self {
            node_map: NodeMap::new(),
            bounds: None,
            constraints,
            rng,
            diagnostics: Vec::new(),
            max_dequeues: DEFAULT_MAX_DEQUEUES,
            bounds_history: Vec::new(),
            next_id: 0,
        }
    }

    pub fn with_max_dequeues(mut self, max_dequeues: usize) -> Self {
        self.max_dequeues = max_dequeues;
        self
    }

    /// Free cells inside the zone limits.
    pub fn fits(&self, footprint: Footprint) -> bool {
        self.node_map.footprint_free(footprint, None)
            && classify(footprint, self.bounds.as_ref(), &self.constraints).is_some()
    }

    pub(crate) fn claim(&mut self, footprint: Footprint, id: NodeId) {
        self.node_map.claim(footprint, id);
        let bounds = match self.bounds {
            Some(mut bounds) => {
                bounds.include(footprint.origin, footprint.dims);
                bounds
            }
            None => Bounds::around(footprint.origin, footprint.dims),
        };
        self.bounds = Some(bounds);
        self.bounds_history.push(bounds);
    }

    /// Record `id` at `footprint`. The caller has already checked the cells.
    pub(crate) fn commit(
        &mut self,
        tree: &mut RoomTree,
        parent: Option<NodeId>,
        id: NodeId,
        footprint: Footprint,
    ) {
        self.claim(footprint, id);
        let parent_floor = parent.and_then(|parent| tree[parent].coords).map(|coords| coords.z);
        let depth = parent.map_or(0, |parent| tree[parent].depth + 1);
        let name = format!("n{}", self.next_id);
        self.next_id += 1;

        let node = &mut tree[id];
        node.id = Some(name);
        node.coords = Some(footprint.origin);
        node.dimensions = footprint.dims;
        node.depth = depth;
        node.state = NodeState::Placed;
        debug!(
            "placed {} at {:?} size {}x{}",
            node.name(),
            footprint.origin,
            footprint.dims.w,
            footprint.dims.h
        );

        if let (Some(parent), Some(floor)) = (parent, parent_floor)
            && floor != footprint.origin.z
        {
            tree[parent].has_stairs = true;
            tree[id].has_stairs = true;
        }
    }

    fn report(&mut self, failure: GenerationError) {
        error!("{failure}");
        self.diagnostics.push(failure);
    }
}

/// Place the whole tree. Failures are collected on `ctx.diagnostics`; the
/// nodes they cover stay unplaced in `PlacementFailed`.
pub fn place_tree(tree: &mut RoomTree, ctx: &mut PlacementContext) {
    let root = tree.root();
    if !place_root(tree, ctx) {
        let child = tree.describe(root);
        ctx.report(GenerationError::PlacementExhausted { parent: "zone".to_string(), child });
        mark_failed(tree, root);
        return;
    }

    let mut open = VecDeque::from([root]);
    let mut dequeues = 0;
    while let Some(parent) = open.pop_front() {
        dequeues += 1;
        if dequeues > ctx.max_dequeues {
            ctx.report(GenerationError::Livelock { dequeues: ctx.max_dequeues });
            return;
        }

        // Fallbacks splice new rooms into the child list, so walk it by slot.
        let mut slot = 0;
        while let Some(&child) = tree.children(parent).get(slot) {
            slot += 1;
            if tree[child].is_placed() {
                open.push_back(child);
                continue;
            }
            match place_child(tree, ctx, parent, child) {
                Some(placed) => open.push_back(placed),
                None => {
                    let failure = GenerationError::PlacementExhausted {
                        parent: tree.describe(parent),
                        child: tree.describe(child),
                    };
                    ctx.report(failure);
                    mark_failed(tree, child);
                }
            }
        }
    }
}

/// The root sits on the even cell nearest the origin that the limits allow.
pub fn place_root(tree: &mut RoomTree, ctx: &mut PlacementContext) -> bool {
    let root = tree.root();
    let dims = tree[root].requested_dimensions();
    let limits = ctx.constraints;
    let x = nearest_even(limits.min_x, limits.max_x - dims.w + 1);
    let y = nearest_even(limits.min_y, limits.max_y - dims.h + 1);
    let z = 0_i32.clamp(limits.min_z, limits.max_z.max(limits.min_z));
    let footprint = Footprint::new(Coords::new(x, y, z), dims);
    if !ctx.fits(footprint) {
        return false;
    }
    ctx.commit(tree, None, root, footprint);
    expand_room(tree, ctx, root);
    true
}

fn nearest_even(low: i32, high: i32) -> i32 {
    let value = 0_i32.clamp(low, high.max(low));
    if value.rem_euclid(2) == 0 {
        value
    } else if value < high {
        value + 1
    } else {
        value - 1
    }
}

/// Try every strategy for `child` under `parent`. Returns the node that now
/// holds the child's slot: the child itself or a room spliced in above it.
pub fn place_child(
    tree: &mut RoomTree,
    ctx: &mut PlacementContext,
    parent: NodeId,
    child: NodeId,
) -> Option<NodeId> {
    let parent_footprint = tree[parent].footprint()?;
    let dims = tree[child].requested_dimensions();

    let mut good = Vec::new();
    let mut normal = Vec::new();
    for direction in allowed_directions(&tree[parent], &tree[child]) {
        let footprint = Footprint::new(parent_footprint.adjacent_origin(dims, direction), dims);
        match classify(footprint, ctx.bounds.as_ref(), &ctx.constraints) {
            Some(Fit::Good) => good.push(footprint),
            Some(Fit::Normal) => normal.push(footprint),
            None => {}
        }
    }
    let stairs = supports_stairs(&tree[parent], &tree[child]);
    let mut bad = Vec::new();
    if stairs {
        bad.extend(
            [1, -1]
                .into_iter()
                .map(|dz| Footprint::new(parent_footprint.stacked_origin(dims, dz), dims))
                .filter(|footprint| {
                    classify(*footprint, ctx.bounds.as_ref(), &ctx.constraints).is_some()
                }),
        );
    }

    for mut bucket in [good, normal, bad] {
        ctx.rng.shuffle(&mut bucket);
        for footprint in bucket {
            if try_placing_node(tree, ctx, parent, child, footprint) {
                return Some(child);
            }
        }
    }

    if stairs && fallback::place_on_distant_floor(tree, ctx, parent, child) {
        return Some(child);
    }
    // A wrapper only helps if the child could hang off one of its walls.
    let wrappable = !allowed_directions(&TreeNode::pass_through(), &tree[child]).is_empty();
    if tree[child].is_key_blocked() && wrappable {
        warn!("{} is locked and has no open wall; wrapping it", tree[child].name());
        return fallback::place_through_wrapper(tree, ctx, parent, child);
    }
    if tree[child].entrance_directions.is_some() {
        warn!("{} cannot face its entrance directly; inserting a path", tree[child].name());
        return fallback::insert_path(tree, ctx, parent, child);
    }
    None
}

/// Commit `child` at `footprint` if every cell is free, then let the expander
/// roll on it.
pub fn try_placing_node(
    tree: &mut RoomTree,
    ctx: &mut PlacementContext,
    parent: NodeId,
    child: NodeId,
    footprint: Footprint,
) -> bool {
    if !ctx.node_map.footprint_free(footprint, None) {
        return false;
    }
    ctx.commit(tree, Some(parent), child, footprint);
    expand_room(tree, ctx, child);
    true
}

fn mark_failed(tree: &mut RoomTree, id: NodeId) {
    let mut stack = vec![id];
    while let Some(id) = stack.pop() {
        let node: &mut TreeNode = &mut tree[id];
        if !node.is_placed() {
            node.state = NodeState::PlacementFailed;
        }
        stack.extend(node.nodes.iter().copied());
    }
}
