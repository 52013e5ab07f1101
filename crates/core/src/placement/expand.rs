//! Room expander: grows freshly placed unit rooms into their super-tile.

use log::debug;

use super::PlacementContext;
use super::candidates::classify;
use crate::geometry::Axis;
use crate::tree::{NodeId, NodeState, RoomTree};

pub const EXPAND_CHANCE: f64 = 0.32;

/// Rolls each axis independently, in a random order. An axis only grows when
/// its flag was not authored, the folded-in cells are free and still inside
/// the zone limits, and (for height) the room does not own a stairway.
pub fn expand_room(tree: &mut RoomTree, ctx: &mut PlacementContext, id: NodeId) {
    let axes = if ctx.rng.chance(0.5) {
        [Axis::Width, Axis::Height]
    } else {
        [Axis::Height, Axis::Width]
    };
    for axis in axes {
        if !ctx.rng.chance(EXPAND_CHANCE) {
            continue;
        }
        let node = &tree[id];
        let authored = match axis {
            Axis::Width => node.wide.is_some(),
            Axis::Height => node.tall.is_some() || node.has_stairs,
        };
        if authored {
            continue;
        }
        let Some(grown) = node.footprint().and_then(|footprint| footprint.grown(axis)) else {
            continue;
        };
        if !ctx.node_map.footprint_free(grown, Some(id))
            || classify(grown, ctx.bounds.as_ref(), &ctx.constraints).is_none()
        {
            continue;
        }

        ctx.claim(grown, id);
        let node = &mut tree[id];
        node.coords = Some(grown.origin);
        node.dimensions = grown.dims;
        match axis {
            Axis::Width => node.wide = Some(true),
            Axis::Height => node.tall = Some(true),
        }
        node.state = NodeState::Expanded;
        debug!("expanded {} along {axis:?} to {}x{}", node.name(), grown.dims.w, grown.dims.h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Footprint;
    use crate::random::ZoneRng;
    use crate::tree::TreeNode;
    use crate::types::{Coords, Dimensions, ZoneConstraints};

    fn placed(
        tree: &mut RoomTree,
        ctx: &mut PlacementContext,
        node: TreeNode,
        at: Coords,
    ) -> NodeId {
        let root = tree.root();
        let id = tree.add_child(root, node);
        let footprint = Footprint::new(at, tree[id].requested_dimensions());
        ctx.commit(tree, Some(root), id, footprint);
        id
    }

    #[test]
    fn authored_flags_never_change() {
        for seed in 0..50 {
            let mut tree = RoomTree::new(TreeNode::default());
            let mut ctx = PlacementContext::new(ZoneConstraints::default(), ZoneRng::new(seed));
            let id = placed(
                &mut tree,
                &mut ctx,
                TreeNode { wide: Some(false), tall: Some(false), ..TreeNode::default() },
                Coords::new(0, 0, 0),
            );
            expand_room(&mut tree, &mut ctx, id);
            assert_eq!(tree[id].dimensions, Dimensions::UNIT);
            assert_eq!(tree[id].state, NodeState::Placed);
        }
    }

    #[test]
    fn growth_claims_cells_and_stays_aligned() {
        let mut grew = 0;
        for seed in 0..200 {
            let mut tree = RoomTree::new(TreeNode::default());
            let mut ctx = PlacementContext::new(ZoneConstraints::default(), ZoneRng::new(seed));
            let id = placed(&mut tree, &mut ctx, TreeNode::default(), Coords::new(3, 3, 0));
            expand_room(&mut tree, &mut ctx, id);

            let Some(footprint) = tree[id].footprint() else {
                panic!("node must stay placed");
            };
            assert!(footprint.is_aligned());
            assert!(footprint.cells().all(|cell| ctx.node_map.get(cell) == Some(id)));
            if footprint.dims != Dimensions::UNIT {
                grew += 1;
                assert_eq!(tree[id].state, NodeState::Expanded);
            }
        }
        assert!(grew > 0, "some seed should expand the room");
    }

    #[test]
    fn stairway_rooms_never_grow_taller() {
        for seed in 0..100 {
            let mut tree = RoomTree::new(TreeNode::default());
            let mut ctx = PlacementContext::new(ZoneConstraints::default(), ZoneRng::new(seed));
            let id = placed(&mut tree, &mut ctx, TreeNode::default(), Coords::new(1, 1, 0));
            tree[id].has_stairs = true;
            expand_room(&mut tree, &mut ctx, id);
            assert_eq!(tree[id].dimensions.h, 1);
        }
    }
}
