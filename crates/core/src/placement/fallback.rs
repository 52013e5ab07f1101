//! Strategies tried once no direct neighbour of the parent is open.

use log::debug;

use super::{
    PlacementContext, allowed_directions, expand_room, place_child, supports_stairs,
    try_placing_node,
};
use crate::geometry::Footprint;
use crate::tree::{NodeId, RoomTree, TreeNode};
use crate::types::{Dimensions, Direction};

pub const MAX_FLOOR_OFFSET: i32 = 9;

/// `+2, -2, +3, -3, ... , +9, -9`; one-floor stairs are tried with the
/// regular candidates.
pub fn distant_floor_offsets() -> impl Iterator<Item = i32> {
    (2..=MAX_FLOOR_OFFSET).flat_map(|distance| [distance, -distance])
}

/// Stairs to the nearest open floor beyond the adjacent ones.
pub fn place_on_distant_floor(
    tree: &mut RoomTree,
    ctx: &mut PlacementContext,
    parent: NodeId,
    child: NodeId,
) -> bool {
    let Some(parent_footprint) = tree[parent].footprint() else {
        return false;
    };
    let dims = tree[child].requested_dimensions();
    for dz in distant_floor_offsets() {
        let footprint = Footprint::new(parent_footprint.stacked_origin(dims, dz), dims);
        if ctx.fits(footprint) {
            return try_placing_node(tree, ctx, parent, child, footprint);
        }
    }
    false
}

/// A key-locked child keeps its vertical-door rule, so give it a plain room
/// to hang from instead. The wrapper takes the child's slot; the child is
/// placed on the wrapper's turn in the walk. Undone if the wrapper cannot be
/// placed either.
pub fn place_through_wrapper(
    tree: &mut RoomTree,
    ctx: &mut PlacementContext,
    parent: NodeId,
    child: NodeId,
) -> Option<NodeId> {
    let wrapper = tree.insert_between(parent, child, TreeNode::pass_through());
    if place_child(tree, ctx, parent, wrapper).is_some() {
        debug!("wrapped {} in {}", tree[child].name(), tree[wrapper].name());
        return Some(wrapper);
    }
    tree.remove_between(parent, wrapper);
    None
}

/// A two-hop route for a child that may only be entered from certain sides:
/// a unit pass-through room one step from the parent, with the child on one
/// of its allowed walls. Same-floor routes first, then routes whose first hop
/// is a stairway.
pub fn insert_path(
    tree: &mut RoomTree,
    ctx: &mut PlacementContext,
    parent: NodeId,
    child: NodeId,
) -> Option<NodeId> {
    let parent_footprint = tree[parent].footprint()?;
    let hop = TreeNode::pass_through();
    let unit = |origin| Footprint::new(origin, Dimensions::UNIT);

    let mut first_hops = allowed_directions(&tree[parent], &hop);
    ctx.rng.shuffle(&mut first_hops);
    let mut middles: Vec<Footprint> = first_hops
        .into_iter()
        .map(|direction| unit(parent_footprint.adjacent_origin(Dimensions::UNIT, direction)))
        .collect();
    if supports_stairs(&tree[parent], &hop) {
        let mut offsets = [1, -1];
        ctx.rng.shuffle(&mut offsets);
        middles.extend(
            offsets
                .into_iter()
                .map(|dz| unit(parent_footprint.stacked_origin(Dimensions::UNIT, dz))),
        );
    }

    let dims = tree[child].requested_dimensions();
    for middle in middles {
        if !ctx.fits(middle) {
            continue;
        }
        let mut second_hops: Vec<Direction> = allowed_directions(&hop, &tree[child]);
        ctx.rng.shuffle(&mut second_hops);
        for direction in second_hops {
            let target = Footprint::new(middle.adjacent_origin(dims, direction), dims);
            if ctx.fits(target) {
                return Some(commit_path(tree, ctx, parent, child, middle, target));
            }
        }
    }
    None
}

fn commit_path(
    tree: &mut RoomTree,
    ctx: &mut PlacementContext,
    parent: NodeId,
    child: NodeId,
    middle: Footprint,
    target: Footprint,
) -> NodeId {
    let hop = tree.insert_between(parent, child, TreeNode::pass_through());
    ctx.commit(tree, Some(parent), hop, middle);
    ctx.commit(tree, Some(hop), child, target);
    debug!("routed {} through {}", tree[child].name(), tree[hop].name());
    expand_room(tree, ctx, hop);
    expand_room(tree, ctx, child);
    hop
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{EdgeRelation, edge_relation};
    use crate::random::ZoneRng;
    use crate::types::{Coords, ZoneConstraints};

    fn unit_at(x: i32, y: i32, z: i32) -> Footprint {
        Footprint::new(Coords::new(x, y, z), Dimensions::UNIT)
    }

    fn fixed() -> TreeNode {
        TreeNode { wide: Some(false), tall: Some(false), ..TreeNode::default() }
    }

    #[test]
    fn distant_offsets_alternate_by_magnitude() {
        let offsets: Vec<_> = distant_floor_offsets().collect();
        assert_eq!(&offsets[..4], &[2, -2, 3, -3]);
        assert_eq!(offsets.len(), 16);
    }

    #[test]
    fn blocked_entrance_gets_a_two_hop_path_that_keeps_its_facing() {
        for seed in 0..30 {
            let mut tree = RoomTree::new(fixed());
            let root = tree.root();
            let blocker = tree.add_child(root, TreeNode::default());
            let facing = Some(vec![Direction::Down]);
            let picky = TreeNode { entrance_directions: facing, ..TreeNode::default() };
            let child = tree.add_child(root, picky);
            let mut ctx = PlacementContext::new(ZoneConstraints::default(), ZoneRng::new(seed));
            ctx.commit(&mut tree, None, root, unit_at(0, 0, 0));
            ctx.commit(&mut tree, Some(root), blocker, unit_at(0, 1, 0));

            let hop = insert_path(&mut tree, &mut ctx, root, child).expect("path found");

            assert_eq!(tree.children(root), &[blocker, hop]);
            assert_eq!(tree.children(hop), &[child]);
            let relation = edge_relation(
                tree[hop].footprint().expect("hop placed"),
                tree[child].footprint().expect("child placed"),
            );
            assert_eq!(relation, Some(EdgeRelation::Wall(Direction::Down)), "seed {seed}");
        }
    }

    #[test]
    fn distant_floor_is_the_first_open_one_past_the_neighbours() {
        let mut tree = RoomTree::new(fixed());
        let root = tree.root();
        let upstairs = tree.add_child(root, fixed());
        let child = tree.add_child(root, fixed());
        let limits =
            ZoneConstraints { min_z: -3, max_z: 3, max_d: 7, ..ZoneConstraints::default() };
        let mut ctx = PlacementContext::new(limits, ZoneRng::new(8));
        ctx.commit(&mut tree, None, root, unit_at(0, 0, 0));
        // +2 is taken, so the walk moves on to -2.
        ctx.commit(&mut tree, None, upstairs, unit_at(0, 0, 2));

        assert!(place_on_distant_floor(&mut tree, &mut ctx, root, child));
        assert_eq!(tree[child].coords, Some(Coords::new(0, 0, -2)));
        assert!(tree[root].has_stairs && tree[child].has_stairs);
    }

    #[test]
    fn failed_wrapper_is_spliced_back_out() {
        let mut tree = RoomTree::new(fixed());
        let root = tree.root();
        let child = tree.add_child(root, TreeNode::default());
        let limits = ZoneConstraints {
            min_x: 0,
            max_x: 0,
            max_w: 1,
            min_y: 0,
            max_y: 0,
            max_h: 1,
            min_z: 0,
            max_z: 0,
            max_d: 1,
        };
        let mut ctx = PlacementContext::new(limits, ZoneRng::new(3));
        ctx.commit(&mut tree, None, root, unit_at(0, 0, 0));

        assert_eq!(place_through_wrapper(&mut tree, &mut ctx, root, child), None);
        assert_eq!(tree.children(root), &[child]);
        assert_eq!(tree[child].parent, Some(root));
        assert_eq!(tree.len(), 2);
    }
}
