//! Seeded bonus content: key and lock pairs, side rooms and pass-through rooms.
//!
//! Mutation only adds nodes. A node that existed before this pass keeps its
//! requirements, type and relative order among its siblings.

use super::{NodeId, RoomTree, TreeNode};
use crate::random::ZoneRng;
use crate::types::{Capability, KeyKind, Requirement, RoomType};

const KEY_LOCK_CHANCE: f64 = 0.1;
const BONUS_LEAF_CHANCE: f64 = 0.1;
const PASS_THROUGH_CHANCE: f64 = 0.5;

pub fn mutate_tree(tree: &mut RoomTree, rng: &mut ZoneRng) {
    let root = tree.root();
    mutate_node(tree, root, rng);
}

fn mutate_node(tree: &mut RoomTree, id: NodeId, rng: &mut ZoneRng) {
    let original = tree.children(id).to_vec();

    if (1..=2).contains(&original.len()) {
        if rng.chance(KEY_LOCK_CHANCE) {
            let Some(&wrapped) = rng.element(&original) else {
                return;
            };
            add_key_lock_pair(tree, id, wrapped, rng.chance(0.5));
        } else if rng.chance(BONUS_LEAF_CHANCE) {
            let room_type = if rng.chance(0.5) { RoomType::Trap } else { RoomType::Treasure };
            tree.add_child(id, TreeNode { room_type, synthetic: true, ..TreeNode::default() });
        }
    }

    if tree.children(id).len() > 1 {
        for child in tree.children(id).to_vec() {
            if tree.children(child).is_empty() && rng.chance(PASS_THROUGH_CHANCE) {
                tree.insert_between(id, child, TreeNode::pass_through());
            }
        }
    }

    for child in original {
        mutate_node(tree, child, rng);
    }
}

fn key_leaf() -> TreeNode {
    TreeNode {
        room_type: RoomType::Treasure,
        key: Some(KeyKind::Small),
        synthetic: true,
        ..TreeNode::default()
    }
}

/// Guard `wrapped` with a small-key lock and put the key within reach of the
/// visited node: either as its direct child or one pass-through room away.
fn add_key_lock_pair(tree: &mut RoomTree, id: NodeId, wrapped: NodeId, one_hop: bool) {
    let lock = TreeNode::gated(Requirement::single(Capability::HasSmallKey));
    if one_hop {
        let hub = tree.insert_between(id, wrapped, TreeNode::pass_through());
        tree.insert_between(hub, wrapped, lock);
        tree.add_child(hub, key_leaf());
    } else {
        tree.insert_between(id, wrapped, lock);
        tree.add_child(id, key_leaf());
    }
}
