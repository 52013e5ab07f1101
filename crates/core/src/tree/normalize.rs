//! Rewrites the tree so every node has at most three children and one gate.

use std::mem;

use super::{NodeId, RoomTree, TreeNode};
use crate::random::ZoneRng;

pub const MAX_CHILDREN: usize = 3;
const KEPT_ON_OVERFLOW: usize = 2;

pub fn normalize_tree(tree: &mut RoomTree, rng: &mut ZoneRng) {
    let root = tree.root();
    normalize_node(tree, root, rng);
}

fn normalize_node(tree: &mut RoomTree, id: NodeId, rng: &mut ZoneRng) {
    if tree[id].requirements.len() > 1 {
        split_requirements(tree, id, rng);
    }
    if tree.children(id).len() > MAX_CHILDREN {
        split_children(tree, id, rng);
    }
    for child in tree.children(id).to_vec() {
        normalize_node(tree, child, rng);
    }
}

/// The node keeps one randomly drawn gate. A new child takes the other gates,
/// every original child and the room payload, so the deepest gate guards it.
fn split_requirements(tree: &mut RoomTree, id: NodeId, rng: &mut ZoneRng) {
    let node = &mut tree[id];
    let kept_index = rng.index(node.requirements.len());
    let kept = node.requirements.remove(kept_index);
    let remaining = mem::replace(&mut node.requirements, vec![kept]);
    let inner = TreeNode {
        requirements: remaining,
        room_type: mem::take(&mut node.room_type),
        populate_room: node.populate_room.take(),
        key: node.key.take(),
        synthetic: true,
        ..TreeNode::default()
    };

    let children = tree.take_children(id);
    let inner_id = tree.add_child(id, inner);
    tree.set_children(inner_id, children);
}

/// Two random children stay in place (in their original order); the rest move
/// under one overflow child appended last.
fn split_children(tree: &mut RoomTree, id: NodeId, rng: &mut ZoneRng) {
    let children = tree.take_children(id);
    let mut picks: Vec<usize> = (0..children.len()).collect();
    rng.shuffle(&mut picks);
    let kept_positions = &picks[..KEPT_ON_OVERFLOW];

    let (kept, moved): (Vec<_>, Vec<_>) = children
        .iter()
        .enumerate()
        .partition(|(position, _)| kept_positions.contains(position));
    let mut kept: Vec<NodeId> = kept.into_iter().map(|(_, &child)| child).collect();
    let moved: Vec<NodeId> = moved.into_iter().map(|(_, &child)| child).collect();

    tree.set_children(id, Vec::new());
    let overflow = tree.add_child(id, TreeNode::pass_through());
    tree.set_children(overflow, moved);
    kept.push(overflow);
    tree.set_children(id, kept);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Capability, Requirement, RoomType};

    fn assert_normalized(tree: &RoomTree) {
        for id in tree.depth_first() {
            assert!(tree.children(id).len() <= MAX_CHILDREN, "node has too many children");
            assert!(tree[id].requirements.len() <= 1, "node has more than one gate");
            for &child in tree.children(id) {
                assert_eq!(tree[child].parent, Some(id));
            }
        }
    }

    fn leaves(tree: &RoomTree) -> usize {
        tree.depth_first().into_iter().filter(|&id| tree.children(id).is_empty()).count()
    }

    #[test]
    fn wide_fan_out_is_split_into_overflow_chain() {
        let mut tree = RoomTree::new(TreeNode::default());
        let root = tree.root();
        for _ in 0..9 {
            tree.add_child(root, TreeNode::default());
        }

        normalize_tree(&mut tree, &mut ZoneRng::new(4));

        assert_normalized(&tree);
        assert_eq!(leaves(&tree), 9, "every original child must survive");
        assert_eq!(tree.children(root).len(), 3);
        let overflow = tree.children(root)[2];
        assert!(tree[overflow].synthetic);
    }

    #[test]
    fn multiple_gates_become_a_chain_that_carries_the_payload() {
        let mut tree = RoomTree::new(TreeNode::default());
        let root = tree.root();
        let boss = tree.add_child(
            root,
            TreeNode {
                requirements: vec![
                    Requirement::single(Capability::HasBigKey),
                    Requirement::single(Capability::HasWeapon),
                    Requirement::single(Capability::CanCross2Gaps),
                ],
                room_type: RoomType::Boss,
                ..TreeNode::default()
            },
        );
        let behind = tree.add_child(boss, TreeNode::default());

        normalize_tree(&mut tree, &mut ZoneRng::new(11));

        assert_normalized(&tree);
        assert_eq!(tree[boss].room_type, RoomType::Normal);
        assert_eq!(tree.children(boss).len(), 1);

        let mut gates = vec![tree[boss].requirements[0].clone()];
        let mut cursor = tree.children(boss)[0];
        while tree[cursor].room_type != RoomType::Boss {
            gates.push(tree[cursor].requirements[0].clone());
            cursor = tree.children(cursor)[0];
        }
        gates.push(tree[cursor].requirements[0].clone());
        assert_eq!(gates.len(), 3);
        assert_eq!(tree.children(cursor), &[behind], "payload room keeps original children");
    }

    #[test]
    fn normalization_is_deterministic_for_a_seed() {
        let build = || {
            let mut tree = RoomTree::new(TreeNode::default());
            let root = tree.root();
            for index in 0..7 {
                let label = Some(index.to_string());
                tree.add_child(root, TreeNode { label, ..TreeNode::default() });
            }
            normalize_tree(&mut tree, &mut ZoneRng::new(77));
            tree.depth_first()
                .into_iter()
                .map(|id| tree[id].label.clone().unwrap_or_default())
                .collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }
}
