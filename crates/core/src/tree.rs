//! Room tree arena: logical progression authored as a hierarchy of rooms.
//!
//! Nodes live in a `SlotMap` and parents hold ordered child ids, so passes that
//! splice intermediate rooms in while walking the tree never invalidate the
//! ids they are holding.

pub mod mutate;
pub mod normalize;
pub mod spec;

use std::collections::VecDeque;
use std::mem;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::geometry::Footprint;
use crate::types::{Coords, Dimensions, Direction, KeyKind, Requirement, RoomPopulator, RoomType};

pub use mutate::mutate_tree;
pub use normalize::normalize_tree;
pub use spec::{TreeSpec, TreeSpecError};

new_key_type! {
    pub struct NodeId;
}

/// Lifecycle of one node through placement and materialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeState {
    #[default]
    Unplaced,
    Placed,
    Expanded,
    Materialized,
    PlacementFailed,
}

/// Zone-level ingress: a door on this room's wall that leads to another zone.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneEntrance {
    pub target_zone: String,
    pub target_object_id: String,
    #[serde(default = "default_entrance_direction")]
    pub direction: Direction,
}

fn default_entrance_direction() -> Direction {
    Direction::Down
}

/// Where a materialized node lives: the same cell of `grid` and `spirit_grid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AreaBinding {
    pub floor: usize,
    pub column: usize,
    pub row: usize,
    pub section: usize,
}

#[derive(Clone, Debug, Default)]
pub struct TreeNode {
    /// Assigned at placement; unique within the zone afterwards.
    pub id: Option<String>,
    pub label: Option<String>,
    pub parent: Option<NodeId>,
    pub nodes: Vec<NodeId>,
    pub requirements: Vec<Requirement>,
    pub entrance_directions: Option<Vec<Direction>>,
    pub wide: Option<bool>,
    pub tall: Option<bool>,
    pub dimensions: Dimensions,
    pub coords: Option<Coords>,
    pub room_type: RoomType,
    pub populate_room: Option<RoomPopulator>,
    pub key: Option<KeyKind>,
    pub entrance: Option<ZoneEntrance>,
    pub depth: u32,
    pub has_stairs: bool,
    /// Inserted by a tree pass or by placement rather than authored.
    pub synthetic: bool,
    pub state: NodeState,
    pub area: Option<AreaBinding>,
    pub loot_amount: Option<u32>,
    pub door_ids: Vec<String>,
}

impl TreeNode {
    pub fn pass_through() -> Self {
        Self { synthetic: true, ..Self::default() }
    }

    pub fn gated(requirement: Requirement) -> Self {
        Self { requirements: vec![requirement], synthetic: true, ..Self::default() }
    }

    pub fn requirement(&self) -> Option<&Requirement> {
        self.requirements.first()
    }

    /// Entry needs a small or big key.
    pub fn is_key_blocked(&self) -> bool {
        self.requirement().and_then(Requirement::lock).is_some()
    }

    pub fn requested_dimensions(&self) -> Dimensions {
        Dimensions::from_flags(self.wide, self.tall)
    }

    pub fn footprint(&self) -> Option<Footprint> {
        self.coords.map(|origin| Footprint::new(origin, self.dimensions))
    }

    pub fn is_placed(&self) -> bool {
        self.coords.is_some()
    }

    /// Name for diagnostics: placement id, then authored label.
    pub fn name(&self) -> String {
        match (&self.id, &self.label) {
            (Some(id), Some(label)) => format!("{id} ({label})"),
            (Some(id), None) => id.clone(),
            (None, Some(label)) => format!("unplaced ({label})"),
            (None, None) => "unplaced node".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RoomTree {
    nodes: SlotMap<NodeId, TreeNode>,
    root: NodeId,
}

impl RoomTree {
    pub fn new(root: TreeNode) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(TreeNode { parent: None, nodes: Vec::new(), ..root });
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].nodes
    }

    pub fn add_child(&mut self, parent: NodeId, node: TreeNode) -> NodeId {
        let child = self.nodes.insert(TreeNode { parent: Some(parent), nodes: Vec::new(), ..node });
        self.nodes[parent].nodes.push(child);
        child
    }

    /// Put `node` in `child`'s slot under `parent` and hang `child` below it.
    pub fn insert_between(&mut self, parent: NodeId, child: NodeId, node: TreeNode) -> NodeId {
        let middle =
            self.nodes.insert(TreeNode { parent: Some(parent), nodes: vec![child], ..node });
        self.nodes[child].parent = Some(middle);
        if let Some(slot) = self.nodes[parent].nodes.iter_mut().find(|slot| **slot == child) {
            *slot = middle;
        }
        middle
    }

    /// Undo `insert_between` for a middle node that has exactly one child.
    pub fn remove_between(&mut self, parent: NodeId, middle: NodeId) {
        let Some(removed) = self.nodes.remove(middle) else {
            return;
        };
        debug_assert_eq!(removed.nodes.len(), 1);
        let Some(&child) = removed.nodes.first() else {
            return;
        };
        self.nodes[child].parent = Some(parent);
        if let Some(slot) = self.nodes[parent].nodes.iter_mut().find(|slot| **slot == middle) {
            *slot = child;
        }
    }

    pub fn take_children(&mut self, id: NodeId) -> Vec<NodeId> {
        mem::take(&mut self.nodes[id].nodes)
    }

    /// Replace `id`'s child list, re-parenting every entry.
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        for &child in &children {
            self.nodes[child].parent = Some(id);
        }
        self.nodes[id].nodes = children;
    }

    /// Pre-order walk from the root.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].nodes.iter().rev().copied());
        }
        order
    }

    /// Every parent-to-child edge in breadth-first order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::new();
        let mut open = VecDeque::from([self.root]);
        while let Some(parent) = open.pop_front() {
            for &child in &self.nodes[parent].nodes {
                edges.push((parent, child));
                open.push_back(child);
            }
        }
        edges
    }

    /// Diagnostic name for `id`. Nodes with neither placement id nor label are
    /// named by their slot chain from the root, e.g. `root/1/0`.
    pub fn describe(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        if node.id.is_some() || node.label.is_some() {
            return node.name();
        }
        let mut slots = Vec::new();
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            let slot = self.children(parent).iter().position(|&child| child == current);
            slots.push(slot.map_or_else(|| "?".to_string(), |slot| slot.to_string()));
            current = parent;
        }
        slots.push("root".to_string());
        slots.reverse();
        format!("unplaced node at {}", slots.join("/"))
    }

    pub fn placed_nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.depth_first().into_iter().filter_map(|id| {
            let node = &self.nodes[id];
            node.is_placed().then_some((id, node))
        })
    }
}

impl Index<NodeId> for RoomTree {
    type Output = TreeNode;

    fn index(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for RoomTree {
    fn index_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Capability;

    fn labelled(label: &str) -> TreeNode {
        TreeNode { label: Some(label.to_string()), ..TreeNode::default() }
    }

    #[test]
    fn insert_between_keeps_child_position_and_parent_links() {
        let mut tree = RoomTree::new(labelled("root"));
        let root = tree.root();
        let a = tree.add_child(root, labelled("a"));
        let b = tree.add_child(root, labelled("b"));

        let middle = tree.insert_between(root, a, TreeNode::pass_through());

        assert_eq!(tree.children(root), &[middle, b]);
        assert_eq!(tree.children(middle), &[a]);
        assert_eq!(tree[a].parent, Some(middle));
        assert_eq!(tree[middle].parent, Some(root));
    }

    #[test]
    fn remove_between_restores_original_shape() {
        let mut tree = RoomTree::new(labelled("root"));
        let root = tree.root();
        let a = tree.add_child(root, labelled("a"));
        let weapon = Requirement::single(Capability::HasWeapon);
        let gate = tree.insert_between(root, a, TreeNode::gated(weapon));

        tree.remove_between(root, gate);

        assert_eq!(tree.children(root), &[a]);
        assert_eq!(tree[a].parent, Some(root));
        assert!(tree.get(gate).is_none());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn walks_visit_every_node_once() {
        let mut tree = RoomTree::new(labelled("root"));
        let root = tree.root();
        let a = tree.add_child(root, labelled("a"));
        let b = tree.add_child(root, labelled("b"));
        let c = tree.add_child(a, labelled("c"));

        assert_eq!(tree.depth_first(), vec![root, a, c, b]);
        assert_eq!(tree.edges(), vec![(root, a), (root, b), (a, c)]);
    }

    #[test]
    fn unlabelled_nodes_are_described_by_their_slot() {
        let mut tree = RoomTree::new(TreeNode::default());
        let root = tree.root();
        tree.add_child(root, labelled("a"));
        let b = tree.add_child(root, TreeNode::default());
        let c = tree.add_child(b, TreeNode::default());

        assert_eq!(tree.describe(root), "unplaced node at root");
        assert_eq!(tree.describe(c), "unplaced node at root/1/0");
        tree[b].label = Some("b".to_string());
        assert_eq!(tree.describe(b), "unplaced (b)");
        tree[b].id = Some("n4".to_string());
        assert_eq!(tree.describe(b), "n4 (b)");
    }

    #[test]
    fn key_blocked_only_for_lock_gates() {
        let key = TreeNode::gated(Requirement::single(Capability::HasSmallKey));
        let weapon = TreeNode::gated(Requirement::single(Capability::HasWeapon));
        assert!(key.is_key_blocked());
        assert!(!weapon.is_key_blocked());
        assert!(!TreeNode::pass_through().is_key_blocked());
    }
}
