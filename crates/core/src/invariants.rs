//! Structural checks over a generated zone, shared by tests and the fuzzer.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::geometry::{EdgeRelation, edge_relation};
use crate::placement::{NodeMap, cell_key};
use crate::tree::{NodeState, RoomTree};
use crate::types::Direction;
use crate::zone::{DoorStatus, Zone};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("{first} and {second} both claim cell {cell}")]
    Overlap { first: String, second: String, cell: String },
    #[error("{node} straddles two super-tiles")]
    Misaligned { node: String },
    #[error("{child} does not touch its parent {parent}")]
    NotAdjacent { parent: String, child: String },
    #[error("{child} is entered from {found:?}, which its whitelist does not allow")]
    WrongFacing { child: String, found: Option<Direction> },
    #[error("locked door {id} has no matching locked twin")]
    UnsharedLock { id: String },
    #[error("{node} was placed but never materialized")]
    NotMaterialized { node: String },
}

/// Every footprint cell is owned by its node in the map, and nothing else
/// owns it.
pub fn check_no_overlap(tree: &RoomTree, node_map: &NodeMap) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (id, node) in tree.placed_nodes() {
        let Some(footprint) = node.footprint() else {
            continue;
        };
        for cell in footprint.cells() {
            match node_map.get(cell) {
                Some(owner) if owner == id => {}
                owner => violations.push(Violation::Overlap {
                    first: node.name(),
                    second: owner.map_or_else(|| "nobody".to_string(), |owner| tree[owner].name()),
                    cell: cell_key(cell),
                }),
            }
        }
    }
    violations
}

pub fn check_parity(tree: &RoomTree) -> Vec<Violation> {
    tree.placed_nodes()
        .filter(|(_, node)| node.footprint().is_some_and(|footprint| !footprint.is_aligned()))
        .map(|(_, node)| Violation::Misaligned { node: node.name() })
        .collect()
}

/// Every placed edge is a wall or a stairway, and whitelisted children are
/// entered through an allowed wall.
pub fn check_adjacency(tree: &RoomTree) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (parent, child) in tree.edges() {
        let (Some(parent_footprint), Some(child_footprint)) =
            (tree[parent].footprint(), tree[child].footprint())
        else {
            continue;
        };
        let relation = edge_relation(parent_footprint, child_footprint);
        if relation.is_none() {
            violations.push(Violation::NotAdjacent {
                parent: tree[parent].name(),
                child: tree[child].name(),
            });
            continue;
        }
        if let Some(allowed) = &tree[child].entrance_directions {
            let found = match relation {
                Some(EdgeRelation::Wall(direction)) => Some(direction),
                _ => None,
            };
            if !found.is_some_and(|direction| allowed.contains(&direction)) {
                violations.push(Violation::WrongFacing { child: tree[child].name(), found });
            }
        }
    }
    violations
}

/// When both sides of a door are locked they share one id and one status.
/// A lone locked side is fine as long as its twin is not locked under its
/// own id.
pub fn check_shared_locks(zone: &Zone) -> Vec<Violation> {
    let mut locks: BTreeMap<&str, Vec<DoorStatus>> = BTreeMap::new();
    for door in zone.doors().filter(|door| door.status.is_lock()) {
        locks.entry(door.id.as_str()).or_default().push(door.status);
    }
    locks
        .iter()
        .filter(|(id, statuses)| match statuses.as_slice() {
            [_] => reversed_id(id).is_some_and(|twin| locks.contains_key(twin.as_str())),
            [first, second] => first != second,
            _ => true,
        })
        .map(|(id, _)| Violation::UnsharedLock { id: id.to_string() })
        .collect()
}

fn reversed_id(id: &str) -> Option<String> {
    let (from, to) = id.split_once('>')?;
    Some(format!("{to}>{from}"))
}

pub fn check_materialized(tree: &RoomTree) -> Vec<Violation> {
    tree.placed_nodes()
        .filter(|(_, node)| node.state != NodeState::Materialized)
        .map(|(_, node)| Violation::NotMaterialized { node: node.name() })
        .collect()
}

pub fn check_all(tree: &RoomTree, node_map: &NodeMap, zone: &Zone) -> Vec<Violation> {
    let mut violations = check_no_overlap(tree, node_map);
    violations.extend(check_parity(tree));
    violations.extend(check_adjacency(tree));
    violations.extend(check_shared_locks(zone));
    violations.extend(check_materialized(tree));
    violations
}
