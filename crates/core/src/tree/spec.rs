//! Authored tree format and its conversion into the arena.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{RoomTree, TreeNode, ZoneEntrance};
use crate::types::{Dimensions, Direction, KeyKind, Requirement, RoomPopulator, RoomType};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeSpec {
    pub label: Option<String>,
    pub nodes: Vec<TreeSpec>,
    pub requirements: Vec<Requirement>,
    pub entrance_directions: Option<Vec<Direction>>,
    pub wide: Option<bool>,
    pub tall: Option<bool>,
    /// Alternative to `wide`/`tall`; both forms may be given if they agree.
    pub dimensions: Option<Dimensions>,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub populate: Option<RoomPopulator>,
    pub key: Option<KeyKind>,
    pub entrance: Option<ZoneEntrance>,
}

#[derive(Debug, Error)]
pub enum TreeSpecError {
    #[error("node at {path} whitelists no entrance directions")]
    EmptyEntranceDirections { path: String },
    #[error("node at {path} has dimensions {w}x{h}; each axis must be 1 or 2")]
    InvalidDimensions { path: String, w: i32, h: i32 },
    #[error("node at {path} has dimensions that disagree with its wide/tall flags")]
    DimensionsMismatch { path: String },
    #[error("node at {path} has an empty requirement group")]
    EmptyRequirementGroup { path: String },
    #[error("node at {path} needs a key but only accepts left or right entrances")]
    LockedSideEntrance { path: String },
    #[error("node at {path} uses a boss arena but is a {room_type:?} room")]
    BossArenaOutsideBossRoom { path: String, room_type: RoomType },
    #[error("could not read tree file {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("tree file is not valid JSON")]
    Parse(#[from] serde_json::Error),
}

impl TreeSpec {
    pub fn leaf() -> Self {
        Self::default()
    }

    pub fn with_children(nodes: Vec<TreeSpec>) -> Self {
        Self { nodes, ..Self::default() }
    }

    pub fn from_json(raw: &str) -> Result<Self, TreeSpecError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, TreeSpecError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| TreeSpecError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&raw)
    }

    pub fn count(&self) -> usize {
        1 + self.nodes.iter().map(TreeSpec::count).sum::<usize>()
    }

    /// Checks the authored shape; the path in errors is the child index chain
    /// from the root, e.g. `root/1/0`.
    pub fn validate(&self) -> Result<(), TreeSpecError> {
        self.validate_at("root")
    }

    fn validate_at(&self, path: &str) -> Result<(), TreeSpecError> {
        if self.entrance_directions.as_ref().is_some_and(Vec::is_empty) {
            return Err(TreeSpecError::EmptyEntranceDirections { path: path.to_string() });
        }
        if let Some(dims) = self.dimensions {
            if !(1..=2).contains(&dims.w) || !(1..=2).contains(&dims.h) {
                return Err(TreeSpecError::InvalidDimensions {
                    path: path.to_string(),
                    w: dims.w,
                    h: dims.h,
                });
            }
            let flags_disagree = self.wide.is_some_and(|wide| wide != (dims.w == 2))
                || self.tall.is_some_and(|tall| tall != (dims.h == 2));
            if flags_disagree {
                return Err(TreeSpecError::DimensionsMismatch { path: path.to_string() });
            }
        }
        if self.requirements.iter().any(|group| group.0.is_empty()) {
            return Err(TreeSpecError::EmptyRequirementGroup { path: path.to_string() });
        }
        // Key doors are vertical; a sideways-only whitelist leaves no wall.
        let locked = self.requirements.iter().any(|group| group.lock().is_some());
        let sideways_only = self
            .entrance_directions
            .as_ref()
            .is_some_and(|allowed| allowed.iter().all(|direction| direction.is_horizontal()));
        if locked && sideways_only {
            return Err(TreeSpecError::LockedSideEntrance { path: path.to_string() });
        }
        if matches!(self.populate, Some(RoomPopulator::BossArena { .. }))
            && self.room_type != RoomType::Boss
        {
            return Err(TreeSpecError::BossArenaOutsideBossRoom {
                path: path.to_string(),
                room_type: self.room_type,
            });
        }
        for (index, child) in self.nodes.iter().enumerate() {
            child.validate_at(&format!("{path}/{index}"))?;
        }
        Ok(())
    }

    fn to_node(&self) -> TreeNode {
        let (wide, tall) = match self.dimensions {
            Some(dims) => (Some(dims.w == 2), Some(dims.h == 2)),
            None => (self.wide, self.tall),
        };
        TreeNode {
            label: self.label.clone(),
            requirements: self.requirements.clone(),
            entrance_directions: self.entrance_directions.clone(),
            wide,
            tall,
            room_type: self.room_type,
            populate_room: self.populate,
            key: self.key,
            entrance: self.entrance.clone(),
            ..TreeNode::default()
        }
    }
}

impl RoomTree {
    pub fn from_spec(spec: &TreeSpec) -> Result<Self, TreeSpecError> {
        spec.validate()?;
        let mut tree = RoomTree::new(spec.to_node());
        let mut open = vec![(tree.root(), spec)];
        while let Some((parent, parent_spec)) = open.pop() {
            for child_spec in &parent_spec.nodes {
                let child = tree.add_child(parent, child_spec.to_node());
                open.push((child, child_spec));
            }
        }
        Ok(tree)
    }
}
