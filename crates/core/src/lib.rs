pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod invariants;
pub mod materialize;
pub mod placement;
pub mod random;
pub mod registry;
pub mod tree;
pub mod types;
pub mod zone;

pub use config::{ConfigError, GenerationConfig};
pub use error::GenerationError;
pub use generator::{GeneratedZone, ZoneGenerator, create_zone_from_tree};
pub use placement::{NodeMap, PlacementContext, place_tree};
pub use random::ZoneRng;
pub use registry::ZoneRegistry;
pub use tree::{NodeId, NodeState, RoomTree, TreeNode, TreeSpec, TreeSpecError};
pub use types::*;
pub use zone::Zone;
