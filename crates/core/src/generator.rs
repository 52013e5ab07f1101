//! End-to-end zone generation: normalize, mutate, place, materialize.

use log::{info, warn};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::materialize::materialize_zone;
use crate::placement::{NodeMap, PlacementContext, place_tree};
use crate::random::ZoneRng;
use crate::tree::{NodeState, RoomTree, TreeSpec, TreeSpecError, mutate_tree, normalize_tree};
use crate::types::Bounds;
use crate::zone::Zone;

/// A finished zone together with the placed tree it was built from.
#[derive(Clone, Debug)]
pub struct GeneratedZone {
    pub zone: Zone,
    pub tree: RoomTree,
    pub node_map: NodeMap,
    pub bounds: Option<Bounds>,
    /// Bounds after every placement, oldest first.
    pub bounds_history: Vec<Bounds>,
    pub diagnostics: Vec<GenerationError>,
}

impl GeneratedZone {
    pub fn placed_count(&self) -> usize {
        self.tree.placed_nodes().count()
    }

    pub fn is_complete(&self) -> bool {
        self.tree.depth_first().into_iter().all(|id| self.tree[id].state == NodeState::Materialized)
    }

    pub fn placement_failures(&self) -> usize {
        self.diagnostics.iter().filter(|failure| failure.is_placement_failure()).count()
    }
}

pub struct ZoneGenerator {
    config: GenerationConfig,
}

impl ZoneGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn generate(&self, spec: &TreeSpec) -> Result<GeneratedZone, TreeSpecError> {
        Ok(self.generate_tree(RoomTree::from_spec(spec)?))
    }

    pub fn generate_tree(&self, mut tree: RoomTree) -> GeneratedZone {
        let mut rng = ZoneRng::new(self.config.seed);
        normalize_tree(&mut tree, &mut rng);
        mutate_tree(&mut tree, &mut rng);
        self.build(tree, rng)
    }

    /// Place and materialize `tree` as given, skipping the rewrite passes.
    pub fn build(&self, mut tree: RoomTree, rng: ZoneRng) -> GeneratedZone {
        let config = &self.config;
        let mut ctx = PlacementContext::new(config.constraints, rng)
            .with_max_dequeues(config.max_dequeues);
        place_tree(&mut tree, &mut ctx);

        let PlacementContext { node_map, bounds, rng, mut diagnostics, bounds_history, .. } = ctx;
        let zone = materialize_zone(
            &config.zone_key,
            &mut tree,
            &node_map,
            bounds,
            &rng,
            &mut diagnostics,
        );

        let generated =
            GeneratedZone { zone, tree, node_map, bounds, bounds_history, diagnostics };
        if generated.diagnostics.is_empty() {
            info!(
                "zone {} ready: {} rooms on {} floors",
                config.zone_key,
                generated.placed_count(),
                generated.zone.floors.len()
            );
        } else {
            warn!(
                "zone {} finished with {} diagnostics; {} of {} rooms placed",
                config.zone_key,
                generated.diagnostics.len(),
                generated.placed_count(),
                generated.tree.len()
            );
        }
        generated
    }
}

/// Generate a zone from an authored tree with default limits.
pub fn create_zone_from_tree(
    zone_key: &str,
    spec: &TreeSpec,
    seed: u64,
) -> Result<GeneratedZone, TreeSpecError> {
    let config =
        GenerationConfig { zone_key: zone_key.to_string(), seed, ..GenerationConfig::default() };
    ZoneGenerator::new(config).generate(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants::check_all;
    use crate::types::{Capability, KeyKind, Requirement, RoomType};

    fn dungeon() -> TreeSpec {
        TreeSpec::with_children(vec![
            TreeSpec::with_children(vec![TreeSpec {
                room_type: RoomType::Treasure,
                ..TreeSpec::leaf()
            }]),
            TreeSpec {
                requirements: vec![Requirement::single(Capability::HasSmallKey)],
                nodes: vec![TreeSpec { room_type: RoomType::Boss, ..TreeSpec::leaf() }],
                ..TreeSpec::leaf()
            },
            TreeSpec { key: Some(KeyKind::Small), ..TreeSpec::leaf() },
        ])
    }

    #[test]
    fn generation_is_complete_and_consistent() {
        for seed in 0..20 {
            let generated = create_zone_from_tree("crypt", &dungeon(), seed).expect("valid tree");
            assert!(generated.diagnostics.is_empty(), "seed {seed}: {:?}", generated.diagnostics);
            assert!(generated.is_complete(), "seed {seed}");
            let violations = check_all(&generated.tree, &generated.node_map, &generated.zone);
            assert!(violations.is_empty(), "seed {seed}: {violations:?}");
        }
    }

    #[test]
    fn same_seed_same_fingerprint() {
        let first = create_zone_from_tree("crypt", &dungeon(), 99).expect("valid tree");
        let second = create_zone_from_tree("crypt", &dungeon(), 99).expect("valid tree");
        assert_eq!(first.zone.fingerprint(), second.zone.fingerprint());
        assert_eq!(first.node_map, second.node_map);
        assert_eq!(first.bounds, second.bounds);
    }
}
