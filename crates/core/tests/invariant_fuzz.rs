use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use treezone::invariants::check_all;
use treezone::{
    Capability, Direction, GenerationConfig, KeyKind, NodeState, Requirement, RoomType, TreeSpec,
    TreeSpecError, ZoneGenerator,
};

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn roll(rng: &mut ChaCha8Rng, percent: u64) -> bool {
    rng.next_u64() % 100 < percent
}

fn random_tree(rng: &mut ChaCha8Rng, depth: u32, budget: &mut usize) -> TreeSpec {
    let mut spec = TreeSpec::leaf();
    spec.room_type = choose(
        rng,
        &[
            RoomType::Normal,
            RoomType::Normal,
            RoomType::Treasure,
            RoomType::Trap,
            RoomType::Boss,
            RoomType::BigChest,
        ],
    );
    if depth > 0 && roll(rng, 35) {
        let capability = choose(
            rng,
            &[
                Capability::HasSmallKey,
                Capability::HasBigKey,
                Capability::HasWeapon,
                Capability::CanCross2Gaps,
                Capability::CanRemoveLightStones,
            ],
        );
        spec.requirements.push(Requirement::single(capability));
        if roll(rng, 20) {
            let lantern = Capability::Custom("lantern".to_string());
            spec.requirements.push(Requirement::single(lantern));
        }
    }
    if depth > 0 && roll(rng, 15) {
        let mut allowed = vec![choose(rng, &Direction::ALL)];
        if roll(rng, 30) {
            let second = choose(rng, &Direction::ALL);
            if !allowed.contains(&second) {
                allowed.push(second);
            }
        }
        spec.entrance_directions = Some(allowed);
    }
    if roll(rng, 10) {
        spec.key = Some(choose(rng, &[KeyKind::Small, KeyKind::Big]));
    }
    if roll(rng, 10) {
        spec.wide = Some(roll(rng, 50));
    }

    let children = if depth >= 4 { 0 } else { rng.next_u64() as usize % 5 };
    for _ in 0..children {
        if *budget == 0 {
            break;
        }
        *budget -= 1;
        spec.nodes.push(random_tree(rng, depth + 1, budget));
    }
    spec
}

/// `Ok(false)` when the random tree is one the validator turns away.
fn run_generation(tree_seed: u64, zone_seed: u64) -> Result<bool, String> {
    let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);
    let mut budget = 14;
    let spec = random_tree(&mut rng, 0, &mut budget);
    let config = GenerationConfig { seed: zone_seed, ..GenerationConfig::default() };
    let generated = match ZoneGenerator::new(config).generate(&spec) {
        Ok(generated) => generated,
        Err(TreeSpecError::LockedSideEntrance { .. }) => return Ok(false),
        Err(err) => return Err(err.to_string()),
    };
    let run = format!("tree_seed {tree_seed} zone_seed {zone_seed}");

    let violations = check_all(&generated.tree, &generated.node_map, &generated.zone);
    if !violations.is_empty() {
        return Err(format!("{run}: {violations:?}"));
    }
    if !generated.is_complete() && generated.diagnostics.is_empty() {
        return Err(format!("{run}: silent hole in the layout"));
    }
    for pair in generated.bounds_history.windows(2) {
        if !pair[1].contains(&pair[0]) {
            return Err(format!("{run}: bounds shrank"));
        }
    }
    let failed = generated
        .tree
        .depth_first()
        .into_iter()
        .any(|id| generated.tree[id].state == NodeState::PlacementFailed);
    if failed && generated.placement_failures() == 0 {
        return Err(format!("{run}: failed node without a diagnostic"));
    }
    Ok(true)
}

#[test]
fn random_trees_keep_layout_invariants() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(64));
    let seeds = (any::<u64>(), any::<u64>());

    runner
        .run(&seeds, |(tree_seed, zone_seed)| {
            run_generation(tree_seed, zone_seed).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("generated zones should hold every layout invariant");
}

#[test]
fn authored_depth_survives_a_seed_sweep() {
    let tree_seed = (7..)
        .find(|&seed| run_generation(seed, 0) == Ok(true))
        .expect("some tree validates");
    for zone_seed in 0..40 {
        assert_eq!(run_generation(tree_seed, zone_seed), Ok(true), "zone seed {zone_seed}");
    }
}

#[test]
fn sideways_whitelists_reach_the_validator() {
    let rejected = (0..400_u64).filter(|&seed| run_generation(seed, 1) == Ok(false)).count();
    assert!(rejected > 0, "no locked room was drawn with a sideways-only whitelist");
}
