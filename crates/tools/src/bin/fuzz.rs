use anyhow::{Result, bail};
use clap::Parser;
use env_logger::{Builder, Env};
use log::debug;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use treezone::invariants::check_all;
use treezone::{
    Capability, Direction, GenerationConfig, KeyKind, Requirement, RoomType, TreeSpec,
    TreeSpecError, ZoneGenerator,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    runs: u32,
    /// Upper bound on authored rooms per tree
    #[arg(short, long, default_value_t = 24)]
    max_rooms: usize,
}

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
        let gate = choose(
            rng,
            &[
                Capability::HasSmallKey,
                Capability::HasBigKey,
                Capability::HasWeapon,
                Capability::CanCross2Gaps,
                Capability::CanRemoveLightStones,
            ],
        );
        spec.requirements.push(Requirement::single(gate));
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
        spec.tall = Some(roll(rng, 50));
    }

    let children = if depth >= 5 { 0 } else { rng.next_u64() as usize % 5 };
    for _ in 0..children {
        if *budget == 0 {
            break;
        }
        *budget -= 1;
        spec.nodes.push(random_tree(rng, depth + 1, budget));
    }
    spec
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("error")).init();
    let args = Args::parse();

    println!("Fuzzing {} random trees from seed {}...", args.runs, args.seed);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut partial = 0;
    let mut broken = 0;
    let mut rejected = 0;

    for run in 0..args.runs {
        let mut budget = args.max_rooms.saturating_sub(1);
        let spec = random_tree(&mut rng, 0, &mut budget);
        let zone_seed = rng.next_u64();
        let config = GenerationConfig {
            zone_key: format!("fuzz_{run}"),
            seed: zone_seed,
            ..GenerationConfig::default()
        };
        let generated = match ZoneGenerator::new(config).generate(&spec) {
            Ok(generated) => generated,
            Err(TreeSpecError::LockedSideEntrance { path }) => {
                // Random whitelists may leave a locked room facing sideways only.
                debug!("run {run}: skipped, locked room at {path} faces sideways");
                rejected += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let violations = check_all(&generated.tree, &generated.node_map, &generated.zone);
        if !violations.is_empty() {
            broken += 1;
            println!(
                "run {run} (zone seed {zone_seed}) broke {} invariants:",
                violations.len()
            );
            for violation in &violations {
                println!("  {violation}");
            }
        }
        if !generated.is_complete() {
            partial += 1;
            // Holes are allowed, silent holes are not.
            assert!(
                !generated.diagnostics.is_empty(),
                "run {run}: unplaced rooms without a diagnostic"
            );
        }
        for pair in generated.bounds_history.windows(2) {
            assert!(pair[1].contains(&pair[0]), "run {run}: bounds shrank");
        }
    }

    println!(
        "Finished {} runs: {partial} partial layouts, {broken} with broken invariants, \
         {rejected} trees rejected",
        args.runs
    );
    if broken > 0 {
        bail!("{broken} runs broke layout invariants");
    }
    Ok(())
}
