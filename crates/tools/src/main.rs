use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use treezone::invariants::check_all;
use treezone::{GenerationConfig, TreeSpec, ZoneGenerator};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate a zone layout from an authored room tree",
    long_about = None
)]
struct Args {
    /// Path to the room tree JSON file
    #[arg(short, long)]
    tree: PathBuf,
    /// Optional generation config (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides the config seed
    #[arg(short, long)]
    seed: Option<u64>,
    /// Overrides the config zone key
    #[arg(short, long)]
    key: Option<String>,
    /// Where to write the zone JSON
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Exit with an error when any layout invariant is broken
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GenerationConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => GenerationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(key) = args.key {
        config.zone_key = key;
    }
    config.validate().context("Config overrides are invalid")?;

    let spec = TreeSpec::load(&args.tree)
        .with_context(|| format!("Failed to load room tree: {}", args.tree.display()))?;
    info!("loaded {} authored rooms from {}", spec.count(), args.tree.display());

    let generated =
        ZoneGenerator::new(config).generate(&spec).context("Room tree failed validation")?;
    let zone = &generated.zone;
    let violations = check_all(&generated.tree, &generated.node_map, zone);

    println!("Zone: {}", zone.key);
    println!("Floors: {}", zone.floors.len());
    println!("Rooms placed: {} of {}", generated.placed_count(), generated.tree.len());
    println!("Doors: {}", zone.doors().count());
    println!("Fingerprint: {:016x}", zone.fingerprint());
    for diagnostic in &generated.diagnostics {
        println!("Diagnostic: {diagnostic}");
    }
    for violation in &violations {
        println!("Violation: {violation}");
    }

    if let Some(out) = &args.out {
        zone.write_atomic(out)
            .with_context(|| format!("Failed to write zone: {}", out.display()))?;
        println!("Wrote {}", out.display());
    }
    if args.strict && !violations.is_empty() {
        bail!("{} layout invariants broken", violations.len());
    }
    Ok(())
}
