use anyhow::{Result, bail};
use clap::Parser;
use pathmap::mapgen::audit;
use pathmap::{Configuration, MapGenerator, NodeType};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    runs: u32,
    /// Largest column count to try
    #[arg(long, default_value_t = 20)]
    max_columns: u32,
}

fn pick(rng: &mut ChaCha8Rng, min: u32, max: u32) -> u32 {
    min + (rng.next_u64() % u64::from(max - min + 1)) as u32
}

fn random_configuration(rng: &mut ChaCha8Rng, max_columns: u32) -> Configuration {
    let min_nodes = pick(rng, 1, 4);
    let min_connection = pick(rng, 1, 3);
    Configuration {
        columns: pick(rng, 1, max_columns.max(1)),
        min_nodes,
        max_nodes: min_nodes + pick(rng, 0, 4),
        min_connection,
        max_connection: min_connection + pick(rng, 0, 2),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    println!("Starting map fuzz on seed {} for {} runs...", args.seed, args.runs);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut type_totals = [0_usize; 6];

    for run in 0..args.runs {
        let config = random_configuration(&mut rng, args.max_columns);
        config.validate()?;
        let map_seed = rng.next_u64();
        let map = MapGenerator::with_rng(config, ChaCha8Rng::seed_from_u64(map_seed)).generate();
        debug!(run, ?config, nodes = map.node_count(), "map generated");

        let violations = audit(&map);
        if !violations.is_empty() {
            for violation in &violations {
                eprintln!("  {violation}");
            }
            bail!("run {run} (map seed {map_seed}, {config:?}) broke {} invariants", violations.len());
        }

        for node_type in NodeType::ALL {
            type_totals[node_type.slot()] += map.count_of(node_type);
        }
    }

    println!("Fuzzing completed successfully.");
    for node_type in NodeType::ALL {
        println!("  {node_type}: {}", type_totals[node_type.slot()]);
    }
    Ok(())
}
