use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use bc_forkview::{build_report, load_chains, render_row};

/// Reconstructs a fork diagram from `bc-node`'s per-node state logs
/// (`spec.md` §6, §9 "`find_forking` analyzer").
#[derive(Parser, Debug)]
#[command(name = "bc-forkview", version, about = "Fork-diagram analyzer for bc-node state logs")]
struct Cli {
    /// Number of nodes to read logs for (ids `0..num_nodes`).
    num_nodes: u32,

    /// Directory containing `log_<id>.txt` files.
    #[arg(long, default_value = "./logs")]
    logs_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let chains = load_chains(&cli.logs_dir, cli.num_nodes)?;

    for (node, chain) in chains.iter().enumerate() {
        println!("Chain length for node {node}: {}", chain.len());
    }

    let report = build_report(&chains);
    for row in &report {
        if !row.is_unanimous() {
            println!("-- fork at depth {} --", row.depth);
        }
        println!("{}", render_row(row));
    }

    Ok(())
}
