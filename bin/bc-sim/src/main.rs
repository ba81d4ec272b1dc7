use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use crossbeam_channel::unbounded;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bc_crypto::Wallet;
use bc_node::{Node, NodeConfig};
use bc_transaction::{NodeId, WireMessage};

/// Positional CLI arguments, in the exact order the simulated protocol
/// expects (`spec.md` §6): num_nodes, block_size, timeout_seconds,
/// num_miners, num_dishonest, merkle_arity, difficulty.
#[derive(Parser, Debug)]
#[command(
    name = "bc-sim",
    version,
    about = "Proof-of-work blockchain network simulator"
)]
struct Cli {
    /// Number of participating nodes.
    num_nodes: u32,

    /// Transactions per block (`block_length` in the Protocol Engine).
    block_size: usize,

    /// Wall-clock seconds each node runs before shutting down.
    timeout_seconds: u64,

    /// Number of nodes (ids `[0, num_miners)`) that mine blocks.
    num_miners: u32,

    /// Number of dishonest nodes.
    num_dishonest: u32,

    /// Branching factor of the Merkle tree.
    merkle_arity: usize,

    /// Proof-of-work difficulty exponent `d` (target = `2^(160-d)`).
    difficulty: u32,

    /// Per-node INIT allocation amount.
    #[arg(long, default_value_t = 100)]
    init_amount: u64,

    /// Block reward paid to the miner that seals a block.
    #[arg(long, default_value_t = 10)]
    reward: u64,

    /// Minimum wall-clock gap between a node's own generated transactions,
    /// in milliseconds.
    #[arg(long, default_value_t = 500)]
    tick_interval_ms: u64,

    /// Upper bound on each inbox-drain wait, in milliseconds.
    #[arg(long, default_value_t = 50)]
    poll_interval_ms: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("bc_sim=info".parse()?))
        .init();

    let cli = Cli::parse();

    if cli.num_miners + cli.num_dishonest > cli.num_nodes {
        bail!("Incorrect params: num_miners + num_dishonest <= num_nodes");
    }

    // Node `k` is dishonest iff it is node 0 (and any dishonest node exists
    // at all) or it falls in the tail slice of non-miner ids reserved for
    // dishonest behaviour, matching the original orchestrator's boundary
    // arithmetic exactly (`spec.md` Supplemented-from-original-source).
    let dishonest_master = if cli.num_dishonest > 0 { Some(0u32) } else { None };
    let is_dishonest = |node_id: u32| -> bool {
        (cli.num_dishonest > 0 && node_id == 0)
            || (node_id >= cli.num_miners && node_id - cli.num_miners + 1 < cli.num_dishonest)
    };

    info!(
        num_nodes = cli.num_nodes,
        block_size = cli.block_size,
        timeout_seconds = cli.timeout_seconds,
        num_miners = cli.num_miners,
        num_dishonest = cli.num_dishonest,
        merkle_arity = cli.merkle_arity,
        difficulty = cli.difficulty,
        "Starting blockchain network simulation"
    );

    let wallets: Vec<Wallet> = (0..cli.num_nodes)
        .map(|_| Wallet::generate())
        .collect::<Result<_, _>>()
        .context("failed to generate a node wallet")?;

    let mut peer_keys = HashMap::new();
    for (id, wallet) in wallets.iter().enumerate() {
        peer_keys.insert(id as NodeId, wallet.public_key().clone());
    }
    let peer_keys = Arc::new(peer_keys);

    // One unbounded inbox per node; every node's broadcast, including its
    // own, is wired to every inbox (`spec.md` §1 Non-goals: "every node
    // receives every broadcast").
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..cli.num_nodes).map(|_| unbounded::<WireMessage>()).unzip();

    let mut handles = Vec::new();
    for (id, (wallet, inbox)) in wallets.into_iter().zip(receivers).enumerate() {
        let id = id as NodeId;
        let peers: Vec<(NodeId, _)> = senders
            .iter()
            .enumerate()
            .map(|(peer_id, sender)| (peer_id as NodeId, sender.clone()))
            .collect();

        let config = NodeConfig {
            id,
            num_nodes: cli.num_nodes,
            is_miner: id < cli.num_miners,
            is_dishonest: is_dishonest(id),
            dishonest_master: if is_dishonest(id) { dishonest_master } else { None },
            block_length: cli.block_size,
            difficulty: cli.difficulty,
            arity: cli.merkle_arity,
            init_amount: cli.init_amount,
            reward: cli.reward,
            tick_interval: Duration::from_millis(cli.tick_interval_ms),
            poll_interval: Duration::from_millis(cli.poll_interval_ms),
        };

        let peer_keys = Arc::clone(&peer_keys);
        let timeout = Duration::from_secs(cli.timeout_seconds);
        handles.push(std::thread::spawn(move || -> anyhow::Result<()> {
            let mut node = Node::new(config, wallet, peer_keys, inbox, peers, None)
                .with_context(|| format!("failed to initialise node {id}"))?;
            node.start_operation(timeout)
                .with_context(|| format!("node {id} exited with an error"))?;
            Ok(())
        }));
    }

    // The original orchestrator deliberately does not join its spawned
    // processes before printing completion (`spec.md` Supplemented section);
    // here we do join, since an OS-thread model (unlike detached processes)
    // lets us report per-node failures without leaking threads past `main`.
    for handle in handles {
        if let Err(err) = handle.join().expect("node thread panicked") {
            tracing::warn!("{err:#}");
        }
    }

    println!("[INFO]: Completed execution till `timeout` seconds");
    Ok(())
}
