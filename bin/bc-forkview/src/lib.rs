//! Parsing and reporting for `bc-node`'s per-node state logs
//! (`spec.md` §6 "Persisted state", §9 "`find_forking` analyzer").
//!
//! The original analyzer scanned log text for a bare `Chain:` marker and
//! reconstructed the chain by following trailing commas across lines
//! (`spec.md` §9 explicitly invites replacing this "with structured output").
//! Here each node's chain state is written as one self-contained line
//! (`"Chain: "` + comma-joined hashes, tip first — see `bc_node::StateLog`),
//! so parsing is a single split rather than a reverse line scan.

use std::path::Path;

use anyhow::{Context, Result};

/// One node's chain, genesis first, tip last — the reverse of the on-disk
/// tip-first ordering, so depth `0` is always genesis across every node.
pub type Chain = Vec<String>;

/// Parse the last `"Chain: "` line in `path` into a genesis-first chain.
/// Returns an empty chain if the file has no such line (a node that never
/// accepted a block beyond genesis, or never logged at all).
pub fn parse_chain_log(path: &Path) -> Result<Chain> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let last_chain_line = contents
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix("Chain: "));

    let Some(tip_first) = last_chain_line else {
        return Ok(Vec::new());
    };

    let mut genesis_first: Chain = tip_first
        .split(", ")
        .filter(|hash| !hash.is_empty())
        .map(str::to_string)
        .collect();
    genesis_first.reverse();
    Ok(genesis_first)
}

/// One row of the fork report: at a given depth from genesis, which nodes
/// agree on which (7-hex-char-truncated) block hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkRow {
    pub depth: usize,
    /// Groups of node indices that share the same hash prefix at this
    /// depth, in first-seen order. A node shorter than `depth` contributes
    /// an empty-string group of its own (it has no block at this depth).
    pub groups: Vec<(Vec<usize>, String)>,
}

impl ForkRow {
    /// A depth where every present node agrees (at most one non-empty group,
    /// or every node already exhausted its chain).
    pub fn is_unanimous(&self) -> bool {
        self.groups.len() <= 1
    }
}

const HASH_PREFIX_LEN: usize = 7;

/// Build one [`ForkRow`] per depth across `chains`, up to the longest chain.
pub fn build_report(chains: &[Chain]) -> Vec<ForkRow> {
    let max_length = chains.iter().map(Vec::len).max().unwrap_or(0);

    (0..max_length)
        .map(|depth| {
            let mut groups: Vec<(Vec<usize>, String)> = Vec::new();
            for (node, chain) in chains.iter().enumerate() {
                let prefix = chain
                    .get(depth)
                    .map(|hash| hash.chars().take(HASH_PREFIX_LEN).collect::<String>())
                    .unwrap_or_default();

                match groups.iter_mut().find(|(_, value)| *value == prefix) {
                    Some((nodes, _)) => nodes.push(node),
                    None => groups.push((vec![node], prefix)),
                }
            }
            ForkRow { depth, groups }
        })
        .collect()
}

/// Load every node's chain from `logs_dir/log_<id>.txt` for `id` in
/// `0..num_nodes`.
pub fn load_chains(logs_dir: &Path, num_nodes: u32) -> Result<Vec<Chain>> {
    (0..num_nodes)
        .map(|id| parse_chain_log(&logs_dir.join(format!("log_{id}.txt"))))
        .collect()
}

/// Render a [`ForkRow`] the way a terminal report prints it: node-index
/// groups tab-separated, then the corresponding hash prefixes.
pub fn render_row(row: &ForkRow) -> String {
    let indices = row
        .groups
        .iter()
        .map(|(nodes, _)| {
            nodes
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\t\t");
    let hashes = row
        .groups
        .iter()
        .map(|(_, hash)| hash.as_str())
        .collect::<Vec<_>>()
        .join("\t\t");
    format!("{indices}\n{hashes}")
}
