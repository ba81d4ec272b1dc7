use std::time::Duration;

use bc_transaction::NodeId;

/// Full configuration for a [`crate::Node`] (`spec.md` §4.6 constructor
/// parameters, §6 CLI arguments).
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub id: NodeId,
    pub num_nodes: u32,
    pub is_miner: bool,
    pub is_dishonest: bool,
    /// The node whose blocks a dishonest node accepts; `None` for honest
    /// nodes and for the dishonest master itself (`spec.md` §6, GLOSSARY).
    pub dishonest_master: Option<NodeId>,
    pub block_length: usize,
    pub difficulty: u32,
    pub arity: usize,
    pub init_amount: u64,
    pub reward: u64,
    /// Minimum wall-clock gap between this node's own generated
    /// transactions (`spec.md` §4.6 step f, "configured tick interval").
    pub tick_interval: Duration,
    /// Upper bound on each inbox-drain wait (`spec.md` §4.6 step a, "short
    /// blocking wait").
    pub poll_interval: Duration,
}

impl NodeConfig {
    pub fn engine_config(&self) -> bc_chain::EngineConfig {
        bc_chain::EngineConfig {
            block_length: self.block_length,
            difficulty: self.difficulty,
            arity: self.arity,
            init_amount: self.init_amount,
            reward: self.reward,
        }
    }
}
