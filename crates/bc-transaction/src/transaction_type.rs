use serde::{Deserialize, Serialize};

/// The three transaction kinds recognised by the protocol (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Self-addressed genesis allocation. At most one per sender, and only
    /// while the chain holds just the genesis block.
    #[serde(rename = "INIT")]
    Init,

    /// A transfer of value from `sender` to `receiver_id`, consuming `inputs`
    /// and returning `change` to the sender.
    #[serde(rename = "TRANSFER")]
    Transfer,

    /// Self-addressed block reward appended by the miner that sealed a block.
    #[serde(rename = "MINE")]
    Mine,
}
