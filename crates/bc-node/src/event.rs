use bc_chain::Block;
use bc_transaction::{NodeId, Transaction};

/// High-level events a running [`crate::Node`] surfaces to an observer
/// (the simulation binary prints/logs these; they carry no control flow).
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// A transaction authenticated and accepted into the mempool.
    TransactionAccepted(Transaction),

    /// A transaction was dropped: either it failed authentication or it
    /// failed `validate_transaction` (`spec.md` §7).
    TransactionRejected { sender: NodeId },

    /// A block authenticated and accepted, with the new main-chain length.
    BlockAccepted { hash: String, main_chain_len: usize },

    /// A block failed validation (bad proof-of-work, bad Merkle root, or a
    /// contained transaction failed validation).
    IllegalBlock { sender: NodeId },

    /// A dishonest node dropped a block from a non-master sender
    /// (`spec.md` §7, "Adversarial peer").
    BlockIgnoredByDishonestNode { sender: NodeId },

    /// This node mined a block and is holding it for deferred broadcast.
    Mined { hash: String },

    /// The node's event loop has exited on timeout.
    Completed,
}
