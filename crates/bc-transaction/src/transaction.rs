use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::envelope::WirePayload;
use crate::{TransactionError, TransactionKind};

/// Identifies a node/wallet by its position in the network (`spec.md` §6,
/// node ids are the CLI-assigned range `[0, num_nodes)`).
pub type NodeId = u32;

/// A single transaction record. All fields are always present on the wire
/// (`spec.md` §6's wire format lists one flat schema for every `type`); which
/// fields are meaningful depends on `kind` — `Transaction::init`,
/// `Transaction::transfer`, and `Transaction::mine` only let the caller set
/// the fields relevant to that kind, leaving the rest at protocol-defined
/// defaults, matching `spec.md` §9's "carry only fields relevant to each"
/// guidance without diverging from the flat wire schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub sender: NodeId,
    /// PEM-encoded public key of the receiving wallet.
    pub receiver: String,
    pub receiver_id: NodeId,
    pub amount: u64,
    pub timestamp: String,
    pub change: u64,
    /// Hex-encoded output hashes this transaction consumes. Empty for
    /// `Init` and `Mine`.
    pub inputs: Vec<String>,
}

impl Transaction {
    /// The self-addressed genesis allocation (`spec.md` §3).
    pub fn init(sender: NodeId, sender_public_key_pem: String, init_amount: u64) -> Self {
        Self {
            kind: TransactionKind::Init,
            sender,
            receiver: sender_public_key_pem,
            receiver_id: sender,
            amount: init_amount,
            timestamp: now(),
            change: 0,
            inputs: Vec::new(),
        }
    }

    /// A value transfer. `inputs` must be non-empty with aggregate value
    /// `>= amount`; `change` is the leftover returned to `sender`.
    pub fn transfer(
        sender: NodeId,
        receiver_public_key_pem: String,
        receiver_id: NodeId,
        amount: u64,
        inputs: Vec<String>,
        change: u64,
    ) -> Self {
        Self {
            kind: TransactionKind::Transfer,
            sender,
            receiver: receiver_public_key_pem,
            receiver_id,
            amount,
            timestamp: now(),
            change,
            inputs,
        }
    }

    /// The self-addressed block reward a miner appends to the block it seals.
    pub fn mine(miner: NodeId, miner_public_key_pem: String, reward: u64) -> Self {
        Self {
            kind: TransactionKind::Mine,
            sender: miner,
            receiver: miner_public_key_pem,
            receiver_id: miner,
            amount: reward,
            timestamp: now(),
            change: 0,
            inputs: Vec::new(),
        }
    }

    /// A stable per-transaction identifier: the SHA-1 hex digest of this
    /// transaction's own canonical JSON. Used to reference this
    /// transaction's outputs as future `inputs` — distinct from the Merkle
    /// leaf hash, which (per `spec.md` §4.1 and §9 Open Questions) hashes the
    /// *entire* transaction list rather than a single transaction.
    pub fn content_hash(&self) -> Result<String, TransactionError> {
        let bytes = bc_crypto::canonical_json(self)?;
        Ok(bc_crypto::sha1_hex(&bytes))
    }
}

fn now() -> String {
    Utc::now().to_string()
}

impl WirePayload for Transaction {
    const FIELD: &'static str = "tx";
}
