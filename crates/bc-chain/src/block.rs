use bc_merkle::MerkleTree;
use bc_transaction::{Transaction, WirePayload};
use serde::{Deserialize, Serialize};

use crate::error::ChainError;

/// The on-the-wire, unsigned shape of a block (`spec.md` §4.2 `to_wire()`,
/// §6 block envelope payload). Signing is the caller's responsibility — this
/// type carries no signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockPayload {
    pub prev_hash: String,
    pub nonce: u32,
    pub merkle_root: String,
    pub arity: usize,
    pub transactions: Vec<Transaction>,
}

impl WirePayload for BlockPayload {
    const FIELD: &'static str = "blk";
}

/// An immutable-after-mining block. `hash` is cached and recomputed whenever
/// `nonce` changes via `set_nonce` (`spec.md` §4.2).
#[derive(Debug, Clone)]
pub struct Block {
    prev_hash: String,
    nonce: u32,
    arity: usize,
    transactions: Vec<Transaction>,
    merkle: MerkleTree,
    hash: String,
}

impl Block {
    /// Build a block from `transactions`, constructing the Merkle tree and
    /// computing the initial hash with `nonce = 0`.
    pub fn new(
        transactions: Vec<Transaction>,
        arity: usize,
        prev_hash: String,
    ) -> Result<Self, ChainError> {
        let merkle = MerkleTree::construct(&transactions, arity)?;
        let mut block = Self {
            prev_hash,
            nonce: 0,
            arity,
            transactions,
            merkle,
            hash: String::new(),
        };
        block.recompute_hash();
        Ok(block)
    }

    /// The genesis block: empty `prev_hash`, no transactions, empty Merkle
    /// root (`spec.md` §3).
    pub fn genesis() -> Self {
        // Arity is irrelevant for an empty transaction list (construction
        // short-circuits before any grouping happens) but must still be
        // `>= 2` to satisfy `MerkleTree::construct`'s precondition.
        Self::new(Vec::new(), 2, String::new()).expect("genesis construction cannot fail")
    }

    /// Update the nonce and recompute the cached hash.
    pub fn set_nonce(&mut self, nonce: u32) {
        self.nonce = nonce;
        self.recompute_hash();
    }

    fn recompute_hash(&mut self) {
        let header = format!("{}{}{}", self.nonce, self.prev_hash, self.merkle.root_value());
        self.hash = bc_crypto::sha1_hex(header.as_bytes());
    }

    pub fn prev_hash(&self) -> &str {
        &self.prev_hash
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn merkle_root(&self) -> &str {
        self.merkle.root_value()
    }

    /// The cached header hash.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn to_wire(&self) -> BlockPayload {
        BlockPayload {
            prev_hash: self.prev_hash.clone(),
            nonce: self.nonce,
            merkle_root: self.merkle_root().to_string(),
            arity: self.arity,
            transactions: self.transactions.clone(),
        }
    }

    /// Rebuild a `Block` from a received `BlockPayload` by reconstructing
    /// its Merkle tree from the carried transactions. Does not itself check
    /// that the recomputed root matches `payload.merkle_root` or that the
    /// hash meets the proof-of-work target — that is `Engine::validate_block`'s
    /// job (`spec.md` §4.4).
    pub fn from_payload(payload: BlockPayload) -> Result<Self, ChainError> {
        let mut block = Self::new(payload.transactions, payload.arity, payload.prev_hash)?;
        block.set_nonce(payload.nonce);
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_has_empty_prev_hash_and_merkle_root() {
        let genesis = Block::genesis();
        assert_eq!(genesis.prev_hash(), "");
        assert_eq!(genesis.merkle_root(), "");
    }

    #[test]
    fn hash_is_deterministic_for_identical_fields() {
        let a = Block::new(vec![], 2, "abc".into()).unwrap();
        let b = Block::new(vec![], 2, "abc".into()).unwrap();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn set_nonce_changes_the_hash() {
        let mut block = Block::new(vec![], 2, "abc".into()).unwrap();
        let before = block.hash().to_string();
        block.set_nonce(42);
        assert_ne!(before, block.hash());
    }

    #[test]
    fn from_payload_round_trips_through_to_wire() {
        let original = Block::new(
            vec![Transaction::init(0, "pem".into(), 100)],
            2,
            "parent".into(),
        )
        .unwrap();
        let payload = original.to_wire();
        let rebuilt = Block::from_payload(payload).unwrap();
        assert_eq!(original.hash(), rebuilt.hash());
        assert_eq!(original.merkle_root(), rebuilt.merkle_root());
    }
}
