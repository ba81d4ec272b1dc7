use num_bigint::BigUint;
use tracing::debug;

use bc_transaction::{Transaction, TransactionKind};

use crate::block::{Block, BlockPayload};
use crate::chain_store::ChainStore;
use crate::error::ChainError;
use crate::mempool::Mempool;

/// Construction parameters for a `Engine` (`spec.md` §4.4).
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub block_length: usize,
    pub difficulty: u32,
    pub arity: usize,
    pub init_amount: u64,
    pub reward: u64,
}

/// The Protocol Engine: owns the `ChainStore` and `Mempool`, validates
/// incoming transactions and blocks, and runs the proof-of-work search
/// (`spec.md` §4.4).
pub struct Engine {
    config: EngineConfig,
    store: ChainStore,
    mempool: Mempool,
}

impl Engine {
    /// Construct a new engine, initialising the Chain Store with genesis.
    pub fn new(config: EngineConfig) -> Self {
        let mut store = ChainStore::new();
        store.append(Block::genesis());
        Self {
            config,
            store,
            mempool: Mempool::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ChainStore {
        &self.store
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    /// The proof-of-work acceptance target, `2^(160 - difficulty)`
    /// (`spec.md` §4.4 "Target rule"). `num_bigint::BigUint` is used rather
    /// than manual bit-shifting so the comparison is exact at every
    /// power-of-two boundary.
    fn target(&self) -> BigUint {
        BigUint::from(1u32) << (160 - self.config.difficulty)
    }

    fn meets_target(&self, hash_hex: &str) -> bool {
        match BigUint::parse_bytes(hash_hex.as_bytes(), 16) {
            Some(value) => value <= self.target(),
            None => false,
        }
    }

    /// `spec.md` §4.4 `validate_transaction`. `TRANSFER`/`MINE` are
    /// accept-all beyond structural well-formedness — the engine exposes
    /// the hook but does not enforce UTXO validity (`spec.md` §4.4, §9).
    pub fn validate_transaction(&self, tx: &Transaction) -> bool {
        match tx.kind {
            TransactionKind::Init => {
                if tx.amount != self.config.init_amount {
                    return false;
                }
                if self.store.main_chain().len() > 1 {
                    return false;
                }
                if self.mempool.has_pending_init_for(tx.receiver_id) {
                    return false;
                }
                true
            }
            TransactionKind::Transfer | TransactionKind::Mine => true,
        }
    }

    /// `spec.md` §4.4 `validate_block`. The fork-aware variant: step 1 (new
    /// block's `prev_hash` must equal the current main tip) is dropped, so
    /// blocks extending a shorter, non-main branch are still accepted —
    /// required for orphan parking and reorg (`spec.md` §4.3, scenarios
    /// S2/S3). See `DESIGN.md` for the recorded choice between the two
    /// variants `spec.md` §9 leaves open.
    pub fn validate_block(&self, payload: BlockPayload) -> Result<Block, ChainError> {
        let claimed_root = payload.merkle_root.clone();
        let block = Block::from_payload(payload)?;

        if !self.meets_target(block.hash()) {
            return Err(ChainError::ProofOfWorkNotMet);
        }

        if block.merkle_root() != claimed_root {
            return Err(ChainError::MerkleRootMismatch);
        }

        for tx in block.transactions() {
            if !self.validate_transaction(tx) {
                return Err(ChainError::InvalidTransactionInBlock);
            }
        }

        Ok(block)
    }

    /// Parse and validate `tx`, appending it to the mempool on success.
    /// Returns whether the mempool now holds exactly `block_length`
    /// entries — the caller's signal that miners should start work
    /// (`spec.md` §4.4 `add_transaction`).
    pub fn add_transaction(&mut self, tx: Transaction) -> bool {
        if !self.validate_transaction(&tx) {
            debug!(sender = tx.sender, kind = ?tx.kind, "transaction failed validation, dropped");
            return false;
        }
        self.mempool.push(tx);
        self.mempool.len() == self.config.block_length
    }

    /// Validate and hand `block` to the Chain Store. Returns whether the
    /// block was accepted (`spec.md` §4.4 `add_block`).
    pub fn add_block(&mut self, payload: BlockPayload) -> Result<bool, ChainError> {
        let block = match self.validate_block(payload) {
            Ok(block) => block,
            Err(err @ (ChainError::ProofOfWorkNotMet
            | ChainError::InvalidTransactionInBlock
            | ChainError::MerkleRootMismatch
            | ChainError::Merkle(_))) => {
                debug!(%err, "block failed validation, rejected");
                return Ok(false);
            }
            Err(other) => return Err(other),
        };
        // A block that parks as an orphan is still valid (`spec.md` §7: "valid
        // but parentless; parked, not an error") so acceptance does not hinge
        // on `AppendOutcome`.
        self.store.append(block);
        Ok(true)
    }

    /// Take the first `block_length` mempool entries, append `reward_tx`
    /// last, and search for a nonce meeting the proof-of-work target,
    /// starting from `prev_hash` = the current main tip's hash
    /// (`spec.md` §4.4 `proof_of_work`). Returns `None` if the full
    /// `u32` nonce space is exhausted without success.
    pub fn proof_of_work(&mut self, reward_tx: Transaction) -> Result<Option<Block>, ChainError> {
        let mut transactions = self.mempool.take_front(self.config.block_length);
        transactions.push(reward_tx);

        let prev_hash = self
            .store
            .tip()
            .map(|block| block.hash().to_string())
            .ok_or(ChainError::NoGenesis)?;

        let mut block = Block::new(transactions, self.config.arity, prev_hash)?;

        let mut nonce: u32 = 0;
        loop {
            block.set_nonce(nonce);
            if self.meets_target(block.hash()) {
                return Ok(Some(block));
            }
            match nonce.checked_add(1) {
                Some(next) => nonce = next,
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bc_crypto::Wallet;
    use bc_transaction::SignedEnvelope;

    fn config() -> EngineConfig {
        EngineConfig {
            block_length: 2,
            difficulty: 1,
            arity: 2,
            init_amount: 100,
            reward: 10,
        }
    }

    #[test]
    fn init_rejected_once_chain_has_grown_past_genesis() {
        let mut engine = Engine::new(config());
        let genesis_hash = engine.store().tip().unwrap().hash().to_string();
        let mut mined_block = Block::new(vec![], 2, genesis_hash).unwrap();
        for nonce in 0..4096u32 {
            mined_block.set_nonce(nonce);
            if engine.meets_target(mined_block.hash()) {
                break;
            }
        }
        engine.store.append(mined_block);

        let late_init = Transaction::init(0, "pem".into(), 100);
        assert!(!engine.validate_transaction(&late_init));
    }

    #[test]
    fn init_rejected_when_amount_does_not_match_configured_init_amount() {
        let engine = Engine::new(config());
        let tx = Transaction::init(0, "pem".into(), 999);
        assert!(!engine.validate_transaction(&tx));
    }

    #[test]
    fn second_pending_init_for_the_same_receiver_is_rejected() {
        let mut engine = Engine::new(config());
        let first = Transaction::init(0, "pem-0".into(), 100);
        assert!(engine.add_transaction(first));

        let second = Transaction::init(0, "pem-0-again".into(), 100);
        assert!(!engine.validate_transaction(&second));
    }

    #[test]
    fn add_transaction_signals_when_mempool_reaches_block_length() {
        let mut engine = Engine::new(config());
        let first = Transaction::transfer(0, "pem".into(), 1, 1, vec!["h".into()], 0);
        assert!(!engine.add_transaction(first));
        let second = Transaction::transfer(1, "pem".into(), 0, 1, vec!["h2".into()], 0);
        assert!(engine.add_transaction(second));
    }

    #[test]
    fn proof_of_work_produces_a_block_meeting_the_target() {
        let mut engine = Engine::new(config());
        engine.add_transaction(Transaction::transfer(0, "a".into(), 1, 1, vec!["h".into()], 0));
        engine.add_transaction(Transaction::transfer(1, "b".into(), 0, 1, vec!["h2".into()], 0));

        let reward = Transaction::mine(0, "pem-0".into(), engine.config().reward);
        let mined = engine.proof_of_work(reward).unwrap().expect("low difficulty should find a block quickly");
        assert!(engine.meets_target(mined.hash()));
    }

    #[test]
    fn add_block_accepts_a_block_meeting_the_target_and_rejects_a_tampered_one() {
        let mut engine = Engine::new(config());
        engine.add_transaction(Transaction::transfer(0, "a".into(), 1, 1, vec!["h".into()], 0));
        engine.add_transaction(Transaction::transfer(1, "b".into(), 0, 1, vec!["h2".into()], 0));
        let reward = Transaction::mine(0, "pem-0".into(), engine.config().reward);
        let mined = engine.proof_of_work(reward).unwrap().unwrap();

        let accepted = engine.add_block(mined.to_wire()).unwrap();
        assert!(accepted);

        let mut bad_payload = engine.store().tip().unwrap().to_wire();
        bad_payload.nonce = bad_payload.nonce.wrapping_add(1);
        let rejected = engine.add_block(bad_payload).unwrap();
        assert!(!rejected);
    }

    #[test]
    fn signed_envelope_round_trips_for_a_transaction_payload() {
        let wallet = Wallet::generate().unwrap();
        let tx = Transaction::init(0, "pem".into(), 100);
        let envelope = SignedEnvelope::sign(tx, &wallet).unwrap();
        assert!(envelope.authenticate(&wallet.public_key()).unwrap());
    }
}
