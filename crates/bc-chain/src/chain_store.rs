use tracing::{debug, info};

use crate::block::Block;
use crate::error::ChainError;

/// An entry in the arena: the block itself plus the arena index of its
/// parent. `None` only for the genesis entry.
struct Entry {
    block: Block,
    parent: Option<usize>,
}

/// The outcome of appending a block, reported back to the caller so it can
/// decide whether to rebroadcast, log a reorg, or do nothing further.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The very first block accepted; becomes both tip and genesis.
    Genesis,
    /// Extended the current main chain; arena index of the new tip.
    Extended(usize),
    /// Extended a chain strictly longer than the current main chain,
    /// causing a reorg; arena index of the new tip.
    Reorged(usize),
    /// Extended a known chain, but it remains no longer than main; arena
    /// index of the new (non-main) block.
    Forked(usize),
    /// No known block in the store has this hash as its own hash, so the
    /// block is parked pending its parent's arrival.
    Orphaned,
}

/// A fork-tolerant store of every block ever accepted, arranged as an arena
/// of `(Block, parent index)` pairs (`spec.md` §4.3).
///
/// `validate_block` (in `engine.rs`) deliberately does not require a new
/// block's `prev_hash` to match the current main tip — blocks that extend a
/// shorter, non-main chain are still accepted here and may later cause a
/// reorg once their chain overtakes main. This is the fork-aware reading of
/// `spec.md` §4.4 step 1, chosen because orphan parking and reorg (§4.3) and
/// scenarios S2/S3 require accepting blocks that do not match the current
/// tip. See `DESIGN.md`.
#[derive(Default)]
pub struct ChainStore {
    entries: Vec<Entry>,
    main: Option<usize>,
    orphans: Vec<Block>,
}

impl ChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hop count from genesis to `index`, inclusive of both ends.
    pub fn length_to_genesis(&self, index: usize) -> usize {
        let mut length = 1;
        let mut current = index;
        while let Some(parent) = self.entries[current].parent {
            length += 1;
            current = parent;
        }
        length
    }

    pub fn tip(&self) -> Option<&Block> {
        self.main.map(|index| &self.entries[index].block)
    }

    pub fn tip_index(&self) -> Option<usize> {
        self.main
    }

    pub fn block_at(&self, index: usize) -> Result<&Block, ChainError> {
        self.entries
            .get(index)
            .map(|entry| &entry.block)
            .ok_or(ChainError::IndexNotFound(index))
    }

    pub fn orphans(&self) -> &[Block] {
        &self.orphans
    }

    /// The main chain, genesis first, tip last.
    pub fn main_chain(&self) -> Vec<&Block> {
        let Some(tip) = self.main else {
            return Vec::new();
        };
        let mut chain = Vec::new();
        let mut current = Some(tip);
        while let Some(index) = current {
            chain.push(&self.entries[index].block);
            current = self.entries[index].parent;
        }
        chain.reverse();
        chain
    }

    /// Hashes of the main chain, genesis first, tip last — what the node's
    /// state log records (`spec.md` §7 `"Chain: "` line).
    pub fn main_chain_hashes(&self) -> Vec<String> {
        self.main_chain()
            .into_iter()
            .map(|block| block.hash().to_string())
            .collect()
    }

    /// Searches existing entries latest-first (`spec.md` §4.3 `append`), so a
    /// hash shared by more than one entry resolves to the most recently
    /// appended one.
    fn find_by_hash(&self, hash: &str) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.block.hash() == hash)
    }

    /// Insert `block`, updating the main tip if the chain it extends becomes
    /// the longest known, parking it as an orphan if its parent is unknown,
    /// and cascading adoption of any previously-orphaned blocks that can now
    /// attach. The first block ever appended is always treated as genesis.
    pub fn append(&mut self, block: Block) -> AppendOutcome {
        if self.entries.is_empty() {
            self.entries.push(Entry { block, parent: None });
            self.main = Some(0);
            self.adopt_pending_orphans();
            return AppendOutcome::Genesis;
        }

        let outcome = self.insert_one(block);
        if !matches!(outcome, AppendOutcome::Orphaned) {
            self.adopt_pending_orphans();
        }
        outcome
    }

    fn insert_one(&mut self, block: Block) -> AppendOutcome {
        let Some(parent_index) = self.find_by_hash(block.prev_hash()) else {
            debug!(hash = block.hash(), "parent not yet known, parking as orphan");
            self.orphans.push(block);
            return AppendOutcome::Orphaned;
        };

        let index = self.entries.len();
        let candidate_length = self.length_to_genesis(parent_index) + 1;
        self.entries.push(Entry {
            block,
            parent: Some(parent_index),
        });

        let main_length = self.main.map(|tip| self.length_to_genesis(tip)).unwrap_or(0);
        if candidate_length > main_length {
            let was_main = self.main == Some(parent_index);
            self.main = Some(index);
            if was_main {
                AppendOutcome::Extended(index)
            } else {
                info!(new_tip = index, candidate_length, main_length, "chain reorganised onto a longer fork");
                AppendOutcome::Reorged(index)
            }
        } else {
            debug!(index, candidate_length, main_length, "block accepted onto a non-main fork");
            AppendOutcome::Forked(index)
        }
    }

    /// After any successful insert, repeatedly scan `orphans` for blocks
    /// whose parent has now arrived, attaching as many as possible in one
    /// pass per round until a round attaches nothing.
    fn adopt_pending_orphans(&mut self) {
        loop {
            let mut adopted_any = false;
            let pending = std::mem::take(&mut self.orphans);
            for orphan in pending {
                match self.find_by_hash(orphan.prev_hash()) {
                    Some(_) => {
                        self.insert_one(orphan);
                        adopted_any = true;
                    }
                    None => self.orphans.push(orphan),
                }
            }
            if !adopted_any {
                break;
            }
        }
    }
}
