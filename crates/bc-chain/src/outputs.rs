use std::collections::HashSet;

use bc_transaction::{NodeId, Transaction, TransactionError, TransactionKind};

/// A single unspent output a node can later reference as an `input`
/// (`spec.md` §4.6 step 1, §9's "UTXO-like output selection").
///
/// `hash` is the owning transaction's `content_hash()`. A `Transfer` that
/// pays one node and returns change to another produces two distinct
/// owners but the *same* hash for both — the protocol has no per-output
/// index, only a per-transaction one. This is only ambiguous for
/// self-transfers (sender paying themselves), which `validate_transaction`
/// rejects before they reach the mempool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub hash: String,
    pub value: u64,
}

/// The result of greedy input selection for a pending amount (`spec.md`
/// §4.6 step 2, §8 invariant "greedy output selection").
pub struct Selection {
    pub inputs: Vec<String>,
    pub change: u64,
}

/// Compute every output `owner` currently holds and has not already spent,
/// scanning `confirmed` (main-chain transactions, oldest first) followed by
/// `pending` (mempool transactions) in the same order the node would see
/// them applied.
pub fn unspent_outputs_for<'a>(
    owner: NodeId,
    confirmed: impl Iterator<Item = &'a Transaction>,
    pending: impl Iterator<Item = &'a Transaction>,
) -> Result<Vec<Output>, TransactionError> {
    let all: Vec<&Transaction> = confirmed.chain(pending).collect();

    let mut spent = HashSet::new();
    for tx in &all {
        for input in &tx.inputs {
            spent.insert(input.clone());
        }
    }

    let mut owned = Vec::new();
    for tx in &all {
        let hash = tx.content_hash()?;
        if tx.receiver_id == owner && !spent.contains(&hash) {
            owned.push(Output {
                hash: hash.clone(),
                value: tx.amount,
            });
        }
        if tx.kind == TransactionKind::Transfer && tx.sender == owner && tx.change > 0 && !spent.contains(&hash) {
            owned.push(Output { hash, value: tx.change });
        }
    }
    Ok(owned)
}

/// Greedily select inputs covering `amount` from `available` (`spec.md` §4.6
/// step 2 / §8's greedy-selection invariant): a tightest-fit single output
/// `>= amount` if one exists, otherwise a descending-sorted accumulation of
/// outputs `< amount`. Returns `None` if no combination covers `amount`.
pub fn select_inputs(available: &[Output], amount: u64) -> Option<Selection> {
    let (mut at_least, mut below): (Vec<&Output>, Vec<&Output>) =
        available.iter().partition(|output| output.value >= amount);

    if !at_least.is_empty() {
        at_least.sort_by_key(|output| output.value);
        let chosen = at_least[0];
        return Some(Selection {
            inputs: vec![chosen.hash.clone()],
            change: chosen.value - amount,
        });
    }

    below.sort_by_key(|output| std::cmp::Reverse(output.value));
    let mut accumulated = 0u64;
    let mut inputs = Vec::new();
    for output in below {
        accumulated += output.value;
        inputs.push(output.hash.clone());
        if accumulated >= amount {
            return Some(Selection {
                inputs,
                change: accumulated - amount,
            });
        }
    }
    None
}
