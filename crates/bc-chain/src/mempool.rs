use std::collections::VecDeque;

use bc_transaction::{NodeId, Transaction, TransactionKind};

/// The pending-transaction queue a node accumulates between blocks
/// (`spec.md` §4.4, §4.5). FIFO: transactions are mined in arrival order.
#[derive(Debug, Default)]
pub struct Mempool {
    pending: VecDeque<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transaction: Transaction) {
        self.pending.push_back(transaction);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the oldest `n` transactions, fewer if the mempool
    /// does not hold that many.
    pub fn take_front(&mut self, n: usize) -> Vec<Transaction> {
        let n = n.min(self.pending.len());
        self.pending.drain(..n).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.pending.iter()
    }

    /// Whether an `Init` transaction for `receiver` is already pending
    /// (`spec.md` §8 invariant: at most one `Init` allocation per node).
    pub fn has_pending_init_for(&self, receiver: NodeId) -> bool {
        self.pending
            .iter()
            .any(|tx| tx.kind == TransactionKind::Init && tx.receiver_id == receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_front_removes_in_fifo_order() {
        let mut pool = Mempool::new();
        pool.push(Transaction::init(0, "a".into(), 1));
        pool.push(Transaction::init(1, "b".into(), 2));
        pool.push(Transaction::init(2, "c".into(), 3));

        let taken = pool.take_front(2);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].sender, 0);
        assert_eq!(taken[1].sender, 1);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn take_front_saturates_at_available_length() {
        let mut pool = Mempool::new();
        pool.push(Transaction::init(0, "a".into(), 1));
        let taken = pool.take_front(10);
        assert_eq!(taken.len(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn detects_a_pending_init_for_a_given_receiver() {
        let mut pool = Mempool::new();
        assert!(!pool.has_pending_init_for(4));
        pool.push(Transaction::init(4, "pem".into(), 100));
        assert!(pool.has_pending_init_for(4));
    }
}
