use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("merkle error: {0}")]
    Merkle(#[from] bc_merkle::MerkleError),

    #[error("transaction error: {0}")]
    Transaction(#[from] bc_transaction::TransactionError),

    #[error("chain store has no genesis block yet")]
    NoGenesis,

    #[error("index {0} not found in chain store")]
    IndexNotFound(usize),

    #[error("block hash does not meet the proof-of-work target")]
    ProofOfWorkNotMet,

    #[error("reconstructed merkle root does not match the block's claimed root")]
    MerkleRootMismatch,

    #[error("block contains a transaction that fails validation")]
    InvalidTransactionInBlock,
}
