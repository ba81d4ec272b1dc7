use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("crypto error: {0}")]
    Crypto(#[from] bc_crypto::CryptoError),

    #[error("transaction error: {0}")]
    Transaction(#[from] bc_transaction::TransactionError),

    #[error("chain error: {0}")]
    Chain(#[from] bc_chain::ChainError),

    #[error("(de)serialisation error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("node {0} has no known public key")]
    UnknownPeer(bc_transaction::NodeId),
}
