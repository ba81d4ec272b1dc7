use thiserror::Error;

#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("arity must be at least 2, got {0}")]
    ArityTooSmall(usize),

    #[error("failed to hash transaction list: {0}")]
    HashFailed(#[from] bc_crypto::CryptoError),
}
