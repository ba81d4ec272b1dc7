use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("hashing failed: {0}")]
    Hashing(#[from] bc_crypto::CryptoError),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),
}
