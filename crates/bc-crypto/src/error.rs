use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("canonical json encoding failed: {0}")]
    Canonicalisation(#[from] serde_json::Error),

    #[error("key generation failed: {0}")]
    KeyGen(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("pem encoding failed: {0}")]
    Pem(String),

    #[error("invalid base64 signature: {0}")]
    Base64(#[from] base64::DecodeError),
}
