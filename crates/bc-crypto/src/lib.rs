pub mod b64;
pub mod canonical;
pub mod digest;
pub mod error;
pub mod keys;

pub use canonical::canonical_json;
pub use digest::{hex_to_u160_bytes, sha1_digest, sha1_hex};
pub use error::CryptoError;
pub use keys::{public_key_from_pem, public_key_to_pem, verify, Wallet, KEY_BITS};

pub use rsa::RsaPublicKey;
