use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};

use crate::CryptoError;

/// Bit length mandated by the protocol (`spec.md` §4.5).
pub const KEY_BITS: usize = 1024;

/// A node's signing identity: an RSA key pair used to sign outgoing
/// transactions and blocks. The public half is published to every other node
/// once at startup (see `spec.md` §5, "publication-safe reads").
pub struct Wallet {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl Wallet {
    /// Generate a fresh 1024-bit RSA key pair.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|e| CryptoError::KeyGen(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);
        Ok(Self {
            private_key,
            public_key,
        })
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Sign the SHA-1 digest of `canonical_payload` with PKCS#1 v1.5.
    pub fn sign(&self, canonical_payload: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let digest = Sha1::digest(canonical_payload);
        self.private_key
            .sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))
    }
}

/// Verify a PKCS#1 v1.5/SHA-1 `signature` over `canonical_payload` against
/// `public_key`. Returns `false` rather than an error on any mismatch or
/// malformed signature — verification failure is never fatal (`spec.md` §7).
pub fn verify(public_key: &RsaPublicKey, canonical_payload: &[u8], signature: &[u8]) -> bool {
    let digest = Sha1::digest(canonical_payload);
    public_key
        .verify(Pkcs1v15Sign::new::<Sha1>(), &digest, signature)
        .is_ok()
}

/// PEM-encode a public key for storage in the shared peer-id → key table.
pub fn public_key_to_pem(public_key: &RsaPublicKey) -> Result<String, CryptoError> {
    public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::Pem(e.to_string()))
}

/// Parse a PEM-encoded public key.
pub fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    RsaPublicKey::from_public_key_pem(pem).map_err(|e| CryptoError::Pem(e.to_string()))
}
