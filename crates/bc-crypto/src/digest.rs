use sha1::{Digest, Sha1};

/// SHA-1 digest of `bytes`. The protocol is pinned to SHA-1 throughout
/// (signatures and block/Merkle hashing) — see `spec.md` §4.5.
pub fn sha1_digest(bytes: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Hex-encoded SHA-1 digest of `bytes`.
pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(sha1_digest(bytes))
}

/// Interpret a hex-encoded SHA-1 digest as an unsigned 160-bit integer,
/// represented as a big-endian byte array padded to 20 bytes. Used for the
/// proof-of-work target comparison (`int(hash_hex, 16) <= target`).
pub fn hex_to_u160_bytes(hex_digest: &str) -> Option<[u8; 20]> {
    let decoded = hex::decode(hex_digest).ok()?;
    decoded.try_into().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_hex_is_deterministic() {
        assert_eq!(sha1_hex(b"hello"), sha1_hex(b"hello"));
        assert_ne!(sha1_hex(b"hello"), sha1_hex(b"hellp"));
    }

    #[test]
    fn known_vector() {
        // SHA-1("abc") per FIPS 180-1 test vectors.
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89");
    }
}
