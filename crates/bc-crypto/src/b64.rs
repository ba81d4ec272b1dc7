//! `serde(with = "bc_crypto::b64")` helper for encoding a `Vec<u8>` signature
//! as a base64 string on the wire, per `spec.md` §6
//! (`"signature": base64-pkcs1v15-sha1`).

use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    base64::engine::general_purpose::STANDARD
        .encode(bytes)
        .serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(serde::de::Error::custom)
}
