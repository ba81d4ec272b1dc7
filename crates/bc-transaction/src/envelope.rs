use std::fmt;
use std::marker::PhantomData;

use base64::Engine;
use bc_crypto::{RsaPublicKey, Wallet};
use serde::de::{DeserializeOwned, Error as DeError, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::TransactionError;

/// The wire field name a payload type nests under inside a `SignedEnvelope`
/// (`spec.md` §6: `"tx"` for transaction envelopes, `"blk"` for block
/// envelopes).
pub trait WirePayload {
    const FIELD: &'static str;
}

/// `{"<tx|blk>": payload, "signature": base64}` — the sender's PKCS#1
/// v1.5/SHA-1 signature over the canonical JSON of `payload` (`spec.md` §3,
/// "Signed envelope"; §6 fixes the payload field name per message kind).
#[derive(Debug, Clone)]
pub struct SignedEnvelope<T> {
    pub payload: T,
    pub signature: Vec<u8>,
}

impl<T: Serialize> SignedEnvelope<T> {
    /// Sign `payload` with `wallet` and wrap it in an envelope.
    pub fn sign(payload: T, wallet: &Wallet) -> Result<Self, TransactionError> {
        let canonical = bc_crypto::canonical_json(&payload)?;
        let signature = wallet.sign(&canonical)?;
        Ok(Self { payload, signature })
    }

    /// Verify this envelope's signature against `sender_public_key`.
    pub fn authenticate(&self, sender_public_key: &RsaPublicKey) -> Result<bool, TransactionError> {
        let canonical = bc_crypto::canonical_json(&self.payload)?;
        Ok(bc_crypto::verify(sender_public_key, &canonical, &self.signature))
    }
}

impl<T: Serialize + WirePayload> Serialize for SignedEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(T::FIELD, &self.payload)?;
        map.serialize_entry(
            "signature",
            &base64::engine::general_purpose::STANDARD.encode(&self.signature),
        )?;
        map.end()
    }
}

impl<'de, T: DeserializeOwned + WirePayload> Deserialize<'de> for SignedEnvelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EnvelopeVisitor<T>(PhantomData<T>);

        impl<'de, T: DeserializeOwned + WirePayload> Visitor<'de> for EnvelopeVisitor<T> {
            type Value = SignedEnvelope<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a signed envelope with fields \"{}\" and \"signature\"", T::FIELD)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut payload = None;
                let mut signature = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == T::FIELD {
                        payload = Some(map.next_value()?);
                    } else if key == "signature" {
                        let encoded: String = map.next_value()?;
                        signature = Some(
                            base64::engine::general_purpose::STANDARD
                                .decode(encoded)
                                .map_err(A::Error::custom)?,
                        );
                    } else {
                        let _: IgnoredAny = map.next_value()?;
                    }
                }
                Ok(SignedEnvelope {
                    payload: payload.ok_or_else(|| A::Error::missing_field(T::FIELD))?,
                    signature: signature.ok_or_else(|| A::Error::missing_field("signature"))?,
                })
            }
        }

        deserializer.deserialize_map(EnvelopeVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transaction;

    #[test]
    fn signed_envelope_round_trips() {
        let wallet = Wallet::generate().unwrap();
        let tx = Transaction::init(0, "pem".into(), 100);
        let envelope = SignedEnvelope::sign(tx, &wallet).unwrap();
        assert!(envelope.authenticate(wallet.public_key()).unwrap());
    }

    #[test]
    fn wire_shape_nests_the_payload_under_tx() {
        let wallet = Wallet::generate().unwrap();
        let tx = Transaction::init(0, "pem".into(), 100);
        let envelope = SignedEnvelope::sign(tx, &wallet).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("tx").is_some());
        assert!(json.get("signature").is_some());
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn tampered_payload_fails_authentication() {
        let wallet = Wallet::generate().unwrap();
        let tx = Transaction::init(0, "pem".into(), 100);
        let mut envelope = SignedEnvelope::sign(tx, &wallet).unwrap();
        envelope.payload.amount += 1;
        assert!(!envelope.authenticate(wallet.public_key()).unwrap());
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let wallet = Wallet::generate().unwrap();
        let other = Wallet::generate().unwrap();
        let tx = Transaction::init(0, "pem".into(), 100);
        let envelope = SignedEnvelope::sign(tx, &wallet).unwrap();
        assert!(!envelope.authenticate(other.public_key()).unwrap());
    }
}
