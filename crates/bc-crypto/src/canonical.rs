use serde::Serialize;

use crate::CryptoError;

/// Serialise `value` as JSON with lexicographically sorted object keys and no
/// extraneous whitespace. This is the canonical byte representation that all
/// signing and hashing in this protocol is computed over.
///
/// Relies on `serde_json::Value`'s object variant being a `BTreeMap` (the
/// default when the `preserve_order` feature is not enabled), which sorts
/// keys on serialisation without any manual key-walking.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, CryptoError> {
    let as_value = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&as_value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Unsorted {
        zeta: u32,
        alpha: u32,
    }

    #[test]
    fn keys_are_sorted_regardless_of_struct_field_order() {
        let bytes = canonical_json(&Unsorted { zeta: 1, alpha: 2 }).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"alpha":2,"zeta":1}"#);
    }

    #[test]
    fn is_deterministic() {
        let a = canonical_json(&Unsorted { zeta: 1, alpha: 2 }).unwrap();
        let b = canonical_json(&Unsorted { zeta: 1, alpha: 2 }).unwrap();
        assert_eq!(a, b);
    }
}
