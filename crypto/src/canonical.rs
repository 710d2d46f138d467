//! Canonical serialization
//!
//! Every hash input in tally derives from exactly one serialization form:
//! compact JSON with fields in struct declaration order, fixed-width
//! lowercase hex for curve material, and ordered maps. Byte-identical
//! output for structurally equal values is part of the wire contract, so
//! any change here changes every receipt hash and shard checksum.

use serde::Serialize;

/// Canonical byte form of a value.
pub fn to_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    // Ledger types are plain structs, vectors, and string-keyed maps;
    // compact JSON cannot fail for them.
    serde_json::to_vec(value).expect("canonical serialization is infallible for ledger types")
}

/// Canonical string form of a value.
pub fn to_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("canonical serialization is infallible for ledger types")
}

/// Serde adapter: `[u8; 32]` as fixed-width lowercase hex.
pub mod hex_array {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(deserializer)?;
        let raw = hex::decode(&text).map_err(serde::de::Error::custom)?;
        raw.try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes of hex"))
    }
}
