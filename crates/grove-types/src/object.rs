use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};

use crate::error::TypeError;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is the SHA-1 hash of an object's canonical bytes. Identical
/// content always produces the same `ObjectId`, making objects deduplicatable
/// and verifiable.
///
/// The id is held as raw bytes and only rendered to hex on the way out, so
/// ids whose binary form starts with zero bytes keep every leading `0` nibble.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ObjectId::LEN]);

impl ObjectId {
    /// Length of the raw hash in bytes.
    pub const LEN: usize = 20;

    /// Length of the hex rendering.
    pub const HEX_LEN: usize = 40;

    /// Compute an `ObjectId` by hashing raw bytes.
    pub fn hash(data: &[u8]) -> Self {
        let digest = Sha1::digest(data);
        let mut arr = [0u8; Self::LEN];
        arr.copy_from_slice(&digest);
        Self(arr)
    }

    /// Create an `ObjectId` from a pre-computed hash.
    pub const fn from_raw(raw: [u8; Self::LEN]) -> Self {
        Self(raw)
    }

    /// Create an `ObjectId` from a byte slice that must be exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() != Self::LEN {
            return Err(TypeError::InvalidLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; Self::LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// The null object ID (all zeros).
    pub const fn null() -> Self {
        Self([0u8; Self::LEN])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; Self::LEN]
    }

    /// The raw 20-byte hash.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase, zero-padded 40-character hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 7 characters).
    pub fn short_hex(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(7);
        s
    }

    /// Parse from a 40-character hex string. Either case is accepted.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidLength {
                expected: Self::HEX_LEN,
                actual: s.len(),
            });
        }
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Returns `true` if `s` is non-empty and made only of hex digits.
    pub fn is_hex(s: &str) -> bool {
        !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// Serialized as the 40-character hex string, matching every textual
// rendering of an id.
impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl From<[u8; ObjectId::LEN]> for ObjectId {
    fn from(bytes: [u8; ObjectId::LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; ObjectId::LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(ObjectId::hash(data), ObjectId::hash(data));
    }

    #[test]
    fn different_data_produces_different_ids() {
        assert_ne!(ObjectId::hash(b"hello"), ObjectId::hash(b"world"));
    }

    #[test]
    fn known_blob_digest() {
        // Canonical form of a blob holding "test\n".
        let id = ObjectId::hash(b"blob 5\0test\n");
        assert_eq!(id.to_hex(), "9daeafb9864cf43055ae93beb0afd6c7d144bfa4");
    }

    #[test]
    fn null_is_all_zeros() {
        let null = ObjectId::null();
        assert!(null.is_null());
        assert_eq!(null.to_hex(), "0".repeat(40));
    }

    #[test]
    fn leading_zero_bytes_survive_hex() {
        let mut raw = [0u8; 20];
        raw[19] = 1;
        let id = ObjectId::from_raw(raw);
        let hex = id.to_hex();
        assert_eq!(hex.len(), 40);
        assert_eq!(hex, format!("{}01", "0".repeat(38)));
        assert_eq!(ObjectId::from_hex(&hex).unwrap(), id);
    }

    #[test]
    fn from_hex_accepts_uppercase() {
        let id = ObjectId::hash(b"case");
        let upper = id.to_hex().to_uppercase();
        let parsed = ObjectId::from_hex(&upper).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.to_hex(), id.to_hex());
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = ObjectId::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 40,
                actual: 4
            }
        );
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        let bad = "z".repeat(40);
        assert!(matches!(
            ObjectId::from_hex(&bad),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn is_hex_checks_digits() {
        assert!(ObjectId::is_hex("deadBEEF"));
        assert!(!ObjectId::is_hex(""));
        assert!(!ObjectId::is_hex("HEAD"));
    }

    #[test]
    fn short_hex_is_7_chars() {
        assert_eq!(ObjectId::hash(b"test").short_hex().len(), 7);
    }

    #[test]
    fn serde_roundtrip() {
        let id = ObjectId::hash(b"serde test");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let parsed: ObjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    proptest! {
        #[test]
        fn hex_always_40_chars(raw in proptest::array::uniform20(any::<u8>())) {
            let id = ObjectId::from_raw(raw);
            let hex = id.to_hex();
            prop_assert_eq!(hex.len(), 40);
            prop_assert_eq!(ObjectId::from_hex(&hex).unwrap(), id);
        }
    }
}
