use std::fmt;
use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Content-addressed identifier for a stored blob.
///
/// A `ContentHash` is the BLAKE3 digest of a blob's bytes. Identical bytes
/// always produce the same hash, across processes and store tiers, which is
/// what makes blobs deduplicatable and addresses stable. The extension a
/// blob is stored under never participates in the hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Length of the hex form in characters.
    pub const HEX_LEN: usize = 64;

    /// Digest raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Digest a reader by streaming it through the hasher.
    pub fn from_reader(reader: &mut dyn Read) -> std::io::Result<Self> {
        let mut hasher = ContentHasher::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize())
    }

    /// Wrap a pre-computed digest.
    pub const fn from_hash(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// Serialized as the hex string so envelopes stay human-readable.
impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Incremental BLAKE3 digest.
///
/// Lets `put` hash a source while writing it out, without buffering the
/// whole blob in memory.
pub struct ContentHasher {
    inner: blake3::Hasher,
}

impl ContentHasher {
    /// Start a fresh digest.
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Feed bytes into the digest.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finish and produce the content hash.
    pub fn finalize(self) -> ContentHash {
        ContentHash::from_hash(*self.inner.finalize().as_bytes())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let id1 = ContentHash::from_bytes(b"hello world");
        let id2 = ContentHash::from_bytes(b"hello world");
        assert_eq!(id1, id2);
    }

    #[test]
    fn different_bytes_produce_different_hashes() {
        assert_ne!(
            ContentHash::from_bytes(b"aaa"),
            ContentHash::from_bytes(b"bbb")
        );
    }

    #[test]
    fn hex_roundtrip() {
        let id = ContentHash::from_bytes(b"roundtrip");
        let hex = id.to_hex();
        assert_eq!(hex.len(), ContentHash::HEX_LEN);
        assert_eq!(ContentHash::from_hex(&hex).unwrap(), id);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            ContentHash::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
        assert_eq!(
            ContentHash::from_hex("abcd"),
            Err(TypeError::InvalidLength {
                expected: 32,
                actual: 2
            })
        );
    }

    #[test]
    fn streaming_matches_one_shot() {
        let data = b"some longer content that spans a few words";
        let mut hasher = ContentHasher::new();
        hasher.update(&data[..10]);
        hasher.update(&data[10..]);
        assert_eq!(hasher.finalize(), ContentHash::from_bytes(data));

        let mut reader: &[u8] = data;
        assert_eq!(
            ContentHash::from_reader(&mut reader).unwrap(),
            ContentHash::from_bytes(data)
        );
    }

    #[test]
    fn serde_as_hex_string() {
        let id = ContentHash::from_bytes(b"df");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn short_hex_is_prefix() {
        let id = ContentHash::from_bytes(b"prefix");
        assert!(id.to_hex().starts_with(&id.short_hex()));
        assert_eq!(id.short_hex().len(), 8);
    }
}
