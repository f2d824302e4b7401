//! Hash primitives shared by every consensus crate.
//!
//! [`Hash`] is the 32-byte identifier used for blocks and transactions, and
//! [`hashers`] provides the domain-separated BLAKE2b hashers producing it.

pub mod hashers;

pub use hashers::{BlockHash, Hasher, HasherBase, TransactionID};

use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash as StdHash;
use std::str::FromStr;

pub const HASH_SIZE: usize = 32;

/// The all-zero hash
pub const ZERO_HASH: Hash = Hash([0u8; HASH_SIZE]);

/// A 32-byte hash wrapper used across the project.
///
/// Ordering is lexicographic over the raw bytes. Consensus code relies on this
/// order as the final tie-breaker whenever two blocks are otherwise equal.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Create a hash from a 32-byte array
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns raw bytes
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Constructs a hash from four little-endian u64s (used in tests)
    pub const fn from_le_u64(parts: [u64; 4]) -> Self {
        let mut bytes = [0u8; HASH_SIZE];
        let mut i = 0;
        while i < 4 {
            let part = parts[i].to_le_bytes();
            let mut j = 0;
            while j < 8 {
                bytes[i * 8 + j] = part[j];
                j += 1;
            }
            i += 1;
        }
        Self(bytes)
    }

    /// Creates a hash from a single u64 word
    pub const fn from_u64_word(word: u64) -> Self {
        Self::from_le_u64([word, 0, 0, 0])
    }

    /// Tries to create a Hash from a slice of bytes
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, std::array::TryFromSliceError> {
        Ok(Self(slice.try_into()?))
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<Hash> for [u8; HASH_SIZE] {
    fn from(h: Hash) -> Self {
        h.0
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl StdHash for Hash {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // hashes are uniformly distributed, the last word is enough
        let mut le = [0u8; 8];
        le.copy_from_slice(&self.0[24..32]);
        u64::from_le_bytes(le).hash(state);
    }
}

// Human readable formats (config files) carry hashes as hex strings, binary
// formats (the stores) carry the raw bytes.
impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            struct HexVisitor;
            impl Visitor<'_> for HexVisitor {
                type Value = Hash;

                fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.write_str("a 64 character hex string")
                }

                fn visit_str<E: DeError>(self, v: &str) -> Result<Hash, E> {
                    Hash::from_str(v).map_err(E::custom)
                }
            }
            deserializer.deserialize_str(HexVisitor)
        } else {
            <[u8; HASH_SIZE]>::deserialize(deserializer).map(Self)
        }
    }
}
