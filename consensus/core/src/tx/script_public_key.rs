use dag_utils::hex::ToHex;
use serde::de::{Error, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::str::{self, FromStr};

/// Size of the underlying script vector of a script.
pub const SCRIPT_VECTOR_SIZE: usize = 36;

/// Used as the underlying type for script public key data, optimized for the common p2pk script size (34).
pub type ScriptVec = SmallVec<[u8; SCRIPT_VECTOR_SIZE]>;

/// Represents the ScriptPublicKey Version
pub type ScriptPublicKeyVersion = u16;

/// A versioned locking script. Scripts are opaque to the consensus core: they
/// are carried in coinbase payloads and outputs but never executed here.
#[derive(Default, PartialEq, Eq, Clone, Hash, PartialOrd, Ord)]
pub struct ScriptPublicKey {
    pub version: ScriptPublicKeyVersion,
    script: ScriptVec, // Kept private to preserve read-only semantics
}

impl ScriptPublicKey {
    pub fn new(version: ScriptPublicKeyVersion, script: ScriptVec) -> Self {
        Self { version, script }
    }

    pub fn from_vec(version: ScriptPublicKeyVersion, script: Vec<u8>) -> Self {
        Self { version, script: ScriptVec::from_vec(script) }
    }

    pub fn version(&self) -> ScriptPublicKeyVersion {
        self.version
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }
}

impl fmt::Debug for ScriptPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptPublicKey").field("version", &self.version).field("script", &self.script.to_hex()).finish()
    }
}

impl fmt::Display for ScriptPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.script.to_hex())
    }
}

/// Parses the `version (2 bytes BE) | script` hex form produced by the human readable serializer
impl FromStr for ScriptPublicKey {
    type Err = faster_hex::Error;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        let hex_len = hex_str.len();
        if hex_len < 4 || hex_len % 2 != 0 {
            return Err(faster_hex::Error::InvalidLength(hex_len));
        }
        let mut bytes = vec![0u8; hex_len / 2];
        faster_hex::hex_decode(hex_str.as_bytes(), bytes.as_mut_slice())?;
        let version = u16::from_be_bytes([bytes[0], bytes[1]]);
        Ok(Self { version, script: SmallVec::from_slice(&bytes[2..]) })
    }
}

#[derive(Serialize)]
#[serde(rename = "ScriptPublicKey")]
struct ScriptPublicKeyInternal<'a> {
    version: ScriptPublicKeyVersion,
    #[serde(with = "dag_utils::serde_bytes")]
    script: &'a [u8],
}

impl Serialize for ScriptPublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            let mut hex = vec![0u8; self.script.len() * 2 + 4];
            faster_hex::hex_encode(&self.version.to_be_bytes(), &mut hex).map_err(serde::ser::Error::custom)?;
            faster_hex::hex_encode(&self.script, &mut hex[4..]).map_err(serde::ser::Error::custom)?;
            let hex = str::from_utf8(&hex).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(hex)
        } else {
            ScriptPublicKeyInternal { version: self.version, script: &self.script }.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ScriptPublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScriptPublicKeyVisitor;

        impl Visitor<'_> for ScriptPublicKeyVisitor {
            type Value = ScriptPublicKey;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a hex encoded ScriptPublicKey")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                ScriptPublicKey::from_str(v).map_err(Error::custom)
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_str(ScriptPublicKeyVisitor)
        } else {
            #[derive(Deserialize)]
            struct ScriptPublicKeyOwned {
                version: u16,
                #[serde(with = "dag_utils::serde_bytes")]
                script: Vec<u8>,
            }

            ScriptPublicKeyOwned::deserialize(deserializer)
                .map(|ScriptPublicKeyOwned { script, version }| Self { version, script: SmallVec::from_vec(script) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spk_hex_roundtrip() {
        let spk = ScriptPublicKey::from_vec(0, vec![0x20, 0xab, 0xcd, 0xac]);
        let json = serde_json::to_string(&spk).unwrap();
        assert_eq!(json, "\"000020abcdac\"");
        let parsed: ScriptPublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, spk);
        assert!(ScriptPublicKey::from_str("00").is_err());
    }

    #[test]
    fn test_spk_bincode() {
        let spk = ScriptPublicKey::from_vec(3, vec![1, 2, 3]);
        let bytes = bincode::serialize(&spk).unwrap();
        let decoded: ScriptPublicKey = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, spk);
        assert_eq!(decoded.version(), 3);
    }
}
