pub mod hex {
    /// Lowercase hex rendering for byte containers, used in logs and `Display` impls
    pub trait ToHex {
        fn to_hex(&self) -> String;
    }

    impl ToHex for [u8] {
        fn to_hex(&self) -> String {
            hex::encode(self)
        }
    }

    impl ToHex for Vec<u8> {
        fn to_hex(&self) -> String {
            hex::encode(self)
        }
    }

    impl<const N: usize> ToHex for [u8; N] {
        fn to_hex(&self) -> String {
            hex::encode(self)
        }
    }
}

pub use serde_bytes;

/// Serde helpers for `SmallVec<[u8; N]>` fields, carried as a single byte string.
pub mod serde_smallvec_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]> + ?Sized,
    {
        serializer.serialize_bytes(value.as_ref())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: for<'a> From<&'a [u8]>,
    {
        let bytes = serde_bytes::ByteBuf::deserialize(deserializer)?;
        Ok(T::from(bytes.as_slice()))
    }
}
