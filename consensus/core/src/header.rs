use crate::{hashing, BlockHashSet, Hash};
use serde::{Deserialize, Serialize};

/// Block header as seen by the consensus core.
///
/// Only the fields consumed by GHOSTDAG, reachability and the coinbase
/// rules are carried; the hash is cached and must be refreshed with
/// [`Header::finalize`] after any field is mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Cached hash
    pub hash: Hash,
    pub version: u16,
    pub parents_by_level: Vec<Vec<Hash>>,
    pub hash_merkle_root: Hash,
    /// Timestamp is in milliseconds
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
}

impl Header {
    pub fn new_finalized(
        version: u16,
        parents_by_level: Vec<Vec<Hash>>,
        hash_merkle_root: Hash,
        timestamp: u64,
        bits: u32,
        nonce: u64,
    ) -> Self {
        let mut header = Self {
            hash: Default::default(), // Temp init before the finalize below
            version,
            parents_by_level,
            hash_merkle_root,
            timestamp,
            bits,
            nonce,
        };
        header.finalize();
        header
    }

    /// Finalizes the header and recomputes the header hash
    pub fn finalize(&mut self) {
        self.hash = hashing::header::hash(self);
    }

    pub fn direct_parents(&self) -> &[Hash] {
        match self.parents_by_level.first() {
            Some(parents) => parents,
            None => &[],
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.direct_parents().is_empty()
    }

    /// Returns true when some direct parent appears more than once
    pub fn has_duplicate_parents(&self) -> bool {
        let parents = self.direct_parents();
        parents.iter().copied().collect::<BlockHashSet>().len() != parents.len()
    }

    /// Creates a header with the given hash and direct parents. Used in tests
    /// where building a DAG by hash is more convenient than mining headers.
    pub fn from_precomputed_hash(hash: Hash, parents: Vec<Hash>) -> Header {
        Header {
            version: crate::constants::BLOCK_VERSION,
            hash,
            parents_by_level: vec![parents],
            hash_merkle_root: Default::default(),
            timestamp: 0,
            bits: crate::constants::DEFAULT_TEST_BITS,
            nonce: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_hash_commits_to_fields() {
        let parents = vec![vec![Hash::from_u64_word(1), Hash::from_u64_word(2)]];
        let header = Header::new_finalized(1, parents.clone(), Default::default(), 1_700_000_000_000, 0x207fffff, 7);
        let mut other = Header::new_finalized(1, parents, Default::default(), 1_700_000_000_000, 0x207fffff, 7);
        assert_eq!(header.hash, other.hash);

        other.nonce = 8;
        other.finalize();
        assert_ne!(header.hash, other.hash);
    }

    #[test]
    fn test_duplicate_parents() {
        let a = Hash::from_u64_word(1);
        assert!(Header::from_precomputed_hash(Hash::from_u64_word(9), vec![a, a]).has_duplicate_parents());
        assert!(!Header::from_precomputed_hash(Hash::from_u64_word(9), vec![a]).has_duplicate_parents());
        assert!(Header::from_precomputed_hash(Hash::from_u64_word(9), vec![]).is_genesis());
    }
}
