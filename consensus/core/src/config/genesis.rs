use crate::{constants::BLOCK_VERSION, header::Header, Hash, ZERO_HASH};
use serde::{Deserialize, Serialize};

/// The constants uniquely representing the genesis block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBlock {
    pub hash: Hash,
    /// Timestamp in milliseconds
    pub timestamp: u64,
    pub bits: u32,
    pub nonce: u64,
}

impl GenesisBlock {
    /// Builds the genesis description from its header fields, deriving the hash
    pub fn new(timestamp: u64, bits: u32, nonce: u64) -> Self {
        let hash = Self::build_header(timestamp, bits, nonce).hash;
        Self { hash, timestamp, bits, nonce }
    }

    /// The genesis header. Its hash equals `self.hash` for any valid configuration.
    pub fn header(&self) -> Header {
        Self::build_header(self.timestamp, self.bits, self.nonce)
    }

    fn build_header(timestamp: u64, bits: u32, nonce: u64) -> Header {
        Header::new_finalized(BLOCK_VERSION, Vec::new(), ZERO_HASH, timestamp, bits, nonce)
    }
}

pub fn mainnet_genesis() -> GenesisBlock {
    GenesisBlock::new(1_699_545_600_000, 0x1e7f_ffff, 0x3392c)
}

pub fn testnet_genesis() -> GenesisBlock {
    GenesisBlock::new(1_699_632_000_000, 0x1e7f_ffff, 0x1ad42)
}

pub fn devnet_genesis() -> GenesisBlock {
    GenesisBlock::new(1_699_718_400_000, crate::constants::DEFAULT_TEST_BITS, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_hash_matches_header() {
        for genesis in [mainnet_genesis(), testnet_genesis(), devnet_genesis()] {
            let header = genesis.header();
            assert_eq!(header.hash, genesis.hash);
            assert!(header.is_genesis());
        }
        assert_ne!(mainnet_genesis().hash, testnet_genesis().hash);
    }
}
