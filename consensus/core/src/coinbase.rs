use crate::tx::{ScriptPublicKey, Transaction};
use dag_utils::serde_bytes;
use serde::{Deserialize, Serialize};

/// What a miner commits to in its coinbase payload besides the score and subsidy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinerData {
    pub script_public_key: ScriptPublicKey,
    #[serde(with = "serde_bytes")]
    pub extra_data: Vec<u8>,
}

impl MinerData {
    pub fn new(script_public_key: ScriptPublicKey, extra_data: Vec<u8>) -> Self {
        Self { script_public_key, extra_data }
    }
}

/// The decoded content of a coinbase payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseData {
    pub blue_score: u64,
    pub subsidy: u64,
    pub miner_data: MinerData,
}

/// The coinbase transaction a block is expected to carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinbaseTransactionTemplate {
    pub tx: Transaction,
    /// Whether an aggregate output paying the rewards of red merged blocks was added
    pub has_red_reward: bool,
}

pub const LENGTH_OF_BLUE_SCORE: usize = std::mem::size_of::<u64>();
pub const LENGTH_OF_SUBSIDY: usize = std::mem::size_of::<u64>();
pub const LENGTH_OF_SCRIPT_PUB_KEY_VERSION: usize = std::mem::size_of::<u16>();
pub const LENGTH_OF_SCRIPT_PUB_KEY_LENGTH: usize = std::mem::size_of::<u8>();

/// Length of a coinbase payload carrying an empty script and no extra data
pub const MIN_PAYLOAD_LENGTH: usize =
    LENGTH_OF_BLUE_SCORE + LENGTH_OF_SUBSIDY + LENGTH_OF_SCRIPT_PUB_KEY_VERSION + LENGTH_OF_SCRIPT_PUB_KEY_LENGTH;
