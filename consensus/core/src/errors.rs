use crate::Hash;
use thiserror::Error;

/// Consensus rule violations that can be discovered while computing
/// GHOSTDAG data or the expected coinbase of a block. These are caused by
/// the block itself and lead to its rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("block has no parents")]
    NoParents,

    #[error("genesis header must not have parents")]
    GenesisWithParents,

    #[error("block has duplicate parent {0}")]
    DuplicateParents(Hash),

    #[error("parent {0} is an ancestor of the selected parent {1}")]
    InvalidParentsRelation(Hash, Hash),

    #[error("difficulty bits {0:#010x} encode an invalid target")]
    InvalidDifficultyBits(u32),

    #[error("work of difficulty bits {0:#010x} does not fit the blue work type")]
    WorkOverflow(u32),

    #[error("accumulated blue work overflows the blue work type")]
    BlueWorkOverflow,

    #[error("bad coinbase payload: {0}")]
    BadCoinbasePayload(#[from] CoinbaseError),
}

pub type RuleResult<T> = std::result::Result<T, RuleError>;

/// Coinbase payload codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoinbaseError {
    #[error("coinbase payload length is {0} while the minimum allowed length is {1}")]
    PayloadLenBelowMin(usize, usize),

    #[error("coinbase payload length is {0} while the maximum allowed length is {1}")]
    PayloadLenAboveMax(usize, usize),

    #[error("coinbase payload script public key length is {0} while the maximum allowed length is {1}")]
    PayloadScriptPublicKeyLenAboveMax(usize, u8),

    #[error(
        "coinbase payload length is {0} bytes but it needs to be at least {1} bytes long in order to accommodate the script public key"
    )]
    PayloadCantContainScriptPublicKey(usize, usize),

    #[error("transaction {0} is not a coinbase transaction")]
    NotCoinbase(Hash),
}

pub type CoinbaseResult<T> = std::result::Result<T, CoinbaseError>;
