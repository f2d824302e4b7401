//! Error taxonomy of the consensus processes.
//!
//! A [`ConsensusError`] is one of: a missing record (`NotFound`, usually an
//! ancestor that was not admitted yet), a broken invariant (`Consistency`,
//! fatal), an invalid block (`Validation`), a storage failure (`Database`) or
//! parameters the consensus cannot be built from (`Config`).

use consensus_core::config::ConfigError;
use consensus_core::errors::RuleError;
use consensus_core::Hash;
use database::{DbError, DbKey};
use thiserror::Error;

/// Invariant violations. They mean corrupted state or a caller contract
/// violation and must halt the node rather than be retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("acceptance data of {block} lists {found} at merge set position {index} where {expected} is expected")]
    AcceptanceDataMismatch { block: Hash, index: usize, expected: Hash, found: Hash },

    #[error("acceptance data of {block} has {found} entries but its merge set has {expected} blocks")]
    AcceptanceDataLength { block: Hash, expected: usize, found: usize },

    #[error("merged block {0} has no coinbase transaction")]
    MissingCoinbase(Hash),

    #[error("reachability interval space exhausted while adding block {block} (interval capacity {capacity})")]
    ReachabilityOverflow { block: Hash, capacity: u64 },

    #[error("reachability data inconsistency at block {block}: {reason}")]
    ReachabilityInconsistency { block: Hash, reason: &'static str },

    #[error("blue anticone size of {block} not found in the selected chain of {context}")]
    BlueAnticoneNotFound { block: Hash, context: Hash },

    #[error("selected chain of {0} ended before reaching an ancestor of the blue candidate")]
    SelectedChainExhausted(Hash),

    #[error("reward of block {0} overflows")]
    RewardOverflow(Hash),
}

#[derive(Error, Debug)]
pub enum ConsensusError {
    #[error("{0} not found")]
    NotFound(DbKey),

    #[error("consistency error: {0}")]
    Consistency(#[from] ConsistencyError),

    #[error("block {block} is invalid: {source}")]
    Validation { block: Hash, source: RuleError },

    #[error("database error: {0}")]
    Database(DbError),

    #[error("anticone traversal of {block} visited more than {limit} blocks")]
    TraversalLimitExceeded { block: Hash, limit: usize },

    #[error("invalid consensus parameters: {0}")]
    Config(#[from] ConfigError),
}

impl ConsensusError {
    pub fn validation(block: Hash, source: impl Into<RuleError>) -> Self {
        ConsensusError::Validation { block, source: source.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ConsensusError::NotFound(_))
    }

    /// Errors after which the node must stop processing blocks
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConsensusError::Consistency(_))
    }

    /// Commit conflicts, after which the admission may be staged again
    pub fn is_conflict(&self) -> bool {
        matches!(self, ConsensusError::Database(err) if err.is_conflict())
    }
}

impl From<DbError> for ConsensusError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::KeyNotFound(key) => ConsensusError::NotFound(key),
            err => ConsensusError::Database(err),
        }
    }
}

pub type ConsensusResult<T> = std::result::Result<T, ConsensusError>;
