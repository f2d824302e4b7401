//! Consensus library for BlockDAG-based blockchain
//!
//! This library implements the GHOSTDAG ordering of a block DAG on top of an
//! interval-labelled reachability index, and the consensus-mandated coinbase
//! transaction derived from it.

pub mod consensus;
pub mod errors;
pub mod model;
pub mod pipeline;
pub mod processes;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export key types for easier access
pub use consensus::Consensus;
pub use consensus_core::Hash;
pub use errors::{ConsensusError, ConsensusResult, ConsistencyError};
pub use pipeline::{HeaderProcessingResult, HeaderProcessor};
pub use processes::coinbase::CoinbaseManager;
pub use processes::ghostdag::GhostdagManager;
pub use processes::reachability::ReachabilityManager;
pub use processes::traversal::DagTraversalManager;
