//! The seams between the consensus processes. GHOSTDAG and DAG traversal are
//! generic over these, so either side can be swapped for another
//! implementation (or a simple one in tests).

use crate::errors::ConsensusResult;
use crate::model::stores::{GhostdagStoreReader, HeaderStoreReader, ReachabilityStoreReader};
use consensus_core::ghostdag::GhostdagData;
use consensus_core::{BlockHashSet, Hash, KType};
use database::DbResult;

/// Ancestry queries over the DAG
pub trait ReachabilityService {
    /// Whether `this` is in the past of `queried`. A block is its own ancestor.
    fn is_dag_ancestor_of<S>(&self, store: &S, this: Hash, queried: Hash) -> DbResult<bool>
    where
        S: HeaderStoreReader + ReachabilityStoreReader + ?Sized;
}

/// Merge set discovery and blue anticone lookups used while coloring
pub trait TraversalService {
    fn unordered_mergeset_without_selected_parent<S>(
        &self,
        store: &S,
        selected_parent: Hash,
        parents: &[Hash],
    ) -> ConsensusResult<BlockHashSet>
    where
        S: HeaderStoreReader + ReachabilityStoreReader + ?Sized;

    fn blue_anticone_size<S>(&self, store: &S, block: Hash, context_hash: Hash, context: &GhostdagData) -> ConsensusResult<KType>
    where
        S: GhostdagStoreReader + ?Sized;
}
