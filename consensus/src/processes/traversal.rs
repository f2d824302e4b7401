//! DAG traversal built on reachability queries: merge set discovery, blue
//! anticone sizes, anticones and selected chains.

use super::reachability::ReachabilityManager;
use super::services::{ReachabilityService, TraversalService};
use crate::errors::{ConsensusError, ConsensusResult, ConsistencyError};
use crate::model::stores::{GhostdagStoreReader, HeaderStoreReader, ReachabilityStoreReader};
use consensus_core::ghostdag::GhostdagData;
use consensus_core::{BlockHashSet, Hash, KType};
use std::collections::VecDeque;
use tracing::Span;

#[derive(Clone)]
pub struct DagTraversalManager<R: ReachabilityService = ReachabilityManager> {
    reachability: R,
    span: Span,
}

impl<R: ReachabilityService> DagTraversalManager<R> {
    pub fn new(reachability: R, span: Span) -> Self {
        Self { reachability, span }
    }

    /// The blocks a new block merges besides its selected parent: everything
    /// reachable backwards from the other parents that is not in the past of
    /// the selected parent
    pub fn unordered_mergeset_without_selected_parent<S>(
        &self,
        store: &S,
        selected_parent: Hash,
        parents: &[Hash],
    ) -> ConsensusResult<BlockHashSet>
    where
        S: HeaderStoreReader + ReachabilityStoreReader + ?Sized,
    {
        let _enter = self.span.enter();
        let mut queue: VecDeque<Hash> = parents.iter().copied().filter(|p| *p != selected_parent).collect();
        let mut mergeset: BlockHashSet = queue.iter().copied().collect();
        let mut selected_parent_past = BlockHashSet::new();

        while let Some(current) = queue.pop_front() {
            for parent in store.get_parents(current)? {
                if mergeset.contains(&parent) || selected_parent_past.contains(&parent) {
                    continue;
                }
                if self.reachability.is_dag_ancestor_of(store, parent, selected_parent)? {
                    selected_parent_past.insert(parent);
                    continue;
                }
                mergeset.insert(parent);
                queue.push_back(parent);
            }
        }
        Ok(mergeset)
    }

    /// The size of the blue anticone of `block` within the blue set of
    /// `context`, read from the first block of the context's selected chain
    /// that recorded it
    pub fn blue_anticone_size<S>(&self, store: &S, block: Hash, context_hash: Hash, context: &GhostdagData) -> ConsensusResult<KType>
    where
        S: GhostdagStoreReader + ?Sized,
    {
        if let Some(size) = context.blues_anticone_sizes.get(&block) {
            return Ok(*size);
        }
        let mut current = context.selected_parent;
        while let Some(chain_block) = current {
            let data = store.get_ghostdag_data(chain_block)?;
            if let Some(size) = data.blues_anticone_sizes.get(&block) {
                return Ok(*size);
            }
            current = data.selected_parent;
        }
        Err(ConsistencyError::BlueAnticoneNotFound { block, context: context_hash }.into())
    }

    /// Blocks in the past of `tips` (tips included) which are neither ancestors
    /// nor descendants of `block`. Fails once more than `max_traversal` blocks
    /// were visited.
    pub fn anticone<S>(&self, store: &S, block: Hash, tips: &[Hash], max_traversal: usize) -> ConsensusResult<Vec<Hash>>
    where
        S: HeaderStoreReader + ReachabilityStoreReader + ?Sized,
    {
        let _enter = self.span.enter();
        let mut anticone = Vec::new();
        let mut visited = BlockHashSet::new();
        let mut queue: VecDeque<Hash> = tips.iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            if visited.len() > max_traversal {
                return Err(ConsensusError::TraversalLimitExceeded { block, limit: max_traversal });
            }
            // the past of an ancestor is entirely in the past of `block`
            if self.reachability.is_dag_ancestor_of(store, current, block)? {
                continue;
            }
            if !self.reachability.is_dag_ancestor_of(store, block, current)? {
                anticone.push(current);
            }
            queue.extend(store.get_parents(current)?.into_iter().filter(|parent| !visited.contains(parent)));
        }
        Ok(anticone)
    }

    /// The selected chain from `from` down to genesis, `from` first
    pub fn selected_chain<S>(&self, store: &S, from: Hash) -> ConsensusResult<Vec<Hash>>
    where
        S: GhostdagStoreReader + ?Sized,
    {
        let mut chain = vec![from];
        let mut current = from;
        while let Some(selected_parent) = store.get_selected_parent(current)? {
            chain.push(selected_parent);
            current = selected_parent;
        }
        Ok(chain)
    }
}

impl<R: ReachabilityService> TraversalService for DagTraversalManager<R> {
    fn unordered_mergeset_without_selected_parent<S>(
        &self,
        store: &S,
        selected_parent: Hash,
        parents: &[Hash],
    ) -> ConsensusResult<BlockHashSet>
    where
        S: HeaderStoreReader + ReachabilityStoreReader + ?Sized,
    {
        Self::unordered_mergeset_without_selected_parent(self, store, selected_parent, parents)
    }

    fn blue_anticone_size<S>(&self, store: &S, block: Hash, context_hash: Hash, context: &GhostdagData) -> ConsensusResult<KType>
    where
        S: GhostdagStoreReader + ?Sized,
    {
        Self::blue_anticone_size(self, store, block, context_hash, context)
    }
}
