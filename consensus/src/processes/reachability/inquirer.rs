use super::tree::add_tree_block;
use crate::errors::{ConsensusResult, ConsistencyError};
use crate::model::stores::{DbResult, HeaderStoreReader, ReachabilityStore, ReachabilityStoreReader};
use crate::processes::services::ReachabilityService;
use consensus_core::config::ReachabilityParams;
use consensus_core::reachability::{Interval, IntervalBound, ReachabilityData};
use consensus_core::Hash;
use std::cmp::Ordering;
use tracing::Span;

enum SearchOutput {
    NotFound(usize),
    Found(Hash),
}

/// Maintains the reachability index and answers ancestry queries.
///
/// Chain ancestry (ancestry along the selected-parent tree) is interval
/// containment. DAG ancestry additionally consults the future covering set of
/// the queried ancestor: the blocks that merged it, sorted by interval start,
/// so the query costs a binary search.
#[derive(Clone)]
pub struct ReachabilityManager {
    interval_capacity: IntervalBound,
    span: Span,
}

impl ReachabilityManager {
    pub fn new(params: ReachabilityParams, span: Span) -> Self {
        Self { interval_capacity: params.interval_capacity, span }
    }

    pub fn interval_capacity(&self) -> IntervalBound {
        self.interval_capacity
    }

    /// Makes `origin` the root of the tree, owning the whole interval space
    pub fn init<S: ReachabilityStore + ?Sized>(&self, store: &mut S, origin: Hash) -> ConsensusResult<()> {
        let _enter = self.span.enter();
        if store.has_reachability_data(origin)? {
            return Ok(());
        }
        let interval = Interval::new(1, self.interval_capacity.max(1));
        store.insert_reachability_data(origin, &ReachabilityData::new(None, interval, 0))?;
        Ok(())
    }

    /// Adds a block below its selected parent and registers it in the future
    /// covering set of every other block of its merge set. All writes go to
    /// `store`, so a triggered reindex is committed with the block or not at all.
    pub fn add_block<S, I>(&self, store: &mut S, new_block: Hash, selected_parent: Hash, mergeset_without_selected_parent: I) -> ConsensusResult<()>
    where
        S: ReachabilityStore + ?Sized,
        I: IntoIterator<Item = Hash>,
    {
        let _enter = self.span.enter();
        add_tree_block(store, new_block, selected_parent, self.interval_capacity)?;
        for merged_block in mergeset_without_selected_parent {
            insert_to_future_covering_set(store, merged_block, new_block)?;
        }
        Ok(())
    }

    /// True if `this` is `queried` or one of its selected-chain ancestors
    pub fn is_chain_ancestor_of<S: ReachabilityStoreReader + ?Sized>(&self, store: &S, this: Hash, queried: Hash) -> DbResult<bool> {
        is_chain_ancestor_of(store, this, queried)
    }

    /// Same as [`Self::is_chain_ancestor_of`] but false for `this == queried`
    pub fn is_strict_chain_ancestor_of<S: ReachabilityStoreReader + ?Sized>(
        &self,
        store: &S,
        this: Hash,
        queried: Hash,
    ) -> DbResult<bool> {
        Ok(store.get_interval(this)?.strictly_contains(store.get_interval(queried)?))
    }

    /// True if `this` is in the past of `queried` (or equal to it)
    pub fn is_dag_ancestor_of<S: ReachabilityStoreReader + ?Sized>(&self, store: &S, this: Hash, queried: Hash) -> DbResult<bool> {
        if is_chain_ancestor_of(store, this, queried)? {
            return Ok(true);
        }
        let future_covering_set = store.get_future_covering_set(this)?;
        Ok(matches!(binary_search_descendant(store, &future_covering_set, queried)?, SearchOutput::Found(..)))
    }

    /// A total order consistent with the selected-parent tree: chain ancestors
    /// come first, unrelated blocks follow the pre-order of the tree
    pub fn compare_order<S: ReachabilityStoreReader + ?Sized>(&self, store: &S, a: Hash, b: Hash) -> DbResult<Ordering> {
        if a == b {
            return Ok(Ordering::Equal);
        }
        let (a_interval, b_interval) = (store.get_interval(a)?, store.get_interval(b)?);
        Ok(a_interval.start.cmp(&b_interval.start).then_with(|| b_interval.end.cmp(&a_interval.end)).then_with(|| a.cmp(&b)))
    }

    /// The child of `ancestor` on the tree path leading to `descendant`
    pub fn get_next_chain_ancestor<S: ReachabilityStoreReader + ?Sized>(
        &self,
        store: &S,
        descendant: Hash,
        ancestor: Hash,
    ) -> ConsensusResult<Hash> {
        if descendant == ancestor {
            return Err(ConsistencyError::ReachabilityInconsistency { block: ancestor, reason: "a block has no next chain ancestor toward itself" }.into());
        }
        if !self.is_strict_chain_ancestor_of(store, ancestor, descendant)? {
            return Err(ConsistencyError::ReachabilityInconsistency { block: ancestor, reason: "queried block is not a chain ancestor" }.into());
        }
        let children = store.get_children(ancestor)?;
        match binary_search_descendant(store, &children, descendant)? {
            SearchOutput::Found(child) => Ok(child),
            SearchOutput::NotFound(_) => {
                Err(ConsistencyError::ReachabilityInconsistency { block: ancestor, reason: "no child interval contains a chain descendant" }.into())
            }
        }
    }
}

impl ReachabilityService for ReachabilityManager {
    fn is_dag_ancestor_of<S>(&self, store: &S, this: Hash, queried: Hash) -> DbResult<bool>
    where
        S: HeaderStoreReader + ReachabilityStoreReader + ?Sized,
    {
        ReachabilityManager::is_dag_ancestor_of(self, store, this, queried)
    }
}

fn is_chain_ancestor_of<S: ReachabilityStoreReader + ?Sized>(store: &S, this: Hash, queried: Hash) -> DbResult<bool> {
    Ok(store.get_interval(this)?.contains(store.get_interval(queried)?))
}

/// Searches `ordered_hashes` (sorted by interval start, with disjoint
/// intervals) for a chain ancestor of `descendant`. On a miss, returns the
/// position where `descendant` keeps the order.
fn binary_search_descendant<S: ReachabilityStoreReader + ?Sized>(
    store: &S,
    ordered_hashes: &[Hash],
    descendant: Hash,
) -> DbResult<SearchOutput> {
    let point = store.get_interval(descendant)?.start;
    // first index whose interval starts after `point`
    let (mut low, mut high) = (0, ordered_hashes.len());
    while low < high {
        let mid = low + (high - low) / 2;
        if store.get_interval(ordered_hashes[mid])?.start <= point {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    // only the preceding item may contain `point`
    if low > 0 && is_chain_ancestor_of(store, ordered_hashes[low - 1], descendant)? {
        Ok(SearchOutput::Found(ordered_hashes[low - 1]))
    } else {
        Ok(SearchOutput::NotFound(low))
    }
}

fn insert_to_future_covering_set<S: ReachabilityStore + ?Sized>(store: &mut S, merged_block: Hash, new_block: Hash) -> ConsensusResult<()> {
    let future_covering_set = store.get_future_covering_set(merged_block)?;
    match binary_search_descendant(store, &future_covering_set, new_block)? {
        // A covering item which is a chain ancestor of the new block would mean
        // the merged block is already in the new block's selected past
        SearchOutput::Found(..) => Err(ConsistencyError::ReachabilityInconsistency {
            block: merged_block,
            reason: "merged block is already covered by a chain ancestor of the merging block",
        }
        .into()),
        SearchOutput::NotFound(index) => {
            store.insert_future_covering_item(merged_block, new_block, index)?;
            Ok(())
        }
    }
}
