//! Interval allocation and reindexing of the selected-parent tree.

use crate::errors::{ConsensusResult, ConsistencyError};
use crate::model::stores::{DbResult, ReachabilityStore, ReachabilityStoreReader};
use consensus_core::reachability::{Interval, IntervalBound, ReachabilityData};
use consensus_core::{BlockHashMap, Hash};
use tracing::{debug, warn};

/// Adds `new_block` as the last child of `parent` in the tree. The new block
/// takes half of the capacity left after the parent's last child. If nothing
/// is left, the smallest enclosing subtree with enough room is reindexed.
pub(super) fn add_tree_block<S: ReachabilityStore + ?Sized>(
    store: &mut S,
    new_block: Hash,
    parent: Hash,
    interval_capacity: IntervalBound,
) -> ConsensusResult<()> {
    let parent_data = store.get_reachability_data(parent)?;
    let remaining = remaining_interval_after_last_child(store, &parent_data)?;
    let height = parent_data.height + 1;

    if remaining.is_empty() {
        // Inserted with an empty interval; the reindex lays it out with its siblings
        store.insert_reachability_data(new_block, &ReachabilityData::new(Some(parent), remaining, height))?;
        store.append_child(parent, new_block)?;
        reindex(store, new_block, parent, interval_capacity)
    } else {
        let (allocated, _) = remaining.split_half();
        store.insert_reachability_data(new_block, &ReachabilityData::new(Some(parent), allocated, height))?;
        store.append_child(parent, new_block)?;
        Ok(())
    }
}

fn remaining_interval_after_last_child<S: ReachabilityStoreReader + ?Sized>(store: &S, data: &ReachabilityData) -> DbResult<Interval> {
    let capacity = data.interval.children_capacity();
    match data.children.last() {
        Some(last_child) => {
            let last_end = store.get_interval(*last_child)?.end;
            Ok(Interval::new(last_end.min(capacity.end), capacity.end))
        }
        None => Ok(capacity),
    }
}

/// Climbs from `start` to the first ancestor whose interval is at least as
/// large as its subtree and re-lays that subtree. Only intervals inside the
/// chosen subtree change, so containment for every other block is preserved.
fn reindex<S: ReachabilityStore + ?Sized>(
    store: &mut S,
    new_block: Hash,
    start: Hash,
    interval_capacity: IntervalBound,
) -> ConsensusResult<()> {
    let mut sizes = BlockHashMap::new();
    let mut current = start;
    loop {
        let subtree_size = count_subtree(store, current, &mut sizes)?;
        let interval = store.get_interval(current)?;
        if interval.size() >= subtree_size {
            debug!("reindexing reachability subtree of {} ({} blocks, interval {})", current, subtree_size, interval);
            return relayout_subtree(store, current, &sizes);
        }
        match store.get_tree_parent(current)? {
            Some(parent) => current = parent,
            None => {
                warn!(
                    "reachability interval space exhausted: tree of {} blocks does not fit in capacity {}",
                    subtree_size, interval_capacity
                );
                return Err(ConsistencyError::ReachabilityOverflow { block: new_block, capacity: interval_capacity }.into());
            }
        }
    }
}

/// Subtree sizes (counting the root) of `root` and all its descendants,
/// memoized in `sizes` so climbing reuses the sizes of lower subtrees
fn count_subtree<S: ReachabilityStoreReader + ?Sized>(
    store: &S,
    root: Hash,
    sizes: &mut BlockHashMap<u64>,
) -> DbResult<u64> {
    let mut stack = vec![(root, false)];
    while let Some((block, expanded)) = stack.pop() {
        if sizes.contains_key(&block) {
            continue;
        }
        let children = store.get_children(block)?;
        if expanded {
            let size = 1 + children.iter().map(|child| sizes.get(child).copied().unwrap_or_default()).sum::<u64>();
            sizes.insert(block, size);
        } else {
            stack.push((block, true));
            stack.extend(children.into_iter().filter(|child| !sizes.contains_key(child)).map(|child| (child, false)));
        }
    }
    Ok(sizes.get(&root).copied().unwrap_or_default())
}

/// Reassigns the intervals below `root`, keeping `root`'s own interval.
/// Every child gets at least its subtree size, the slack is biased toward
/// larger subtrees.
fn relayout_subtree<S: ReachabilityStore + ?Sized>(store: &mut S, root: Hash, sizes: &BlockHashMap<u64>) -> ConsensusResult<()> {
    let mut queue = vec![root];
    while let Some(block) = queue.pop() {
        let data = store.get_reachability_data(block)?;
        if data.children.is_empty() {
            continue;
        }
        let child_sizes: Vec<u64> = data.children.iter().map(|child| sizes.get(child).copied().unwrap_or(1)).collect();
        let capacity = data.interval.children_capacity();
        if capacity.size() < child_sizes.iter().sum::<u64>() {
            return Err(ConsistencyError::ReachabilityInconsistency { block, reason: "subtree does not fit its reindexed interval" }.into());
        }
        for (child, interval) in data.children.iter().zip(capacity.split_exponential(&child_sizes)) {
            store.set_interval(*child, interval)?;
            queue.push(*child);
        }
    }
    Ok(())
}
