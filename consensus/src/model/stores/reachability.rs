use consensus_core::reachability::{Interval, ReachabilityData};
use consensus_core::Hash;
use database::{Column, DbKey, DbResult, StagingArea};

pub trait ReachabilityStoreReader {
    fn get_reachability_data(&self, hash: Hash) -> DbResult<ReachabilityData>;
    fn has_reachability_data(&self, hash: Hash) -> DbResult<bool>;

    fn get_interval(&self, hash: Hash) -> DbResult<Interval> {
        Ok(self.get_reachability_data(hash)?.interval)
    }

    /// The parent in the selected-parent tree, `None` for the root
    fn get_tree_parent(&self, hash: Hash) -> DbResult<Option<Hash>> {
        Ok(self.get_reachability_data(hash)?.parent)
    }

    fn get_children(&self, hash: Hash) -> DbResult<Vec<Hash>> {
        Ok(self.get_reachability_data(hash)?.children)
    }

    fn get_future_covering_set(&self, hash: Hash) -> DbResult<Vec<Hash>> {
        Ok(self.get_reachability_data(hash)?.future_covering_set)
    }

    fn get_height(&self, hash: Hash) -> DbResult<u64> {
        Ok(self.get_reachability_data(hash)?.height)
    }
}

/// Mutations of the reachability index. Unlike other records, intervals are
/// rewritten by reindexing after the block is inserted.
pub trait ReachabilityStore: ReachabilityStoreReader {
    fn insert_reachability_data(&mut self, hash: Hash, data: &ReachabilityData) -> DbResult<()>;
    fn set_interval(&mut self, hash: Hash, interval: Interval) -> DbResult<()>;
    fn append_child(&mut self, hash: Hash, child: Hash) -> DbResult<()>;
    fn insert_future_covering_item(&mut self, hash: Hash, item: Hash, index: usize) -> DbResult<()>;
}

fn update<F>(staging: &mut StagingArea, hash: Hash, f: F) -> DbResult<()>
where
    F: FnOnce(&mut ReachabilityData),
{
    let key = DbKey::new(Column::Reachability, hash);
    let mut data: ReachabilityData = staging.read_required(key.clone())?;
    f(&mut data);
    staging.write(key, &data)
}

impl ReachabilityStoreReader for StagingArea {
    fn get_reachability_data(&self, hash: Hash) -> DbResult<ReachabilityData> {
        self.read_required(DbKey::new(Column::Reachability, hash))
    }

    fn has_reachability_data(&self, hash: Hash) -> DbResult<bool> {
        self.has(&DbKey::new(Column::Reachability, hash))
    }
}

impl ReachabilityStore for StagingArea {
    fn insert_reachability_data(&mut self, hash: Hash, data: &ReachabilityData) -> DbResult<()> {
        self.insert(DbKey::new(Column::Reachability, hash), data)
    }

    fn set_interval(&mut self, hash: Hash, interval: Interval) -> DbResult<()> {
        update(self, hash, |data| data.interval = interval)
    }

    fn append_child(&mut self, hash: Hash, child: Hash) -> DbResult<()> {
        update(self, hash, |data| data.children.push(child))
    }

    fn insert_future_covering_item(&mut self, hash: Hash, item: Hash, index: usize) -> DbResult<()> {
        update(self, hash, |data| {
            let index = index.min(data.future_covering_set.len());
            data.future_covering_set.insert(index, item)
        })
    }
}
