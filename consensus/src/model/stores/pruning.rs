use consensus_core::Hash;
use database::{Column, DbKey, DbResult, StagingArea};

/// The pruning point chosen by the pruning process. The core only reads it.
pub trait PruningStoreReader {
    fn pruning_point(&self) -> DbResult<Hash>;
}

pub trait PruningStore: PruningStoreReader {
    fn set_pruning_point(&mut self, pruning_point: Hash) -> DbResult<()>;
}

impl PruningStoreReader for StagingArea {
    fn pruning_point(&self) -> DbResult<Hash> {
        self.read_required(DbKey::prefix_only(Column::PruningPoint))
    }
}

impl PruningStore for StagingArea {
    fn set_pruning_point(&mut self, pruning_point: Hash) -> DbResult<()> {
        self.write(DbKey::prefix_only(Column::PruningPoint), &pruning_point)
    }
}
