use consensus_core::ghostdag::{CompactGhostdagData, GhostdagData};
use consensus_core::{BlockHashMap, BlueWorkType, Hash, KType};
use database::{Column, DbKey, DbResult, StagingArea};

pub trait GhostdagStoreReader {
    fn get_ghostdag_data(&self, hash: Hash) -> DbResult<GhostdagData>;
    fn has_ghostdag_data(&self, hash: Hash) -> DbResult<bool>;

    fn get_compact_ghostdag_data(&self, hash: Hash) -> DbResult<CompactGhostdagData> {
        Ok(self.get_ghostdag_data(hash)?.to_compact())
    }

    fn get_blue_score(&self, hash: Hash) -> DbResult<u64> {
        Ok(self.get_compact_ghostdag_data(hash)?.blue_score)
    }

    fn get_blue_work(&self, hash: Hash) -> DbResult<BlueWorkType> {
        Ok(self.get_compact_ghostdag_data(hash)?.blue_work)
    }

    /// `None` for genesis
    fn get_selected_parent(&self, hash: Hash) -> DbResult<Option<Hash>> {
        Ok(self.get_compact_ghostdag_data(hash)?.selected_parent)
    }

    fn get_blues_anticone_sizes(&self, hash: Hash) -> DbResult<BlockHashMap<KType>> {
        Ok(self.get_ghostdag_data(hash)?.blues_anticone_sizes)
    }
}

pub trait GhostdagStore: GhostdagStoreReader {
    /// GHOSTDAG data is write-once
    fn insert_ghostdag_data(&mut self, hash: Hash, data: &GhostdagData) -> DbResult<()>;
}

/// GHOSTDAG data received as trusted data for blocks below the pruning point.
/// It keeps the merge set the block was originally mined with, which the
/// locally computed data cannot reproduce once the past is pruned.
pub trait TrustedGhostdagStoreReader {
    fn get_trusted_ghostdag_data(&self, hash: Hash) -> DbResult<GhostdagData>;
    fn has_trusted_ghostdag_data(&self, hash: Hash) -> DbResult<bool>;
}

pub trait TrustedGhostdagStore: TrustedGhostdagStoreReader {
    fn insert_trusted_ghostdag_data(&mut self, hash: Hash, data: &GhostdagData) -> DbResult<()>;
}

impl GhostdagStoreReader for StagingArea {
    fn get_ghostdag_data(&self, hash: Hash) -> DbResult<GhostdagData> {
        self.read_required(DbKey::new(Column::Ghostdag, hash))
    }

    fn has_ghostdag_data(&self, hash: Hash) -> DbResult<bool> {
        self.has(&DbKey::new(Column::Ghostdag, hash))
    }
}

impl GhostdagStore for StagingArea {
    fn insert_ghostdag_data(&mut self, hash: Hash, data: &GhostdagData) -> DbResult<()> {
        self.insert(DbKey::new(Column::Ghostdag, hash), data)
    }
}

impl TrustedGhostdagStoreReader for StagingArea {
    fn get_trusted_ghostdag_data(&self, hash: Hash) -> DbResult<GhostdagData> {
        self.read_required(DbKey::new(Column::TrustedGhostdag, hash))
    }

    fn has_trusted_ghostdag_data(&self, hash: Hash) -> DbResult<bool> {
        self.has(&DbKey::new(Column::TrustedGhostdag, hash))
    }
}

impl TrustedGhostdagStore for StagingArea {
    fn insert_trusted_ghostdag_data(&mut self, hash: Hash, data: &GhostdagData) -> DbResult<()> {
        self.insert(DbKey::new(Column::TrustedGhostdag, hash), data)
    }
}
