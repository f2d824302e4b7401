use consensus_core::{BlockHashSet, Hash};
use database::{Column, DbKey, DbResult, StagingArea};

/// DAA scores and the blocks each block adds to its difficulty window. Both
/// are computed by the difficulty adjustment process outside this crate.
pub trait DaaStoreReader {
    fn get_daa_score(&self, hash: Hash) -> DbResult<u64>;
    fn get_daa_added_blocks(&self, hash: Hash) -> DbResult<BlockHashSet>;
}

pub trait DaaStore: DaaStoreReader {
    fn insert_daa_score(&mut self, hash: Hash, daa_score: u64) -> DbResult<()>;
    fn insert_daa_added_blocks(&mut self, hash: Hash, added_blocks: &[Hash]) -> DbResult<()>;
}

impl DaaStoreReader for StagingArea {
    fn get_daa_score(&self, hash: Hash) -> DbResult<u64> {
        self.read_required(DbKey::new(Column::DaaScore, hash))
    }

    fn get_daa_added_blocks(&self, hash: Hash) -> DbResult<BlockHashSet> {
        let added: Vec<Hash> = self.read_required(DbKey::new(Column::DaaAddedBlocks, hash))?;
        Ok(added.into_iter().collect())
    }
}

impl DaaStore for StagingArea {
    fn insert_daa_score(&mut self, hash: Hash, daa_score: u64) -> DbResult<()> {
        self.insert(DbKey::new(Column::DaaScore, hash), &daa_score)
    }

    fn insert_daa_added_blocks(&mut self, hash: Hash, added_blocks: &[Hash]) -> DbResult<()> {
        self.insert(DbKey::new(Column::DaaAddedBlocks, hash), added_blocks)
    }
}
