use consensus_core::tx::Transaction;
use consensus_core::Hash;
use database::{Column, DbKey, DbResult, StagingArea};

/// Block bodies, stored as their transaction lists
pub trait BlockStoreReader {
    fn get_block_transactions(&self, hash: Hash) -> DbResult<Vec<Transaction>>;
    fn has_block_body(&self, hash: Hash) -> DbResult<bool>;
}

pub trait BlockStore: BlockStoreReader {
    fn insert_block_transactions(&mut self, hash: Hash, transactions: &[Transaction]) -> DbResult<()>;
}

impl BlockStoreReader for StagingArea {
    fn get_block_transactions(&self, hash: Hash) -> DbResult<Vec<Transaction>> {
        self.read_required(DbKey::new(Column::BlockBodies, hash))
    }

    fn has_block_body(&self, hash: Hash) -> DbResult<bool> {
        self.has(&DbKey::new(Column::BlockBodies, hash))
    }
}

impl BlockStore for StagingArea {
    fn insert_block_transactions(&mut self, hash: Hash, transactions: &[Transaction]) -> DbResult<()> {
        self.insert(DbKey::new(Column::BlockBodies, hash), transactions)
    }
}
