use consensus_core::acceptance_data::AcceptanceData;
use consensus_core::Hash;
use database::{Column, DbKey, DbResult, StagingArea};

/// Acceptance data is produced by transaction acceptance and only read by the core
pub trait AcceptanceDataStoreReader {
    fn get_acceptance_data(&self, hash: Hash) -> DbResult<AcceptanceData>;
}

pub trait AcceptanceDataStore: AcceptanceDataStoreReader {
    fn insert_acceptance_data(&mut self, hash: Hash, data: &AcceptanceData) -> DbResult<()>;
}

impl AcceptanceDataStoreReader for StagingArea {
    fn get_acceptance_data(&self, hash: Hash) -> DbResult<AcceptanceData> {
        self.read_required(DbKey::new(Column::AcceptanceData, hash))
    }
}

impl AcceptanceDataStore for StagingArea {
    fn insert_acceptance_data(&mut self, hash: Hash, data: &AcceptanceData) -> DbResult<()> {
        self.insert(DbKey::new(Column::AcceptanceData, hash), data)
    }
}
