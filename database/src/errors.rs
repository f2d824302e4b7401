use crate::key::DbKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("RocksDB error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("key {0} not found")]
    KeyNotFound(DbKey),

    #[error("key {0} already exists")]
    KeyAlreadyExists(DbKey),

    #[error("commit conflict on key {key}: staged against commit {base_seq} but commit {conflicting_seq} wrote it")]
    CommitConflict { key: DbKey, base_seq: u64, conflicting_seq: u64 },

    #[error("staging area is based on commit {base_seq} which is older than the tracked commit history")]
    StagingAreaTooOld { base_seq: u64 },

    #[error("column family not found: {0}")]
    ColumnFamilyNotFound(String),

    #[error("database is closed")]
    DatabaseClosed,
}

impl DbError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::KeyNotFound(_))
    }

    /// Errors after which re-staging the admission against fresh committed state may succeed
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::CommitConflict { .. } | DbError::StagingAreaTooOld { .. })
    }
}

pub type DbResult<T> = Result<T, DbError>;

impl From<bincode::Error> for DbError {
    fn from(err: bincode::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}
