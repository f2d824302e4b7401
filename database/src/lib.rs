//! Storage layer of the consensus core: column-keyed byte records over RocksDB
//! (or memory), with staged admissions committed atomically.

pub mod cache;
pub mod db;
pub mod errors;
pub mod key;
pub mod kv;
pub mod staging;

pub use cache::CachedKeyValueStore;
pub use db::RocksDb;
pub use errors::{DbError, DbResult};
pub use key::{Column, DbKey};
pub use kv::{KeyValueStore, MemoryDb, WriteBatch};
pub use staging::{ConsensusStorage, StagingArea};
