use crate::errors::{DbError, DbResult};
use crate::key::{Column, DbKey};
use crate::kv::{KeyValueStore, WriteBatch};
use parking_lot::RwLock;
use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::path::Path;
use std::sync::Arc;

/// RocksDB backend with one column family per [`Column`]
pub struct RocksDb {
    db: Arc<DB>,
    is_closed: Arc<RwLock<bool>>,
}

impl RocksDb {
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(10000);
        opts.set_keep_log_file_num(10);
        opts.set_max_background_jobs(4);
        opts.set_bytes_per_sync(1048576);
        opts.increase_parallelism(4);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts.set_write_buffer_size(64 * 1024 * 1024);
        opts.set_max_write_buffer_number(3);

        let cf_descriptors: Vec<_> =
            Column::ALL.iter().map(|column| ColumnFamilyDescriptor::new(column.name(), Options::default())).collect();

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        Ok(Self { db: Arc::new(db), is_closed: Arc::new(RwLock::new(false)) })
    }

    fn check_closed(&self) -> DbResult<()> {
        if *self.is_closed.read() {
            return Err(DbError::DatabaseClosed);
        }
        Ok(())
    }

    fn cf_handle(&self, column: Column) -> DbResult<&rocksdb::ColumnFamily> {
        self.db.cf_handle(column.name()).ok_or_else(|| DbError::ColumnFamilyNotFound(column.name().to_string()))
    }

    pub fn close(&self) {
        *self.is_closed.write() = true;
    }

    pub fn stats(&self) -> String {
        self.db.property_value("rocksdb.stats").unwrap_or_default().unwrap_or_default()
    }

    pub fn compact(&self, column: Column) -> DbResult<()> {
        let cf = self.cf_handle(column)?;
        self.db.compact_range_cf(cf, None::<&[u8]>, None::<&[u8]>);
        Ok(())
    }
}

impl Clone for RocksDb {
    fn clone(&self) -> Self {
        Self { db: self.db.clone(), is_closed: self.is_closed.clone() }
    }
}

impl KeyValueStore for RocksDb {
    fn get(&self, key: &DbKey) -> DbResult<Option<Vec<u8>>> {
        self.check_closed()?;
        let cf = self.cf_handle(key.column())?;
        Ok(self.db.get_cf(cf, key.key())?)
    }

    fn has(&self, key: &DbKey) -> DbResult<bool> {
        self.check_closed()?;
        let cf = self.cf_handle(key.column())?;
        Ok(self.db.get_pinned_cf(cf, key.key())?.is_some())
    }

    fn iterate(&self, column: Column) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>> {
        self.check_closed()?;
        let cf = self.cf_handle(column)?;
        let mut entries = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            entries.push((key.into_vec(), value.into_vec()));
        }
        Ok(entries)
    }

    fn write(&self, batch: WriteBatch) -> DbResult<()> {
        self.check_closed()?;
        let mut rocks_batch = rocksdb::WriteBatch::default();
        for (key, value) in batch.iter() {
            let cf = self.cf_handle(key.column())?;
            match value {
                Some(value) => rocks_batch.put_cf(cf, key.key(), value),
                None => rocks_batch.delete_cf(cf, key.key()),
            }
        }
        self.db.write(rocks_batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rocksdb_batch_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let db = RocksDb::open(tmp.path()).unwrap();

        let mut batch = WriteBatch::new();
        batch.put(DbKey::new(Column::Ghostdag, b"k1"), b"v1".to_vec());
        batch.put(DbKey::new(Column::Ghostdag, b"k2"), b"v2".to_vec());
        batch.put(DbKey::new(Column::Headers, b"k1"), b"h1".to_vec());
        db.write(batch).unwrap();

        assert_eq!(db.get(&DbKey::new(Column::Ghostdag, b"k1")).unwrap(), Some(b"v1".to_vec()));
        assert_eq!(db.iterate(Column::Ghostdag).unwrap().len(), 2);
        assert!(db.has(&DbKey::new(Column::Headers, b"k1")).unwrap());

        let mut batch = WriteBatch::new();
        batch.delete(DbKey::new(Column::Ghostdag, b"k1"));
        db.write(batch).unwrap();
        assert_eq!(db.get(&DbKey::new(Column::Ghostdag, b"k1")).unwrap(), None);
    }

    #[test]
    fn test_closed_database_rejects_access() {
        let tmp = TempDir::new().unwrap();
        let db = RocksDb::open(tmp.path()).unwrap();
        db.close();
        assert!(matches!(db.get(&DbKey::new(Column::Headers, b"k")), Err(DbError::DatabaseClosed)));
    }
}
