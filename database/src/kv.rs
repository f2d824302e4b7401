use crate::errors::DbResult;
use crate::key::{Column, DbKey};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An ordered set of puts and deletes applied atomically by [`KeyValueStore::write`]
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    ops: Vec<(DbKey, Option<Vec<u8>>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: DbKey, value: Vec<u8>) {
        self.ops.push((key, Some(value)));
    }

    pub fn delete(&mut self, key: DbKey) {
        self.ops.push((key, None));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operations in insertion order, `None` meaning delete
    pub fn iter(&self) -> impl Iterator<Item = (&DbKey, Option<&[u8]>)> {
        self.ops.iter().map(|(key, value)| (key, value.as_deref()))
    }
}

/// The committed key-value backend of the consensus stores
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &DbKey) -> DbResult<Option<Vec<u8>>>;

    fn has(&self, key: &DbKey) -> DbResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// All `(key, value)` pairs of a column in key order
    fn iterate(&self, column: Column) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Applies the batch atomically: either every operation is visible afterwards or none is
    fn write(&self, batch: WriteBatch) -> DbResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &DbKey) -> DbResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn has(&self, key: &DbKey) -> DbResult<bool> {
        (**self).has(key)
    }

    fn iterate(&self, column: Column) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>> {
        (**self).iterate(column)
    }

    fn write(&self, batch: WriteBatch) -> DbResult<()> {
        (**self).write(batch)
    }
}

/// In-memory backend used by tests and offline tools
#[derive(Default)]
pub struct MemoryDb {
    map: RwLock<BTreeMap<DbKey, Vec<u8>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl KeyValueStore for MemoryDb {
    fn get(&self, key: &DbKey) -> DbResult<Option<Vec<u8>>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn iterate(&self, column: Column) -> DbResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let map = self.map.read();
        Ok(map
            .range(DbKey::prefix_only(column)..)
            .take_while(|(key, _)| key.column() == column)
            .map(|(key, value)| (key.key().to_vec(), value.clone()))
            .collect())
    }

    fn write(&self, batch: WriteBatch) -> DbResult<()> {
        let mut map = self.map.write();
        for (key, value) in batch.ops {
            match value {
                Some(value) => map.insert(key, value),
                None => map.remove(&key),
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_db_batch_and_iterate() {
        let db = MemoryDb::new();
        let mut batch = WriteBatch::new();
        batch.put(DbKey::new(Column::Headers, [2]), vec![20]);
        batch.put(DbKey::new(Column::Headers, [1]), vec![10]);
        batch.put(DbKey::new(Column::Ghostdag, [1]), vec![99]);
        db.write(batch).unwrap();

        assert_eq!(db.get(&DbKey::new(Column::Headers, [1])).unwrap(), Some(vec![10]));
        assert_eq!(db.iterate(Column::Headers).unwrap(), vec![(vec![1], vec![10]), (vec![2], vec![20])]);
        assert_eq!(db.iterate(Column::Reachability).unwrap(), vec![]);

        let mut batch = WriteBatch::new();
        batch.delete(DbKey::new(Column::Headers, [1]));
        db.write(batch).unwrap();
        assert!(!db.has(&DbKey::new(Column::Headers, [1])).unwrap());
        assert_eq!(db.len(), 2);
    }
}
