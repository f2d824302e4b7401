use crate::errors::{DbError, DbResult};
use crate::key::DbKey;
use crate::kv::{KeyValueStore, WriteBatch};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

/// Number of past commits remembered for conflict detection and snapshot reads
pub const DEFAULT_COMMIT_HISTORY: usize = 1024;

/// Copy-on-write overlay over the committed store, holding the mutations of
/// one in-flight admission.
///
/// Reads consult the overlay first and otherwise see the committed state as of
/// [`StagingArea::base_seq`]: commits that land after the staging area was
/// created stay invisible to it. Writes never reach the base; they are applied
/// by [`ConsensusStorage::commit`] as one atomic batch, and dropping the staging
/// area discards them.
pub struct StagingArea {
    committed: Arc<Committed>,
    base_seq: u64,
    changes: BTreeMap<DbKey, Option<Vec<u8>>>,
}

impl StagingArea {
    fn new(committed: Arc<Committed>, base_seq: u64) -> Self {
        Self { committed, base_seq, changes: BTreeMap::new() }
    }

    /// The commit sequence number this staging area was created at
    pub fn base_seq(&self) -> u64 {
        self.base_seq
    }

    pub fn get_raw(&self, key: &DbKey) -> DbResult<Option<Vec<u8>>> {
        match self.changes.get(key) {
            Some(staged) => Ok(staged.clone()),
            None => self.committed.get_at(key, self.base_seq),
        }
    }

    pub fn has(&self, key: &DbKey) -> DbResult<bool> {
        match self.changes.get(key) {
            Some(staged) => Ok(staged.is_some()),
            None => Ok(self.committed.get_at(key, self.base_seq)?.is_some()),
        }
    }

    pub fn put_raw(&mut self, key: DbKey, value: Vec<u8>) {
        self.changes.insert(key, Some(value));
    }

    pub fn delete(&mut self, key: DbKey) {
        self.changes.insert(key, None);
    }

    /// Reads and decodes a record, `None` if it does not exist
    pub fn read<T: DeserializeOwned>(&self, key: &DbKey) -> DbResult<Option<T>> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Reads and decodes a record which must exist
    pub fn read_required<T: DeserializeOwned>(&self, key: DbKey) -> DbResult<T> {
        match self.read(&key)? {
            Some(value) => Ok(value),
            None => Err(DbError::KeyNotFound(key)),
        }
    }

    /// Encodes and stages a record, replacing any previous value
    pub fn write<T: Serialize + ?Sized>(&mut self, key: DbKey, value: &T) -> DbResult<()> {
        let bytes = bincode::serialize(value)?;
        self.put_raw(key, bytes);
        Ok(())
    }

    /// Encodes and stages a record that must not exist yet
    pub fn insert<T: Serialize + ?Sized>(&mut self, key: DbKey, value: &T) -> DbResult<()> {
        if self.has(&key)? {
            return Err(DbError::KeyAlreadyExists(key));
        }
        self.write(key, value)
    }

    /// Number of staged mutations
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    fn into_batch(self) -> (BTreeSet<DbKey>, WriteBatch) {
        let mut keys = BTreeSet::new();
        let mut batch = WriteBatch::new();
        for (key, value) in self.changes {
            keys.insert(key.clone());
            match value {
                Some(value) => batch.put(key, value),
                None => batch.delete(key),
            }
        }
        (keys, batch)
    }
}

/// Values the written keys held right before one commit
type PreImages = BTreeMap<DbKey, Option<Vec<u8>>>;

struct CommitLog {
    /// Sequence number of the latest commit
    seq: u64,
    /// Pre-images of the most recent commits, oldest first
    recent: VecDeque<(u64, PreImages)>,
    capacity: usize,
}

impl CommitLog {
    /// Commits after `base_seq`, which must all still be tracked
    fn commits_after(&self, base_seq: u64) -> DbResult<impl Iterator<Item = &(u64, PreImages)>> {
        let oldest_tracked = self.recent.front().map_or(self.seq + 1, |(seq, _)| *seq);
        if base_seq < self.seq && base_seq + 1 < oldest_tracked {
            return Err(DbError::StagingAreaTooOld { base_seq });
        }
        Ok(self.recent.iter().filter(move |(seq, _)| *seq > base_seq))
    }

    fn check(&self, base_seq: u64, keys: &BTreeSet<DbKey>) -> DbResult<()> {
        for (seq, written) in self.commits_after(base_seq)? {
            if let Some(key) = keys.iter().find(|key| written.contains_key(*key)) {
                return Err(DbError::CommitConflict { key: key.clone(), base_seq, conflicting_seq: *seq });
            }
        }
        Ok(())
    }

    fn record(&mut self, pre_images: PreImages) {
        self.seq += 1;
        self.recent.push_back((self.seq, pre_images));
        while self.recent.len() > self.capacity {
            self.recent.pop_front();
        }
    }
}

/// The backend together with the history of commits applied to it
struct Committed {
    db: Arc<dyn KeyValueStore>,
    log: RwLock<CommitLog>,
}

impl Committed {
    /// Value of `key` as of commit `base_seq`. The first later commit that wrote
    /// the key remembers what it overwrote; untouched keys are read from the
    /// backend while commits are held off.
    fn get_at(&self, key: &DbKey, base_seq: u64) -> DbResult<Option<Vec<u8>>> {
        let log = self.log.read();
        for (_, pre_images) in log.commits_after(base_seq)? {
            if let Some(value) = pre_images.get(key) {
                return Ok(value.clone());
            }
        }
        self.db.get(key)
    }
}

/// The committed consensus store.
///
/// Admissions run against their own [`StagingArea`] and may do so in parallel.
/// Commits are serialized under a lock and rejected when a staging area wrote a
/// key that another commit wrote after the staging area was created, so two
/// admissions can never both commit overlapping writes (for instance two
/// reachability reindexes of the same subtree).
pub struct ConsensusStorage {
    committed: Arc<Committed>,
}

impl ConsensusStorage {
    pub fn new(db: Arc<dyn KeyValueStore>) -> Self {
        Self::with_commit_history(db, DEFAULT_COMMIT_HISTORY)
    }

    pub fn with_commit_history(db: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        let log = RwLock::new(CommitLog { seq: 0, recent: VecDeque::new(), capacity });
        Self { committed: Arc::new(Committed { db, log }) }
    }

    /// Creates an empty staging area over the current committed state
    pub fn staging(&self) -> StagingArea {
        let seq = self.committed.log.read().seq;
        StagingArea::new(self.committed.clone(), seq)
    }

    /// Atomically applies the staged mutations. On error nothing is written.
    pub fn commit(&self, staging: StagingArea) -> DbResult<()> {
        let mut log = self.committed.log.write();
        let base_seq = staging.base_seq;
        let (keys, batch) = staging.into_batch();
        if let Err(err) = log.check(base_seq, &keys) {
            warn!("rejecting commit: {}", err);
            return Err(err);
        }
        let mut pre_images = PreImages::new();
        for key in keys {
            let value = self.committed.db.get(&key)?;
            pre_images.insert(key, value);
        }
        let writes = batch.len();
        self.committed.db.write(batch)?;
        log.record(pre_images);
        debug!("committed {} writes as commit {}", writes, log.seq);
        Ok(())
    }

    /// Sequence number of the latest commit
    pub fn commit_seq(&self) -> u64 {
        self.committed.log.read().seq
    }

    /// Reads a committed record
    pub fn read<T: DeserializeOwned>(&self, key: &DbKey) -> DbResult<Option<T>> {
        match self.committed.db.get(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn db(&self) -> &Arc<dyn KeyValueStore> {
        &self.committed.db
    }
}
