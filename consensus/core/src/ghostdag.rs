use crate::{BlockHashMap, BlueWorkType, Hash, KType};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// GHOSTDAG data of a single block, computed once at admission and immutable afterwards.
///
/// `mergeset_blues` starts with the selected parent (except for genesis, where it is
/// empty) followed by the other blues in merge set order. `blues_anticone_sizes` holds,
/// for every blue in the merge set, the size of its anticone within the blue set of
/// this block's past.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GhostdagData {
    pub blue_score: u64,
    pub blue_work: BlueWorkType,
    /// Absent only for genesis
    pub selected_parent: Option<Hash>,
    pub mergeset_blues: Vec<Hash>,
    pub mergeset_reds: Vec<Hash>,
    pub blues_anticone_sizes: BlockHashMap<KType>,
}

/// The fields of [`GhostdagData`] used for chain selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactGhostdagData {
    pub blue_score: u64,
    pub blue_work: BlueWorkType,
    pub selected_parent: Option<Hash>,
}

impl From<&GhostdagData> for CompactGhostdagData {
    fn from(value: &GhostdagData) -> Self {
        value.to_compact()
    }
}

impl GhostdagData {
    pub fn new(
        blue_score: u64,
        blue_work: BlueWorkType,
        selected_parent: Option<Hash>,
        mergeset_blues: Vec<Hash>,
        mergeset_reds: Vec<Hash>,
        blues_anticone_sizes: BlockHashMap<KType>,
    ) -> Self {
        Self { blue_score, blue_work, selected_parent, mergeset_blues, mergeset_reds, blues_anticone_sizes }
    }

    /// GHOSTDAG data of the genesis block: no selected parent, empty merge set, zero score and work
    pub fn genesis() -> Self {
        Self::default()
    }

    /// Starts the data of a new block. The selected parent is the first blue and
    /// has an empty anticone among the blues.
    pub fn new_with_selected_parent(selected_parent: Hash, k: KType) -> Self {
        let mut mergeset_blues = Vec::with_capacity(k as usize + 1);
        let mut blues_anticone_sizes = BlockHashMap::with_capacity(k as usize + 1);
        mergeset_blues.push(selected_parent);
        blues_anticone_sizes.insert(selected_parent, 0);

        Self {
            blue_score: Default::default(),
            blue_work: Default::default(),
            selected_parent: Some(selected_parent),
            mergeset_blues,
            mergeset_reds: Default::default(),
            blues_anticone_sizes,
        }
    }

    pub fn mergeset_size(&self) -> usize {
        self.mergeset_blues.len() + self.mergeset_reds.len()
    }

    pub fn is_genesis(&self) -> bool {
        self.selected_parent.is_none()
    }

    /// Blues without the selected parent, followed by the reds
    pub fn mergeset_without_selected_parent(&self) -> impl Iterator<Item = Hash> + '_ {
        self.mergeset_blues.iter().skip(self.selected_parent.is_some() as usize).chain(self.mergeset_reds.iter()).copied()
    }

    /// The merge set in the order acceptance data is laid out in: blues, with the
    /// selected parent first, then reds.
    pub fn consensus_ordered_mergeset(&self) -> impl Iterator<Item = Hash> + '_ {
        self.mergeset_blues.iter().chain(self.mergeset_reds.iter()).copied()
    }

    pub fn add_blue(&mut self, block: Hash, blue_anticone_size: KType, block_blues_anticone_sizes: &BlockHashMap<KType>) {
        // Add the new blue block to mergeset blues
        self.mergeset_blues.push(block);

        // Get a mut ref to internal anticone size map
        let blues_anticone_sizes = &mut self.blues_anticone_sizes;

        // Insert the new blue block with its blue anticone size to the map
        blues_anticone_sizes.insert(block, blue_anticone_size);

        // Insert/update map entries for blocks affected by this insertion
        for (blue, size) in block_blues_anticone_sizes {
            blues_anticone_sizes.insert(*blue, size + 1);
        }
    }

    pub fn add_red(&mut self, block: Hash) {
        self.mergeset_reds.push(block);
    }

    pub fn finalize_score_and_work(&mut self, blue_score: u64, blue_work: BlueWorkType) {
        self.blue_score = blue_score;
        self.blue_work = blue_work;
    }

    pub fn to_compact(&self) -> CompactGhostdagData {
        CompactGhostdagData { blue_score: self.blue_score, blue_work: self.blue_work, selected_parent: self.selected_parent }
    }
}

/// A block hash paired with its blue work, ordered by `(blue_work, hash)`.
///
/// Blue work strictly grows along any DAG path, so sorting by it yields a
/// topological order; the hash breaks ties between parallel blocks.
#[derive(Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SortableBlock {
    pub hash: Hash,
    pub blue_work: BlueWorkType,
}

impl SortableBlock {
    pub fn new(hash: Hash, blue_work: BlueWorkType) -> Self {
        Self { hash, blue_work }
    }
}

impl PartialEq for SortableBlock {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl PartialOrd for SortableBlock {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortableBlock {
    fn cmp(&self, other: &Self) -> Ordering {
        self.blue_work.cmp(&other.blue_work).then_with(|| self.hash.cmp(&other.hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_blue_updates_anticone_sizes() {
        let sp = Hash::from_u64_word(1);
        let a = Hash::from_u64_word(2);
        let b = Hash::from_u64_word(3);
        let mut data = GhostdagData::new_with_selected_parent(sp, 3);

        let mut affected = BlockHashMap::new();
        data.add_blue(a, 0, &affected);
        affected.insert(a, 0);
        data.add_blue(b, 1, &affected);
        data.add_red(Hash::from_u64_word(4));

        assert_eq!(data.mergeset_blues, vec![sp, a, b]);
        assert_eq!(data.blues_anticone_sizes[&a], 1);
        assert_eq!(data.blues_anticone_sizes[&b], 1);
        assert_eq!(data.blues_anticone_sizes[&sp], 0);
        assert_eq!(data.mergeset_size(), 4);
        assert_eq!(data.mergeset_without_selected_parent().collect::<Vec<_>>(), vec![a, b, Hash::from_u64_word(4)]);
        assert_eq!(data.consensus_ordered_mergeset().next(), Some(sp));
    }

    #[test]
    fn test_genesis_data() {
        let genesis = GhostdagData::genesis();
        assert!(genesis.is_genesis());
        assert_eq!(genesis.blue_score, 0);
        assert_eq!(genesis.blue_work, BlueWorkType::ZERO);
        assert_eq!(genesis.mergeset_without_selected_parent().count(), 0);
    }

    #[test]
    fn test_sortable_block_order() {
        let low_work_high_hash = SortableBlock::new(Hash::from_u64_word(9), 1u64.into());
        let high_work_low_hash = SortableBlock::new(Hash::from_u64_word(1), 2u64.into());
        let tie = SortableBlock::new(Hash::from_u64_word(2), 2u64.into());
        let mut blocks = vec![tie, high_work_low_hash, low_work_high_hash];
        blocks.sort();
        assert_eq!(blocks.iter().map(|b| b.hash).collect::<Vec<_>>(), vec![
            Hash::from_u64_word(9),
            Hash::from_u64_word(1),
            Hash::from_u64_word(2)
        ]);
    }
}
