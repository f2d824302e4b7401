use crate::errors::{ConsensusError, ConsensusResult, ConsistencyError};
use crate::model::stores::{GhostdagStoreReader, HeaderStoreReader, ReachabilityStoreReader};
use crate::processes::reachability::ReachabilityManager;
use crate::processes::services::{ReachabilityService, TraversalService};
use crate::processes::traversal::DagTraversalManager;
use consensus_core::errors::RuleError;
use consensus_core::ghostdag::{GhostdagData, SortableBlock};
use consensus_core::work::calc_work;
use consensus_core::{BlockHashMap, BlockHashSet, Hash, KType};
use tracing::{trace, Span};

enum ColoringOutput {
    Blue(KType, BlockHashMap<KType>),
    Red,
}

enum ColoringState {
    Blue,
    Red,
    Pending,
}

/// A block of the selected chain walked while coloring a candidate. The new
/// block itself has no hash yet from the point of view of the walk.
struct ChainBlock<'a> {
    hash: Option<Hash>,
    data: ChainBlockData<'a>,
}

enum ChainBlockData<'a> {
    New(&'a GhostdagData),
    Stored(GhostdagData),
}

impl ChainBlockData<'_> {
    fn get(&self) -> &GhostdagData {
        match self {
            ChainBlockData::New(data) => data,
            ChainBlockData::Stored(data) => data,
        }
    }
}

/// Computes the GHOSTDAG data of new blocks.
///
/// Classification is greedy and append-only: merge set blocks are visited in
/// `(blue_work, hash)` order and a block accepted as blue is never revoked.
/// A candidate is blue iff its anticone within the blues is at most `k` and no
/// blue in that anticone already has `k` blues in its own anticone.
#[derive(Clone)]
pub struct GhostdagManager<R: ReachabilityService = ReachabilityManager, T: TraversalService = DagTraversalManager<R>> {
    k: KType,
    reachability: R,
    traversal: T,
    span: Span,
}

impl<R: ReachabilityService, T: TraversalService> GhostdagManager<R, T> {
    pub fn new(k: KType, reachability: R, traversal: T, span: Span) -> Self {
        Self { k, reachability, traversal, span }
    }

    pub fn k(&self) -> KType {
        self.k
    }

    pub fn genesis_ghostdag_data(&self) -> GhostdagData {
        GhostdagData::genesis()
    }

    /// The parent with the highest blue score, the smaller hash winning ties
    pub fn find_selected_parent<S>(&self, store: &S, block: Hash, parents: &[Hash]) -> ConsensusResult<Hash>
    where
        S: GhostdagStoreReader + ?Sized,
    {
        let mut selected: Option<(u64, Hash)> = None;
        for &parent in parents {
            let blue_score = store.get_blue_score(parent)?;
            selected = match selected {
                Some((best_score, best)) if best_score > blue_score || (best_score == blue_score && best < parent) => {
                    Some((best_score, best))
                }
                _ => Some((blue_score, parent)),
            };
        }
        selected.map(|(_, hash)| hash).ok_or_else(|| ConsensusError::validation(block, RuleError::NoParents))
    }

    /// Computes the GHOSTDAG data of `block` from the committed (or staged) data
    /// of its parents. Missing parent data surfaces as `NotFound`.
    pub fn ghostdag<S>(&self, store: &S, block: Hash, parents: &[Hash]) -> ConsensusResult<GhostdagData>
    where
        S: GhostdagStoreReader + HeaderStoreReader + ReachabilityStoreReader + ?Sized,
    {
        let _enter = self.span.enter();
        if parents.is_empty() {
            return Err(ConsensusError::validation(block, RuleError::NoParents));
        }
        let mut seen = BlockHashSet::with_capacity(parents.len());
        if let Some(duplicate) = parents.iter().find(|p| !seen.insert(**p)) {
            return Err(ConsensusError::validation(block, RuleError::DuplicateParents(*duplicate)));
        }

        let selected_parent = self.find_selected_parent(store, block, parents)?;
        for &parent in parents.iter().filter(|p| **p != selected_parent) {
            if self.reachability.is_dag_ancestor_of(store, parent, selected_parent)? {
                return Err(ConsensusError::validation(block, RuleError::InvalidParentsRelation(parent, selected_parent)));
            }
        }

        let mergeset = self.traversal.unordered_mergeset_without_selected_parent(store, selected_parent, parents)?;
        let ordered_mergeset = self.sort_blocks(store, mergeset)?;

        let mut new_block_data = GhostdagData::new_with_selected_parent(selected_parent, self.k);
        for blue_candidate in ordered_mergeset {
            match self.check_blue_candidate(store, block, &new_block_data, blue_candidate)? {
                ColoringOutput::Blue(blue_anticone_size, blues_anticone_sizes) => {
                    new_block_data.add_blue(blue_candidate, blue_anticone_size, &blues_anticone_sizes)
                }
                ColoringOutput::Red => new_block_data.add_red(blue_candidate),
            }
        }

        let selected_parent_data = store.get_compact_ghostdag_data(selected_parent)?;
        let blue_score = selected_parent_data.blue_score + new_block_data.mergeset_blues.len() as u64;
        let mut blue_work = selected_parent_data.blue_work;
        for &blue in new_block_data.mergeset_blues.iter() {
            let work = calc_work(store.get_bits(blue)?).map_err(|err| ConsensusError::validation(blue, err))?;
            blue_work = blue_work.checked_add(work).ok_or_else(|| ConsensusError::validation(block, RuleError::BlueWorkOverflow))?;
        }
        new_block_data.finalize_score_and_work(blue_score, blue_work);

        trace!(
            "ghostdag of {}: selected parent {}, {} blues, {} reds, blue score {}",
            block,
            selected_parent,
            new_block_data.mergeset_blues.len(),
            new_block_data.mergeset_reds.len(),
            blue_score
        );
        Ok(new_block_data)
    }

    /// Orders blocks by `(blue_work, hash)`, a topological order with hash tie-breaks
    pub fn sort_blocks<S, I>(&self, store: &S, blocks: I) -> ConsensusResult<Vec<Hash>>
    where
        S: GhostdagStoreReader + ?Sized,
        I: IntoIterator<Item = Hash>,
    {
        let mut sortable = blocks
            .into_iter()
            .map(|hash| Ok(SortableBlock::new(hash, store.get_blue_work(hash)?)))
            .collect::<ConsensusResult<Vec<_>>>()?;
        sortable.sort();
        Ok(sortable.into_iter().map(|block| block.hash).collect())
    }

    fn check_blue_candidate<S>(
        &self,
        store: &S,
        block: Hash,
        new_block_data: &GhostdagData,
        blue_candidate: Hash,
    ) -> ConsensusResult<ColoringOutput>
    where
        S: GhostdagStoreReader + HeaderStoreReader + ReachabilityStoreReader + ?Sized,
    {
        // The blues include the selected parent, so there are at most k + 1 of them
        if new_block_data.mergeset_blues.len() as u64 == self.k as u64 + 1 {
            return Ok(ColoringOutput::Red);
        }

        let mut candidate_blues_anticone_sizes = BlockHashMap::with_capacity(self.k as usize);
        let mut candidate_blue_anticone_size: KType = 0;
        let mut chain_block = ChainBlock { hash: None, data: ChainBlockData::New(new_block_data) };

        loop {
            let state = self.check_blue_candidate_with_chain_block(
                store,
                block,
                new_block_data,
                &chain_block,
                blue_candidate,
                &mut candidate_blues_anticone_sizes,
                &mut candidate_blue_anticone_size,
            )?;
            match state {
                ColoringState::Blue => return Ok(ColoringOutput::Blue(candidate_blue_anticone_size, candidate_blues_anticone_sizes)),
                ColoringState::Red => return Ok(ColoringOutput::Red),
                ColoringState::Pending => {}
            }
            let next = chain_block.data.get().selected_parent.ok_or(ConsistencyError::SelectedChainExhausted(block))?;
            chain_block = ChainBlock { hash: Some(next), data: ChainBlockData::Stored(store.get_ghostdag_data(next)?) };
        }
    }

    /// Checks the candidate against the blues merged by one block of the
    /// selected chain
    #[allow(clippy::too_many_arguments)]
    fn check_blue_candidate_with_chain_block<S>(
        &self,
        store: &S,
        block: Hash,
        new_block_data: &GhostdagData,
        chain_block: &ChainBlock,
        blue_candidate: Hash,
        candidate_blues_anticone_sizes: &mut BlockHashMap<KType>,
        candidate_blue_anticone_size: &mut KType,
    ) -> ConsensusResult<ColoringState>
    where
        S: GhostdagStoreReader + HeaderStoreReader + ReachabilityStoreReader + ?Sized,
    {
        // Once the candidate is in the future of a chain block, every blue left
        // to check is in the candidate's past
        if let Some(hash) = chain_block.hash {
            if self.reachability.is_dag_ancestor_of(store, hash, blue_candidate)? {
                return Ok(ColoringState::Blue);
            }
        }

        for &blue in chain_block.data.get().mergeset_blues.iter() {
            if self.reachability.is_dag_ancestor_of(store, blue, blue_candidate)? {
                continue;
            }

            let blue_anticone_size = self.traversal.blue_anticone_size(store, blue, block, new_block_data)?;
            candidate_blues_anticone_sizes.insert(blue, blue_anticone_size);

            *candidate_blue_anticone_size = candidate_blue_anticone_size.saturating_add(1);
            if *candidate_blue_anticone_size > self.k {
                // the candidate's blue anticone exceeds k
                return Ok(ColoringState::Red);
            }
            if blue_anticone_size >= self.k {
                // the blue already has k blues in its anticone
                return Ok(ColoringState::Red);
            }
        }
        Ok(ColoringState::Pending)
    }
}
