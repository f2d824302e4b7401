//! Header processor for consensus
//!
//! Admits block headers: GHOSTDAG data first (it reads the parents' committed
//! reachability), then the header itself and its reachability entry.

use crate::errors::{ConsensusError, ConsensusResult};
use crate::model::stores::{GhostdagStore, HeaderStore, ReachabilityStore};
use crate::processes::ghostdag::GhostdagManager;
use crate::processes::reachability::ReachabilityManager;
use consensus_core::errors::RuleError;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::header::Header;
use consensus_core::work::calc_work;
use consensus_core::Hash;
use std::sync::Arc;
use tracing::{debug, Span};

/// Result of header processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderProcessingResult {
    /// Header was accepted and its data staged
    Accepted { hash: Hash, ghostdag_data: Arc<GhostdagData> },
    /// Header already exists
    AlreadyExists(Hash),
}

impl HeaderProcessingResult {
    pub fn hash(&self) -> Hash {
        match self {
            HeaderProcessingResult::Accepted { hash, .. } => *hash,
            HeaderProcessingResult::AlreadyExists(hash) => *hash,
        }
    }

    pub fn ghostdag_data(&self) -> Option<&Arc<GhostdagData>> {
        match self {
            HeaderProcessingResult::Accepted { ghostdag_data, .. } => Some(ghostdag_data),
            HeaderProcessingResult::AlreadyExists(_) => None,
        }
    }
}

/// Header processor for header-only processing
#[derive(Clone)]
pub struct HeaderProcessor {
    ghostdag: GhostdagManager,
    reachability: ReachabilityManager,
    span: Span,
}

impl HeaderProcessor {
    pub fn new(ghostdag: GhostdagManager, reachability: ReachabilityManager, span: Span) -> Self {
        Self { ghostdag, reachability, span }
    }

    /// Stages the genesis header as the root of the reachability tree
    pub fn process_genesis<S>(&self, store: &mut S, header: &Header) -> ConsensusResult<HeaderProcessingResult>
    where
        S: HeaderStore + GhostdagStore + ReachabilityStore + ?Sized,
    {
        let _enter = self.span.enter();
        let hash = header.hash;
        if store.has_header(hash)? {
            return Ok(HeaderProcessingResult::AlreadyExists(hash));
        }
        if !header.is_genesis() {
            return Err(ConsensusError::validation(hash, RuleError::GenesisWithParents));
        }
        calc_work(header.bits).map_err(|err| ConsensusError::validation(hash, err))?;

        let ghostdag_data = self.ghostdag.genesis_ghostdag_data();
        store.insert_header(header)?;
        store.insert_ghostdag_data(hash, &ghostdag_data)?;
        self.reachability.init(store, hash)?;

        debug!("staged genesis {}", hash);
        Ok(HeaderProcessingResult::Accepted { hash, ghostdag_data: Arc::new(ghostdag_data) })
    }

    /// Stages a header whose parents were all admitted before
    pub fn process_header<S>(&self, store: &mut S, header: &Header) -> ConsensusResult<HeaderProcessingResult>
    where
        S: HeaderStore + GhostdagStore + ReachabilityStore + ?Sized,
    {
        let _enter = self.span.enter();
        let hash = header.hash;
        if store.has_header(hash)? {
            return Ok(HeaderProcessingResult::AlreadyExists(hash));
        }
        calc_work(header.bits).map_err(|err| ConsensusError::validation(hash, err))?;

        let ghostdag_data = self.ghostdag.ghostdag(store, hash, header.direct_parents())?;
        let selected_parent = ghostdag_data.selected_parent.ok_or_else(|| ConsensusError::validation(hash, RuleError::NoParents))?;

        store.insert_header(header)?;
        store.insert_ghostdag_data(hash, &ghostdag_data)?;
        self.reachability.add_block(store, hash, selected_parent, ghostdag_data.mergeset_without_selected_parent())?;

        debug!(
            "staged header {} with blue score {} ({} blues, {} reds)",
            hash,
            ghostdag_data.blue_score,
            ghostdag_data.mergeset_blues.len(),
            ghostdag_data.mergeset_reds.len()
        );
        Ok(HeaderProcessingResult::Accepted { hash, ghostdag_data: Arc::new(ghostdag_data) })
    }
}
