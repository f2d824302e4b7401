//! The consensus facade.
//!
//! Owns the committed stores and the managers built from the network
//! parameters. Every admission runs in its own staging area and becomes
//! visible only through [`Consensus::commit`].

use crate::errors::{ConsensusError, ConsensusResult};
use crate::model::stores::{
    AcceptanceDataStore, BlockStore, DaaStore, GhostdagStoreReader, HeaderStoreReader, PruningStore, PruningStoreReader,
};
use crate::pipeline::{HeaderProcessingResult, HeaderProcessor};
use crate::processes::coinbase::CoinbaseManager;
use crate::processes::ghostdag::GhostdagManager;
use crate::processes::reachability::ReachabilityManager;
use crate::processes::traversal::DagTraversalManager;
use consensus_core::coinbase::{CoinbaseData, CoinbaseTransactionTemplate, MinerData};
use consensus_core::config::params::Params;
use consensus_core::constants::MAX_TX_VERSION;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::header::Header;
use consensus_core::subnets::SUBNETWORK_ID_COINBASE;
use consensus_core::tx::Transaction;
use consensus_core::Hash;
use database::{ConsensusStorage, KeyValueStore, StagingArea};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, info_span, Span};

pub struct Consensus {
    params: Params,
    storage: ConsensusStorage,

    reachability: ReachabilityManager,
    traversal: DagTraversalManager,
    ghostdag: GhostdagManager,
    coinbase: CoinbaseManager,
    header_processor: HeaderProcessor,

    span: Span,
}

impl Consensus {
    /// Validates `params` and builds the managers over `db`. Each manager logs
    /// inside a child span of `span`.
    pub fn new(db: Arc<dyn KeyValueStore>, params: &Params, span: Span) -> ConsensusResult<Self> {
        params.validate()?;
        let child = |name: &'static str| info_span!(parent: &span, "manager", name);
        let reachability = ReachabilityManager::new(params.reachability, child("reachability"));
        let traversal = DagTraversalManager::new(reachability.clone(), child("traversal"));
        let ghostdag = GhostdagManager::new(params.ghostdag_k, reachability.clone(), traversal.clone(), child("ghostdag"));
        let coinbase = CoinbaseManager::new(params, child("coinbase"));
        let header_processor = HeaderProcessor::new(ghostdag.clone(), reachability.clone(), child("header_processor"));

        Ok(Self {
            params: params.clone(),
            storage: ConsensusStorage::new(db),
            reachability,
            traversal,
            ghostdag,
            coinbase,
            header_processor,
            span,
        })
    }

    /// Commits the genesis block: header, GHOSTDAG data, reachability root,
    /// its coinbase body and the records the coinbase of its children reads.
    /// Does nothing when genesis was already committed.
    pub fn init_genesis(&self) -> ConsensusResult<()> {
        let _enter = self.span.enter();
        let genesis = self.params.genesis.header();
        let mut staging = self.storage.staging();
        if staging.has_header(genesis.hash)? {
            return Ok(());
        }

        self.header_processor.process_genesis(&mut staging, &genesis)?;

        let payload = self
            .coinbase
            .serialize_coinbase_payload(&CoinbaseData {
                blue_score: 0,
                subsidy: self.params.genesis_reward,
                miner_data: MinerData::default(),
            })
            .map_err(|err| ConsensusError::validation(genesis.hash, err))?;
        let coinbase = Transaction::new(MAX_TX_VERSION, vec![], vec![], 0, SUBNETWORK_ID_COINBASE, 0, payload);
        staging.insert_block_transactions(genesis.hash, &[coinbase])?;
        staging.insert_daa_score(genesis.hash, 0)?;
        staging.insert_daa_added_blocks(genesis.hash, &[])?;
        staging.insert_acceptance_data(genesis.hash, &Vec::new())?;
        staging.set_pruning_point(genesis.hash)?;

        self.commit(staging)?;
        info!("initialized {} genesis {}", self.params.network, genesis.hash);
        Ok(())
    }

    /// A fresh staging area over the committed state
    pub fn staging(&self) -> StagingArea {
        self.storage.staging()
    }

    /// Atomically commits a staging area. A conflicting commit writes nothing
    /// and reports an error for which `is_conflict()` holds.
    pub fn commit(&self, staging: StagingArea) -> ConsensusResult<()> {
        Ok(self.storage.commit(staging)?)
    }

    /// Admits a header in its own staging area and commits it
    pub fn admit_header(&self, header: &Header) -> ConsensusResult<HeaderProcessingResult> {
        let mut staging = self.storage.staging();
        let result = self.header_processor.process_header(&mut staging, header)?;
        if let HeaderProcessingResult::Accepted { .. } = result {
            self.commit(staging)?;
        }
        Ok(result)
    }

    pub fn ghostdag_data(&self, block: Hash) -> ConsensusResult<GhostdagData> {
        Ok(self.storage.staging().get_ghostdag_data(block)?)
    }

    pub fn is_dag_ancestor_of(&self, this: Hash, queried: Hash) -> ConsensusResult<bool> {
        Ok(self.reachability.is_dag_ancestor_of(&self.storage.staging(), this, queried)?)
    }

    pub fn compare_order(&self, a: Hash, b: Hash) -> ConsensusResult<Ordering> {
        Ok(self.reachability.compare_order(&self.storage.staging(), a, b)?)
    }

    pub fn expected_coinbase_transaction(&self, block: Hash, miner_data: &MinerData) -> ConsensusResult<CoinbaseTransactionTemplate> {
        self.coinbase.expected_coinbase_transaction(&self.storage.staging(), block, miner_data)
    }

    pub fn calc_block_subsidy(&self, block: Hash) -> ConsensusResult<u64> {
        self.coinbase.calc_block_subsidy(&self.storage.staging(), block)
    }

    pub fn pruning_point(&self) -> ConsensusResult<Hash> {
        Ok(self.storage.staging().pruning_point()?)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn storage(&self) -> &ConsensusStorage {
        &self.storage
    }

    pub fn header_processor(&self) -> &HeaderProcessor {
        &self.header_processor
    }

    pub fn reachability_manager(&self) -> &ReachabilityManager {
        &self.reachability
    }

    pub fn traversal_manager(&self) -> &DagTraversalManager {
        &self.traversal
    }

    pub fn ghostdag_manager(&self) -> &GhostdagManager {
        &self.ghostdag
    }

    pub fn coinbase_manager(&self) -> &CoinbaseManager {
        &self.coinbase
    }
}
