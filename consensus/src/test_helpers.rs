//! Builds DAGs over an in-memory database for tests and benchmarks.
//!
//! Blocks are admitted by precomputed hash. Besides the header the builder
//! records everything the coinbase of a later block reads: a DAA score, the
//! DAA-added merged blocks, acceptance data and a body whose coinbase is the
//! block's own expected coinbase transaction.

use crate::consensus::Consensus;
use crate::errors::{ConsensusResult, ConsistencyError};
use crate::model::stores::{
    AcceptanceDataStore, BlockStore, BlockStoreReader, DaaStore, DaaStoreReader, GhostdagStoreReader, StagingArea,
};
use crate::pipeline::HeaderProcessingResult;
use consensus_core::acceptance_data::{AcceptanceData, MergesetBlockAcceptanceData, TransactionAcceptanceData};
use consensus_core::coinbase::MinerData;
use consensus_core::config::params::Params;
use consensus_core::constants::MAX_TX_VERSION;
use consensus_core::ghostdag::GhostdagData;
use consensus_core::header::Header;
use consensus_core::subnets::SUBNETWORK_ID_NATIVE;
use consensus_core::tx::{Transaction, COINBASE_TRANSACTION_INDEX};
use consensus_core::{BlockHashMap, BlockHashSet, Hash};
use database::{KeyValueStore, MemoryDb};
use std::sync::Arc;
use tracing::Span;

/// A block to admit through [`DagBuilder::add`]
#[derive(Clone, Debug)]
pub struct TestBlock {
    pub hash: Hash,
    pub parents: Vec<Hash>,
    /// Defaults to the selected parent's score plus the number of DAA-added blocks
    pub daa_score: Option<u64>,
    pub miner_data: MinerData,
    /// Fees of the non-coinbase transactions of the body
    pub fees: Vec<u64>,
    /// Merged blocks left out of the difficulty window
    pub daa_excluded: BlockHashSet,
}

impl TestBlock {
    pub fn new(hash: Hash, parents: &[Hash]) -> Self {
        Self {
            hash,
            parents: parents.to_vec(),
            daa_score: None,
            miner_data: MinerData::default(),
            fees: Vec::new(),
            daa_excluded: BlockHashSet::new(),
        }
    }

    pub fn with_daa_score(mut self, daa_score: u64) -> Self {
        self.daa_score = Some(daa_score);
        self
    }

    pub fn with_miner_data(mut self, miner_data: MinerData) -> Self {
        self.miner_data = miner_data;
        self
    }

    pub fn with_fees(mut self, fees: Vec<u64>) -> Self {
        self.fees = fees;
        self
    }

    pub fn excluding_from_daa(mut self, merged_block: Hash) -> Self {
        self.daa_excluded.insert(merged_block);
        self
    }
}

pub struct DagBuilder {
    consensus: Consensus,
    fees: BlockHashMap<Vec<u64>>,
}

impl DagBuilder {
    /// A consensus instance over a fresh [`MemoryDb`] with genesis committed
    pub fn new(params: &Params) -> ConsensusResult<Self> {
        Self::with_db(Arc::new(MemoryDb::new()), params)
    }

    pub fn with_db(db: Arc<dyn KeyValueStore>, params: &Params) -> ConsensusResult<Self> {
        let consensus = Consensus::new(db, params, Span::none())?;
        consensus.init_genesis()?;
        Ok(Self { consensus, fees: BlockHashMap::new() })
    }

    pub fn genesis(&self) -> Hash {
        self.consensus.params().genesis_hash()
    }

    pub fn consensus(&self) -> &Consensus {
        &self.consensus
    }

    pub fn add_block(&mut self, hash: Hash, parents: &[Hash]) -> ConsensusResult<Arc<GhostdagData>> {
        self.add(TestBlock::new(hash, parents))
    }

    /// Admits the block and commits it together with its DAA, acceptance and body records
    pub fn add(&mut self, block: TestBlock) -> ConsensusResult<Arc<GhostdagData>> {
        let header = Header::from_precomputed_hash(block.hash, block.parents.clone());
        let mut staging = self.consensus.staging();
        let ghostdag_data = match self.consensus.header_processor().process_header(&mut staging, &header)? {
            HeaderProcessingResult::Accepted { ghostdag_data, .. } => ghostdag_data,
            HeaderProcessingResult::AlreadyExists(hash) => return Ok(Arc::new(staging.get_ghostdag_data(hash)?)),
        };

        let daa_added: Vec<Hash> =
            ghostdag_data.consensus_ordered_mergeset().filter(|merged| !block.daa_excluded.contains(merged)).collect();
        let daa_score = match block.daa_score {
            Some(daa_score) => daa_score,
            None => match ghostdag_data.selected_parent {
                Some(selected_parent) => staging.get_daa_score(selected_parent)? + daa_added.len() as u64,
                None => 0,
            },
        };
        staging.insert_daa_score(block.hash, daa_score)?;
        staging.insert_daa_added_blocks(block.hash, &daa_added)?;

        let acceptance_data = self.acceptance_data(&staging, &ghostdag_data)?;
        staging.insert_acceptance_data(block.hash, &acceptance_data)?;

        let coinbase =
            self.consensus.coinbase_manager().expected_coinbase_transaction(&staging, block.hash, &block.miner_data)?.tx;
        let mut transactions = vec![coinbase];
        transactions.extend(fee_transactions(block.hash, &block.fees));
        staging.insert_block_transactions(block.hash, &transactions)?;

        self.consensus.commit(staging)?;
        self.fees.insert(block.hash, block.fees);
        Ok(ghostdag_data)
    }

    pub fn ghostdag_data(&self, block: Hash) -> ConsensusResult<GhostdagData> {
        self.consensus.ghostdag_data(block)
    }

    /// The coinbase transaction stored in the block's body
    pub fn coinbase_of(&self, block: Hash) -> ConsensusResult<Transaction> {
        let transactions = self.consensus.staging().get_block_transactions(block)?;
        Ok(transactions.into_iter().nth(COINBASE_TRANSACTION_INDEX).ok_or(ConsistencyError::MissingCoinbase(block))?)
    }

    /// Every merged block gets its whole body accepted, in consensus merge set order
    fn acceptance_data(&self, staging: &StagingArea, ghostdag_data: &GhostdagData) -> ConsensusResult<AcceptanceData> {
        ghostdag_data
            .consensus_ordered_mergeset()
            .map(|merged| -> ConsensusResult<MergesetBlockAcceptanceData> {
                let transactions = staging.get_block_transactions(merged)?;
                let fees = self.fees.get(&merged).map(Vec::as_slice).unwrap_or_default();
                let accepted = transactions
                    .into_iter()
                    .enumerate()
                    .map(|(index, tx)| {
                        let fee = if index == COINBASE_TRANSACTION_INDEX { 0 } else { fees.get(index - 1).copied().unwrap_or(0) };
                        TransactionAcceptanceData::new(tx, true, fee)
                    })
                    .collect();
                Ok(MergesetBlockAcceptanceData::new(merged, accepted))
            })
            .collect()
    }
}

fn fee_transactions(block: Hash, fees: &[u64]) -> Vec<Transaction> {
    (0..fees.len())
        .map(|index| Transaction::new(MAX_TX_VERSION, vec![], vec![], index as u64, SUBNETWORK_ID_NATIVE, 0, block.as_bytes().to_vec()))
        .collect()
}
