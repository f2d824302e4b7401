//! Expected coinbase transactions and the deflationary subsidy schedule.

use crate::errors::{ConsensusError, ConsensusResult, ConsistencyError};
use crate::model::stores::{
    AcceptanceDataStoreReader, BlockStoreReader, DaaStoreReader, GhostdagStoreReader, TrustedGhostdagStoreReader,
};
use consensus_core::acceptance_data::MergesetBlockAcceptanceData;
use consensus_core::coinbase::*;
use consensus_core::config::params::Params;
use consensus_core::config::subsidy::SubsidyTable;
use consensus_core::constants::MAX_TX_VERSION;
use consensus_core::errors::{CoinbaseError, CoinbaseResult};
use consensus_core::ghostdag::GhostdagData;
use consensus_core::subnets::SUBNETWORK_ID_COINBASE;
use consensus_core::tx::{ScriptPublicKey, ScriptVec, Transaction, TransactionOutput, COINBASE_TRANSACTION_INDEX};
use consensus_core::{BlockHashSet, Hash};
use tracing::{trace, Span};

/// Builds the coinbase transaction a block must carry.
///
/// A block pays every blue block of its merge set that it adds to its
/// difficulty window one itemized output (subsidy plus accepted fees) to that
/// block's own miner. The rewards of such red blocks are summed into a single
/// output paying the merging block's miner.
#[derive(Clone)]
pub struct CoinbaseManager {
    coinbase_payload_script_public_key_max_len: u8,
    max_coinbase_payload_len: usize,

    genesis_hash: Hash,
    genesis_reward: u64,
    pre_deflationary_phase_base_subsidy: u64,
    deflationary_phase_daa_score: u64,
    seconds_per_month: u64,
    subsidy_table: SubsidyTable,

    span: Span,
}

impl CoinbaseManager {
    pub fn new(params: &Params, span: Span) -> Self {
        Self {
            coinbase_payload_script_public_key_max_len: params.coinbase_payload_script_public_key_max_len,
            max_coinbase_payload_len: params.max_coinbase_payload_len,
            genesis_hash: params.genesis_hash(),
            genesis_reward: params.genesis_reward,
            pre_deflationary_phase_base_subsidy: params.pre_deflationary_phase_base_subsidy,
            deflationary_phase_daa_score: params.deflationary_phase_daa_score,
            seconds_per_month: params.seconds_per_month,
            subsidy_table: params.subsidy_table.clone(),
            span,
        }
    }

    pub fn expected_coinbase_transaction<S>(
        &self,
        store: &S,
        block: Hash,
        miner_data: &MinerData,
    ) -> ConsensusResult<CoinbaseTransactionTemplate>
    where
        S: GhostdagStoreReader
            + TrustedGhostdagStoreReader
            + AcceptanceDataStoreReader
            + DaaStoreReader
            + BlockStoreReader
            + ?Sized,
    {
        let _enter = self.span.enter();
        let ghostdag_data = self.coinbase_ghostdag_data(store, block)?;
        let acceptance_data = store.get_acceptance_data(block)?;
        let daa_added_blocks = store.get_daa_added_blocks(block)?;

        let mergeset_size = ghostdag_data.mergeset_size();
        if acceptance_data.len() != mergeset_size {
            return Err(ConsistencyError::AcceptanceDataLength { block, expected: mergeset_size, found: acceptance_data.len() }.into());
        }

        let blues_count = ghostdag_data.mergeset_blues.len();
        let mut outputs = Vec::with_capacity(blues_count + 1);
        let mut red_reward = 0u64;
        for (index, (merged_block, block_acceptance)) in ghostdag_data.consensus_ordered_mergeset().zip(acceptance_data.iter()).enumerate() {
            if block_acceptance.block_hash != merged_block {
                return Err(ConsistencyError::AcceptanceDataMismatch {
                    block,
                    index,
                    expected: merged_block,
                    found: block_acceptance.block_hash,
                }
                .into());
            }
            let reward = self.calc_merged_block_reward(store, merged_block, block_acceptance, &daa_added_blocks)?;
            if index < blues_count {
                if reward > 0 {
                    let script_public_key = self.merged_block_script_public_key(merged_block, block_acceptance)?;
                    outputs.push(TransactionOutput::new(reward, script_public_key));
                }
            } else {
                red_reward = red_reward.checked_add(reward).ok_or(ConsistencyError::RewardOverflow(block))?;
            }
        }

        let has_red_reward = red_reward > 0;
        if has_red_reward {
            outputs.push(TransactionOutput::new(red_reward, miner_data.script_public_key.clone()));
        }

        let subsidy = self.calc_block_subsidy(store, block)?;
        let payload = self
            .serialize_coinbase_payload(&CoinbaseData { blue_score: ghostdag_data.blue_score, subsidy, miner_data: miner_data.clone() })
            .map_err(|err| ConsensusError::validation(block, err))?;

        trace!("expected coinbase of {}: {} outputs, red reward: {}", block, outputs.len(), has_red_reward);
        let tx = Transaction::new(MAX_TX_VERSION, vec![], outputs, 0, SUBNETWORK_ID_COINBASE, 0, payload);
        Ok(CoinbaseTransactionTemplate { tx, has_red_reward })
    }

    /// The subsidy a block is entitled to, by its DAA score
    pub fn calc_block_subsidy<S>(&self, store: &S, block: Hash) -> ConsensusResult<u64>
    where
        S: DaaStoreReader + ?Sized,
    {
        if block == self.genesis_hash {
            return Ok(self.genesis_reward);
        }
        Ok(self.subsidy_by_daa_score(store.get_daa_score(block)?))
    }

    pub fn subsidy_by_daa_score(&self, daa_score: u64) -> u64 {
        if daa_score < self.deflationary_phase_daa_score {
            return self.pre_deflationary_phase_base_subsidy;
        }
        // a zero month length never advances past the first month
        let months = (daa_score - self.deflationary_phase_daa_score).checked_div(self.seconds_per_month).unwrap_or(0);
        self.subsidy_table.subsidy_for_month(months)
    }

    /// Payload layout, little endian:
    /// blue score (u64) | subsidy (u64) | script version (u16) | script length (u8) | script | extra data
    pub fn serialize_coinbase_payload(&self, data: &CoinbaseData) -> CoinbaseResult<Vec<u8>> {
        let script = data.miner_data.script_public_key.script();
        if script.len() > self.coinbase_payload_script_public_key_max_len as usize {
            return Err(CoinbaseError::PayloadScriptPublicKeyLenAboveMax(
                script.len(),
                self.coinbase_payload_script_public_key_max_len,
            ));
        }
        let payload_len = MIN_PAYLOAD_LENGTH + script.len() + data.miner_data.extra_data.len();
        if payload_len > self.max_coinbase_payload_len {
            return Err(CoinbaseError::PayloadLenAboveMax(payload_len, self.max_coinbase_payload_len));
        }

        let mut payload = Vec::with_capacity(payload_len);
        payload.extend_from_slice(&data.blue_score.to_le_bytes());
        payload.extend_from_slice(&data.subsidy.to_le_bytes());
        payload.extend_from_slice(&data.miner_data.script_public_key.version().to_le_bytes());
        payload.push(script.len() as u8);
        payload.extend_from_slice(script);
        payload.extend_from_slice(&data.miner_data.extra_data);
        Ok(payload)
    }

    /// Parses a coinbase payload back into the blue score, subsidy and miner data it commits to
    pub fn extract_coinbase_data(&self, coinbase: &Transaction) -> CoinbaseResult<CoinbaseData> {
        if !coinbase.is_coinbase() {
            return Err(CoinbaseError::NotCoinbase(coinbase.id()));
        }
        let payload = &coinbase.payload;
        if payload.len() < MIN_PAYLOAD_LENGTH {
            return Err(CoinbaseError::PayloadLenBelowMin(payload.len(), MIN_PAYLOAD_LENGTH));
        }

        let (blue_score, rest) = payload.split_at(LENGTH_OF_BLUE_SCORE);
        let (subsidy, rest) = rest.split_at(LENGTH_OF_SUBSIDY);
        let (version, rest) = rest.split_at(LENGTH_OF_SCRIPT_PUB_KEY_VERSION);
        let (script_len, rest) = rest.split_at(LENGTH_OF_SCRIPT_PUB_KEY_LENGTH);
        let script_len = script_len[0];

        if script_len > self.coinbase_payload_script_public_key_max_len {
            return Err(CoinbaseError::PayloadScriptPublicKeyLenAboveMax(
                script_len as usize,
                self.coinbase_payload_script_public_key_max_len,
            ));
        }
        if rest.len() < script_len as usize {
            return Err(CoinbaseError::PayloadCantContainScriptPublicKey(
                payload.len(),
                MIN_PAYLOAD_LENGTH + script_len as usize,
            ));
        }
        let (script, extra_data) = rest.split_at(script_len as usize);

        Ok(CoinbaseData {
            blue_score: u64::from_le_bytes(to_array(blue_score)),
            subsidy: u64::from_le_bytes(to_array(subsidy)),
            miner_data: MinerData::new(
                ScriptPublicKey::new(u16::from_le_bytes(to_array(version)), ScriptVec::from_slice(script)),
                extra_data.to_vec(),
            ),
        })
    }

    /// Trusted GHOSTDAG data keeps the merge set a block was mined with, so it wins when present
    fn coinbase_ghostdag_data<S>(&self, store: &S, block: Hash) -> ConsensusResult<GhostdagData>
    where
        S: GhostdagStoreReader + TrustedGhostdagStoreReader + ?Sized,
    {
        if store.has_trusted_ghostdag_data(block)? {
            Ok(store.get_trusted_ghostdag_data(block)?)
        } else {
            Ok(store.get_ghostdag_data(block)?)
        }
    }

    /// Subsidy committed in the merged block's own coinbase plus the fees of
    /// its accepted transactions, zero if the merging block does not add it to
    /// its difficulty window
    fn calc_merged_block_reward<S>(
        &self,
        store: &S,
        merged_block: Hash,
        block_acceptance: &MergesetBlockAcceptanceData,
        daa_added_blocks: &BlockHashSet,
    ) -> ConsensusResult<u64>
    where
        S: BlockStoreReader + ?Sized,
    {
        if !daa_added_blocks.contains(&merged_block) {
            return Ok(0);
        }
        let total_fees = block_acceptance.total_fees().ok_or(ConsistencyError::RewardOverflow(merged_block))?;
        let transactions = store.get_block_transactions(merged_block)?;
        let coinbase = transactions.get(COINBASE_TRANSACTION_INDEX).ok_or(ConsistencyError::MissingCoinbase(merged_block))?;
        let coinbase_data = self.extract_coinbase_data(coinbase).map_err(|err| ConsensusError::validation(merged_block, err))?;
        Ok(coinbase_data.subsidy.checked_add(total_fees).ok_or(ConsistencyError::RewardOverflow(merged_block))?)
    }

    /// The miner of a blue merged block, read from the coinbase it got accepted with
    fn merged_block_script_public_key(
        &self,
        merged_block: Hash,
        block_acceptance: &MergesetBlockAcceptanceData,
    ) -> ConsensusResult<ScriptPublicKey> {
        let coinbase = block_acceptance
            .accepted_transactions
            .get(COINBASE_TRANSACTION_INDEX)
            .ok_or(ConsistencyError::MissingCoinbase(merged_block))?;
        let coinbase_data =
            self.extract_coinbase_data(&coinbase.transaction).map_err(|err| ConsensusError::validation(merged_block, err))?;
        Ok(coinbase_data.miner_data.script_public_key)
    }
}

fn to_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut array = [0u8; N];
    array.copy_from_slice(slice);
    array
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stores::DaaStore;
    use consensus_core::config::subsidy::SUBSIDY_BY_MONTH_TABLE;
    use consensus_core::constants::SOMPI_PER_COIN;
    use consensus_core::subnets::SUBNETWORK_ID_NATIVE;
    use database::{ConsensusStorage, MemoryDb};
    use std::sync::Arc;

    fn manager() -> (CoinbaseManager, Params) {
        let params = Params::devnet();
        (CoinbaseManager::new(&params, Span::none()), params)
    }

    fn miner_data(script_len: usize, extra_data: &[u8]) -> MinerData {
        MinerData::new(ScriptPublicKey::from_vec(0, vec![0xac; script_len]), extra_data.to_vec())
    }

    fn coinbase_with_payload(payload: Vec<u8>) -> Transaction {
        Transaction::new(MAX_TX_VERSION, vec![], vec![], 0, SUBNETWORK_ID_COINBASE, 0, payload)
    }

    #[test]
    fn test_payload_layout() {
        let (manager, _) = manager();
        let data = CoinbaseData { blue_score: 0x0102, subsidy: 7, miner_data: miner_data(3, b"/miner") };
        let payload = manager.serialize_coinbase_payload(&data).unwrap();

        assert_eq!(payload.len(), MIN_PAYLOAD_LENGTH + 3 + 6);
        assert_eq!(&payload[0..8], &0x0102u64.to_le_bytes());
        assert_eq!(&payload[8..16], &7u64.to_le_bytes());
        assert_eq!(&payload[16..18], &[0, 0]);
        assert_eq!(payload[18], 3);
        assert_eq!(&payload[19..22], &[0xac; 3]);
        assert_eq!(&payload[22..], b"/miner");

        let extracted = manager.extract_coinbase_data(&coinbase_with_payload(payload)).unwrap();
        assert_eq!(extracted, data);
    }

    #[test]
    fn test_payload_limits() {
        let (manager, params) = manager();
        let max_script = params.coinbase_payload_script_public_key_max_len as usize;

        let data = CoinbaseData { blue_score: 1, subsidy: 1, miner_data: miner_data(max_script + 1, &[]) };
        assert!(matches!(
            manager.serialize_coinbase_payload(&data),
            Err(CoinbaseError::PayloadScriptPublicKeyLenAboveMax(len, _)) if len == max_script + 1
        ));

        let extra = vec![0u8; params.max_coinbase_payload_len];
        let data = CoinbaseData { blue_score: 1, subsidy: 1, miner_data: miner_data(0, &extra) };
        assert!(matches!(manager.serialize_coinbase_payload(&data), Err(CoinbaseError::PayloadLenAboveMax(_, _))));

        let extra = vec![0u8; params.max_coinbase_payload_len - MIN_PAYLOAD_LENGTH - max_script];
        let data = CoinbaseData { blue_score: 1, subsidy: 1, miner_data: miner_data(max_script, &extra) };
        assert_eq!(manager.serialize_coinbase_payload(&data).unwrap().len(), params.max_coinbase_payload_len);
    }

    #[test]
    fn test_malformed_payloads() {
        let (manager, _) = manager();

        let native = Transaction::new(MAX_TX_VERSION, vec![], vec![], 0, SUBNETWORK_ID_NATIVE, 0, vec![]);
        assert!(matches!(manager.extract_coinbase_data(&native), Err(CoinbaseError::NotCoinbase(_))));

        let short = coinbase_with_payload(vec![0; MIN_PAYLOAD_LENGTH - 1]);
        assert!(matches!(manager.extract_coinbase_data(&short), Err(CoinbaseError::PayloadLenBelowMin(_, _))));

        // declares a 10 byte script but carries only 4
        let mut payload = vec![0u8; MIN_PAYLOAD_LENGTH + 4];
        payload[MIN_PAYLOAD_LENGTH - 1] = 10;
        assert!(matches!(
            manager.extract_coinbase_data(&coinbase_with_payload(payload)),
            Err(CoinbaseError::PayloadCantContainScriptPublicKey(_, 29))
        ));

        let mut payload = vec![0u8; MIN_PAYLOAD_LENGTH];
        payload[MIN_PAYLOAD_LENGTH - 1] = u8::MAX;
        assert!(matches!(
            manager.extract_coinbase_data(&coinbase_with_payload(payload)),
            Err(CoinbaseError::PayloadScriptPublicKeyLenAboveMax(255, _))
        ));
    }

    #[test]
    fn test_subsidy_schedule() {
        let (manager, params) = manager();
        let phase = params.deflationary_phase_daa_score;
        let month = params.seconds_per_month;

        assert_eq!(manager.subsidy_by_daa_score(0), 12 * SOMPI_PER_COIN);
        assert_eq!(manager.subsidy_by_daa_score(phase - 1), params.pre_deflationary_phase_base_subsidy);
        assert_eq!(manager.subsidy_by_daa_score(phase), SUBSIDY_BY_MONTH_TABLE[0]);
        assert_eq!(manager.subsidy_by_daa_score(phase + month - 1), SUBSIDY_BY_MONTH_TABLE[0]);
        assert_eq!(manager.subsidy_by_daa_score(phase + month), SUBSIDY_BY_MONTH_TABLE[1]);
        assert_eq!(manager.subsidy_by_daa_score(phase + 12 * month), SUBSIDY_BY_MONTH_TABLE[0] / 2);
        assert_eq!(manager.subsidy_by_daa_score(u64::MAX), 0);
    }

    #[test]
    fn test_zero_month_length_does_not_panic() {
        let params = Params { seconds_per_month: 0, ..Params::devnet() };
        let manager = CoinbaseManager::new(&params, Span::none());
        let phase = params.deflationary_phase_daa_score;
        assert_eq!(manager.subsidy_by_daa_score(phase + 1_000_000), SUBSIDY_BY_MONTH_TABLE[0]);
        assert_eq!(manager.subsidy_by_daa_score(phase - 1), params.pre_deflationary_phase_base_subsidy);
    }

    #[test]
    fn test_block_subsidy_reads_daa_score() {
        let params = Params { genesis_reward: 5, ..Params::devnet() };
        let manager = CoinbaseManager::new(&params, Span::none());
        let storage = ConsensusStorage::new(Arc::new(MemoryDb::new()));
        let mut staging = storage.staging();

        let block = Hash::from_u64_word(7);
        staging.insert_daa_score(block, params.deflationary_phase_daa_score).unwrap();
        assert_eq!(manager.calc_block_subsidy(&staging, block).unwrap(), SUBSIDY_BY_MONTH_TABLE[0]);

        // the genesis reward does not depend on a stored score
        assert_eq!(manager.calc_block_subsidy(&staging, params.genesis_hash()).unwrap(), 5);

        let err = manager.calc_block_subsidy(&staging, Hash::from_u64_word(8)).unwrap_err();
        assert!(err.is_not_found());
    }
}
