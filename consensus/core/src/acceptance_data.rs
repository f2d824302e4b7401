use crate::{tx::Transaction, Hash};
use serde::{Deserialize, Serialize};

/// Acceptance data of a block: one entry per merged block, in the consensus
/// order of the merge set (blues with the selected parent first, then reds).
pub type AcceptanceData = Vec<MergesetBlockAcceptanceData>;

/// Which transactions of a merged block were accepted, and the fee each one paid.
/// The first transaction is the merged block's own coinbase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergesetBlockAcceptanceData {
    pub block_hash: Hash,
    pub accepted_transactions: Vec<TransactionAcceptanceData>,
}

impl MergesetBlockAcceptanceData {
    pub fn new(block_hash: Hash, accepted_transactions: Vec<TransactionAcceptanceData>) -> Self {
        Self { block_hash, accepted_transactions }
    }

    /// Sum of the fees of accepted transactions, `None` on overflow
    pub fn total_fees(&self) -> Option<u64> {
        self.accepted_transactions.iter().filter(|tx| tx.is_accepted).try_fold(0u64, |acc, tx| acc.checked_add(tx.fee))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAcceptanceData {
    pub transaction: Transaction,
    pub is_accepted: bool,
    pub fee: u64,
}

impl TransactionAcceptanceData {
    pub fn new(transaction: Transaction, is_accepted: bool, fee: u64) -> Self {
        Self { transaction, is_accepted, fee }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_fees_skips_rejected() {
        let data = MergesetBlockAcceptanceData::new(
            Hash::from_u64_word(1),
            vec![
                TransactionAcceptanceData::new(Transaction::default(), true, 0),
                TransactionAcceptanceData::new(Transaction::default(), true, 7),
                TransactionAcceptanceData::new(Transaction::default(), false, 100),
            ],
        );
        assert_eq!(data.total_fees(), Some(7));

        let overflow = MergesetBlockAcceptanceData::new(
            Hash::from_u64_word(2),
            vec![
                TransactionAcceptanceData::new(Transaction::default(), true, u64::MAX),
                TransactionAcceptanceData::new(Transaction::default(), true, 1),
            ],
        );
        assert_eq!(overflow.total_fees(), None);
    }
}
