//!
//! # Transaction
//!
//! The subset of the transaction model the consensus core touches: coinbase
//! synthesis, acceptance data and block bodies.
//!

mod script_public_key;

use dag_utils::hex::ToHex;
use dag_utils::serde_bytes;
pub use script_public_key::{ScriptPublicKey, ScriptPublicKeyVersion, ScriptVec, SCRIPT_VECTOR_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::{
    hashing,
    subnets::{self, SubnetworkId},
};

/// COINBASE_TRANSACTION_INDEX is the index of the coinbase transaction in every block
pub const COINBASE_TRANSACTION_INDEX: usize = 0;

/// A 32-byte transaction identifier.
pub type TransactionId = crate::Hash;

pub type TransactionIndexType = u32;

/// Represents a transaction outpoint
#[derive(Eq, Default, Hash, PartialEq, Debug, Copy, Clone, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutpoint {
    pub transaction_id: TransactionId,
    pub index: TransactionIndexType,
}

impl TransactionOutpoint {
    pub fn new(transaction_id: TransactionId, index: u32) -> Self {
        Self { transaction_id, index }
    }
}

impl Display for TransactionOutpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.transaction_id, self.index)
    }
}

/// Represents a transaction input
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub previous_outpoint: TransactionOutpoint,
    #[serde(with = "serde_bytes")]
    pub signature_script: Vec<u8>,
    pub sequence: u64,
    pub sig_op_count: u8,
}

impl TransactionInput {
    pub fn new(previous_outpoint: TransactionOutpoint, signature_script: Vec<u8>, sequence: u64, sig_op_count: u8) -> Self {
        Self { previous_outpoint, signature_script, sequence, sig_op_count }
    }
}

impl std::fmt::Debug for TransactionInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionInput")
            .field("previous_outpoint", &self.previous_outpoint)
            .field("signature_script", &self.signature_script.to_hex())
            .field("sequence", &self.sequence)
            .field("sig_op_count", &self.sig_op_count)
            .finish()
    }
}

/// Represents a transaction output
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    pub value: u64,
    pub script_public_key: ScriptPublicKey,
}

impl TransactionOutput {
    pub fn new(value: u64, script_public_key: ScriptPublicKey) -> Self {
        Self { value, script_public_key }
    }
}

/// Represents a transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub version: u16,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u64,
    pub subnetwork_id: SubnetworkId,
    pub gas: u64,
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,

    // A field that is used to cache the transaction ID.
    // Always use the corresponding self.id() instead of accessing this field directly
    id: TransactionId,
}

impl Transaction {
    pub fn new(
        version: u16,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
        lock_time: u64,
        subnetwork_id: SubnetworkId,
        gas: u64,
        payload: Vec<u8>,
    ) -> Self {
        let mut tx = Self { version, inputs, outputs, lock_time, subnetwork_id, gas, payload, id: Default::default() };
        tx.finalize();
        tx
    }

    /// Determines whether or not a transaction is a coinbase transaction. A coinbase
    /// transaction is the consensus-mandated payout of a block: it has no inputs and
    /// pays the subsidy and fees of the merged blocks.
    pub fn is_coinbase(&self) -> bool {
        self.subnetwork_id == subnets::SUBNETWORK_ID_COINBASE
    }

    /// Recompute and finalize the tx id based on updated tx fields
    pub fn finalize(&mut self) {
        self.id = hashing::tx::id(self);
    }

    /// Returns the transaction ID
    pub fn id(&self) -> TransactionId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subnets::SUBNETWORK_ID_NATIVE;

    fn sample_tx(subnetwork_id: SubnetworkId, payload: Vec<u8>) -> Transaction {
        Transaction::new(
            0,
            vec![TransactionInput::new(TransactionOutpoint::new(crate::Hash::from_u64_word(3), 1), vec![1, 2], 0, 1)],
            vec![TransactionOutput::new(50, ScriptPublicKey::from_vec(0, vec![0xac]))],
            0,
            subnetwork_id,
            0,
            payload,
        )
    }

    #[test]
    fn test_id_commits_to_payload() {
        let a = sample_tx(SUBNETWORK_ID_NATIVE, vec![1]);
        let b = sample_tx(SUBNETWORK_ID_NATIVE, vec![2]);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.id(), sample_tx(SUBNETWORK_ID_NATIVE, vec![1]).id());
    }

    #[test]
    fn test_is_coinbase() {
        assert!(sample_tx(subnets::SUBNETWORK_ID_COINBASE, vec![]).is_coinbase());
        assert!(!sample_tx(SUBNETWORK_ID_NATIVE, vec![]).is_coinbase());
    }

    #[test]
    fn test_serde_keeps_id() {
        let tx = sample_tx(SUBNETWORK_ID_NATIVE, vec![9, 9]);
        let decoded: Transaction = bincode::deserialize(&bincode::serialize(&tx).unwrap()).unwrap();
        assert_eq!(decoded.id(), tx.id());
        assert_eq!(decoded, tx);
    }
}
