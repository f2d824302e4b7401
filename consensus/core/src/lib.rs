//! Consensus data model shared by the storage layer, the consensus processes
//! and the tooling: hashes, headers, transactions, GHOSTDAG and reachability
//! records, acceptance data, network parameters and rule errors.

use std::collections::{HashMap, HashSet};

pub mod acceptance_data;
pub mod coinbase;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ghostdag;
pub mod hashing;
pub mod header;
pub mod reachability;
pub mod subnets;
pub mod tx;
pub mod work;

pub use dag_hashes::{Hash, ZERO_HASH};

/// Accumulated proof-of-work of a block's blue past
pub type BlueWorkType = dag_math::Uint192;

/// The GHOSTDAG `k` parameter: the maximal anticone size of a blue block
pub type KType = u16;

pub type BlockHashMap<V> = HashMap<Hash, V>;
pub type BlockHashSet = HashSet<Hash>;
