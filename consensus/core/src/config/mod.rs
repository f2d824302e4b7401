pub mod genesis;
pub mod params;
pub mod subsidy;

use crate::Hash;
use std::path::PathBuf;
use thiserror::Error;

pub use params::{Params, ReachabilityParams};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    #[error("seconds per month must be positive")]
    ZeroSecondsPerMonth,

    #[error("reachability interval capacity {0} is too small")]
    IntervalCapacityTooSmall(u64),

    #[error("subsidy table is empty")]
    EmptySubsidyTable,

    #[error("subsidy table increases at month {0}")]
    SubsidyTableIncreases(usize),

    #[error("subsidy table starts at {table} but the deflationary phase base subsidy is {configured}")]
    SubsidyTableBaseMismatch { table: u64, configured: u64 },

    #[error("max coinbase payload length {max_payload} cannot hold a script public key of {max_script} bytes")]
    CoinbasePayloadTooSmall { max_payload: usize, max_script: u8 },

    #[error("configured genesis hash {configured} does not match the genesis header hash {computed}")]
    GenesisHashMismatch { configured: Hash, computed: Hash },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
