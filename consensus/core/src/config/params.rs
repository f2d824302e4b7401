use super::{
    genesis::{devnet_genesis, mainnet_genesis, testnet_genesis, GenesisBlock},
    subsidy::SubsidyTable,
    ConfigError, ConfigResult,
};
use crate::{
    coinbase::MIN_PAYLOAD_LENGTH,
    constants::{SECONDS_PER_MONTH, SOMPI_PER_COIN},
    reachability::IntervalBound,
    KType,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Parameters of the reachability index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityParams {
    /// Exclusive upper bound of the interval domain. The root owns `[1, interval_capacity)`.
    pub interval_capacity: IntervalBound,
}

/// The largest capacity representable in TOML, whose integers are signed 64-bit
pub const DEFAULT_INTERVAL_CAPACITY: IntervalBound = i64::MAX as IntervalBound;

impl Default for ReachabilityParams {
    fn default() -> Self {
        Self { interval_capacity: DEFAULT_INTERVAL_CAPACITY }
    }
}

/// Consensus parameters of a network. Immutable for the lifetime of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// The name of the network (e.g. "mainnet", "testnet", "devnet")
    pub network: String,
    /// Maximal anticone size of a blue block
    pub ghostdag_k: KType,

    /* Subsidy */
    /// Subsidy paid for the genesis block
    pub genesis_reward: u64,
    /// Fixed subsidy paid before the deflationary phase
    pub pre_deflationary_phase_base_subsidy: u64,
    /// DAA score at which the deflationary phase starts
    pub deflationary_phase_daa_score: u64,
    /// First deflationary subsidy, must equal the first table entry
    pub deflationary_phase_base_subsidy: u64,
    #[serde(default = "default_seconds_per_month")]
    pub seconds_per_month: u64,
    #[serde(default)]
    pub subsidy_table: SubsidyTable,

    /* Coinbase payload limits */
    pub coinbase_payload_script_public_key_max_len: u8,
    pub max_coinbase_payload_len: usize,

    // Tables come last so the TOML rendering stays valid
    pub genesis: GenesisBlock,
    #[serde(default)]
    pub reachability: ReachabilityParams,
}

fn default_seconds_per_month() -> u64 {
    SECONDS_PER_MONTH
}

impl Params {
    pub fn mainnet() -> Self {
        Self {
            network: "mainnet".to_string(),
            genesis: mainnet_genesis(),
            ghostdag_k: 18,
            genesis_reward: SOMPI_PER_COIN,
            pre_deflationary_phase_base_subsidy: 12 * SOMPI_PER_COIN,
            deflationary_phase_daa_score: 15_519_600,
            deflationary_phase_base_subsidy: 10 * SOMPI_PER_COIN,
            seconds_per_month: SECONDS_PER_MONTH,
            subsidy_table: SubsidyTable::default(),
            coinbase_payload_script_public_key_max_len: 150,
            max_coinbase_payload_len: 204,
            reachability: ReachabilityParams::default(),
        }
    }

    pub fn testnet() -> Self {
        Self { network: "testnet".to_string(), genesis: testnet_genesis(), ..Self::mainnet() }
    }

    pub fn devnet() -> Self {
        Self {
            network: "devnet".to_string(),
            genesis: devnet_genesis(),
            genesis_reward: 0,
            deflationary_phase_daa_score: 86_400,
            ..Self::mainnet()
        }
    }

    /// Preset parameters of a known network
    pub fn for_network(network: &str) -> ConfigResult<Self> {
        match network {
            "mainnet" => Ok(Self::mainnet()),
            "testnet" => Ok(Self::testnet()),
            "devnet" => Ok(Self::devnet()),
            _ => Err(ConfigError::UnknownNetwork(network.to_string())),
        }
    }

    /// Load parameters from a TOML file if it exists, otherwise use the mainnet preset
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::mainnet())
        }
    }

    /// Parses and validates parameters from TOML
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let params: Params = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.seconds_per_month == 0 {
            return Err(ConfigError::ZeroSecondsPerMonth);
        }
        // room for the root's own slot plus at least one child
        if self.reachability.interval_capacity < 3 {
            return Err(ConfigError::IntervalCapacityTooSmall(self.reachability.interval_capacity));
        }
        if self.subsidy_table.base_subsidy() != self.deflationary_phase_base_subsidy {
            return Err(ConfigError::SubsidyTableBaseMismatch {
                table: self.subsidy_table.base_subsidy(),
                configured: self.deflationary_phase_base_subsidy,
            });
        }
        if self.max_coinbase_payload_len < MIN_PAYLOAD_LENGTH + self.coinbase_payload_script_public_key_max_len as usize {
            return Err(ConfigError::CoinbasePayloadTooSmall {
                max_payload: self.max_coinbase_payload_len,
                max_script: self.coinbase_payload_script_public_key_max_len,
            });
        }
        let computed = self.genesis.header().hash;
        if computed != self.genesis.hash {
            return Err(ConfigError::GenesisHashMismatch { configured: self.genesis.hash, computed });
        }
        Ok(())
    }

    pub fn genesis_hash(&self) -> crate::Hash {
        self.genesis.hash
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_presets_are_valid() {
        for network in ["mainnet", "testnet", "devnet"] {
            let params = Params::for_network(network).unwrap();
            assert_eq!(params.network, network);
            params.validate().unwrap();
        }
        assert!(matches!(Params::for_network("simnet"), Err(ConfigError::UnknownNetwork(_))));
    }

    #[test]
    fn test_toml_roundtrip_and_defaults() {
        let params = Params::devnet();
        let content = toml::to_string(&params).unwrap();
        assert_eq!(Params::from_toml_str(&content).unwrap(), params);

        // optional sections fall back to their defaults
        let mut value: toml::Table = toml::from_str(&content).unwrap();
        value.remove("subsidy_table");
        value.remove("reachability");
        value.remove("seconds_per_month");
        let parsed = Params::from_toml_str(&toml::to_string(&value).unwrap()).unwrap();
        assert_eq!(parsed.subsidy_table, SubsidyTable::default());
        assert_eq!(parsed.reachability, ReachabilityParams::default());
        assert_eq!(parsed.seconds_per_month, SECONDS_PER_MONTH);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        // k = 0 is a valid, chain-only coloring
        Params { ghostdag_k: 0, ..Params::devnet() }.validate().unwrap();

        let params = Params { seconds_per_month: 0, ..Params::devnet() };
        assert!(matches!(params.validate(), Err(ConfigError::ZeroSecondsPerMonth)));

        let params = Params { deflationary_phase_base_subsidy: 1, ..Params::devnet() };
        assert!(matches!(params.validate(), Err(ConfigError::SubsidyTableBaseMismatch { .. })));

        let mut params = Params::devnet();
        params.genesis.nonce += 1;
        assert!(matches!(params.validate(), Err(ConfigError::GenesisHashMismatch { .. })));

        let params = Params { max_coinbase_payload_len: 20, ..Params::devnet() };
        assert!(matches!(params.validate(), Err(ConfigError::CoinbasePayloadTooSmall { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let missing = Params::load(Path::new("/nonexistent/params.toml")).unwrap();
        assert_eq!(missing, Params::mainnet());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml::to_string(&Params::testnet()).unwrap().as_bytes()).unwrap();
        assert_eq!(Params::load(file.path()).unwrap(), Params::testnet());

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        bad.write_all(b"ghostdag_k = \"eighteen\"").unwrap();
        assert!(matches!(Params::load(bad.path()), Err(ConfigError::Parse(_))));
    }
}
