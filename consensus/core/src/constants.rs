/// Current block version
pub const BLOCK_VERSION: u16 = 1;

/// The highest transaction version understood by consensus. Coinbase
/// transactions are always built with this version.
pub const MAX_TX_VERSION: u16 = 0;

/// Number of sompi (base units) in one coin
pub const SOMPI_PER_COIN: u64 = 100_000_000;

/// A month is 365.25 / 12 days, expressed in seconds. DAA score advances at
/// roughly one unit per second, so this converts DAA score into elapsed months.
pub const SECONDS_PER_MONTH: u64 = 2_629_800;

/// The easiest difficulty, used by devnet genesis and by synthetic test headers
pub const DEFAULT_TEST_BITS: u32 = 0x207f_ffff;
