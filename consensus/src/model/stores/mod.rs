//! Store capabilities of the consensus processes.
//!
//! Each record kind has a reader trait and, where someone writes it, a writer
//! trait. All of them are implemented by [`StagingArea`], so a process reads
//! its own staged writes on top of the committed state. Managers are generic
//! over exactly the capabilities they use, which lets tests substitute fakes.

pub mod acceptance_data;
pub mod block_transactions;
pub mod daa;
pub mod ghostdag;
pub mod headers;
pub mod pruning;
pub mod reachability;

pub use acceptance_data::{AcceptanceDataStore, AcceptanceDataStoreReader};
pub use block_transactions::{BlockStore, BlockStoreReader};
pub use daa::{DaaStore, DaaStoreReader};
pub use ghostdag::{GhostdagStore, GhostdagStoreReader, TrustedGhostdagStore, TrustedGhostdagStoreReader};
pub use headers::{HeaderStore, HeaderStoreReader};
pub use pruning::{PruningStore, PruningStoreReader};
pub use reachability::{ReachabilityStore, ReachabilityStoreReader};

pub use database::{DbResult, StagingArea};
