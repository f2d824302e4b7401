//! Block admission pipeline.
//!
//! Header admission computes GHOSTDAG and extends the reachability index
//! inside the caller's staging area. Committing it is left to the caller.

pub mod header_processor;

pub use header_processor::{HeaderProcessingResult, HeaderProcessor};
