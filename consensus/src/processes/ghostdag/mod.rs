//! GHOSTDAG: selected parent choice, merge set ordering and greedy blue/red
//! classification under the k-cluster rule.

mod protocol;

pub use protocol::GhostdagManager;

#[cfg(test)]
mod tests;
