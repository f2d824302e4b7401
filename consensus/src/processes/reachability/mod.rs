//! Reachability index: an interval labelling of the selected-parent tree,
//! completed by future covering sets for DAG (non-chain) ancestry.

mod inquirer;
mod tree;

pub use inquirer::ReachabilityManager;
