pub mod coinbase;
pub mod ghostdag;
pub mod reachability;
pub mod services;
pub mod traversal;
