use dag_utils::hex::ToHex;
use std::fmt::{Debug, Display, Formatter};

/// The kinds of records kept by the consensus core. Each one maps to its own
/// RocksDB column family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Headers,
    Ghostdag,
    /// GHOSTDAG data received with trusted pruning-point data, keeping the original merge set
    TrustedGhostdag,
    Reachability,
    AcceptanceData,
    DaaAddedBlocks,
    DaaScore,
    BlockBodies,
    PruningPoint,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Headers,
        Column::Ghostdag,
        Column::TrustedGhostdag,
        Column::Reachability,
        Column::AcceptanceData,
        Column::DaaAddedBlocks,
        Column::DaaScore,
        Column::BlockBodies,
        Column::PruningPoint,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Headers => "headers",
            Column::Ghostdag => "ghostdag",
            Column::TrustedGhostdag => "trusted-ghostdag",
            Column::Reachability => "reachability",
            Column::AcceptanceData => "acceptance-data",
            Column::DaaAddedBlocks => "daa-added-blocks",
            Column::DaaScore => "daa-score",
            Column::BlockBodies => "block-bodies",
            Column::PruningPoint => "pruning-point",
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully qualified record key: column plus raw key bytes (a block hash for
/// every per-block column).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DbKey {
    column: Column,
    key: Vec<u8>,
}

impl DbKey {
    pub fn new<K: AsRef<[u8]>>(column: Column, key: K) -> Self {
        Self { column, key: key.as_ref().to_vec() }
    }

    /// Key of a singleton record of the column
    pub fn prefix_only(column: Column) -> Self {
        Self { column, key: Vec::new() }
    }

    pub fn column(&self) -> Column {
        self.column
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Display for DbKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.column, self.key.to_hex())
    }
}

impl Debug for DbKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        let key = DbKey::new(Column::Ghostdag, [0xab, 0x01]);
        assert_eq!(key.to_string(), "ghostdag/ab01");
        assert_eq!(DbKey::prefix_only(Column::PruningPoint).to_string(), "pruning-point/");
    }

    #[test]
    fn test_column_names_are_unique() {
        let names: std::collections::HashSet<_> = Column::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), Column::ALL.len());
    }
}
