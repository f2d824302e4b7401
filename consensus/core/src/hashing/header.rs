use super::HasherExtensions;
use crate::header::Header;
use crate::Hash;
use dag_hashes::{BlockHash, HasherBase};

/// Returns the header hash. The cached `hash` field itself is not committed to.
pub fn hash(header: &Header) -> Hash {
    let mut hasher = BlockHash::new();
    hasher.write_u16(header.version).write_len(header.parents_by_level.len());
    for level in &header.parents_by_level {
        hasher.write_len(level.len());
        for parent in level {
            hasher.update(parent);
        }
    }
    hasher.update(header.hash_merkle_root).write_u64(header.timestamp).write_u32(header.bits).write_u64(header.nonce);
    hasher.finalize()
}
