use consensus_core::header::Header;
use consensus_core::Hash;
use database::{Column, DbKey, DbResult, StagingArea};

pub trait HeaderStoreReader {
    fn get_header(&self, hash: Hash) -> DbResult<Header>;
    fn has_header(&self, hash: Hash) -> DbResult<bool>;

    fn get_bits(&self, hash: Hash) -> DbResult<u32> {
        Ok(self.get_header(hash)?.bits)
    }

    fn get_parents(&self, hash: Hash) -> DbResult<Vec<Hash>> {
        Ok(self.get_header(hash)?.direct_parents().to_vec())
    }
}

pub trait HeaderStore: HeaderStoreReader {
    fn insert_header(&mut self, header: &Header) -> DbResult<()>;
}

impl HeaderStoreReader for StagingArea {
    fn get_header(&self, hash: Hash) -> DbResult<Header> {
        self.read_required(DbKey::new(Column::Headers, hash))
    }

    fn has_header(&self, hash: Hash) -> DbResult<bool> {
        self.has(&DbKey::new(Column::Headers, hash))
    }
}

impl HeaderStore for StagingArea {
    fn insert_header(&mut self, header: &Header) -> DbResult<()> {
        self.insert(DbKey::new(Column::Headers, header.hash), header)
    }
}
