pub mod header;
pub mod tx;

use dag_hashes::HasherBase;

pub(crate) trait HasherExtensions {
    /// Writes a length prefix followed by the bytes
    fn write_var_bytes(&mut self, bytes: &[u8]) -> &mut Self;

    fn write_u8(&mut self, element: u8) -> &mut Self;

    fn write_u16(&mut self, element: u16) -> &mut Self;

    fn write_u32(&mut self, element: u32) -> &mut Self;

    fn write_u64(&mut self, element: u64) -> &mut Self;

    fn write_len(&mut self, len: usize) -> &mut Self;
}

impl<T: HasherBase> HasherExtensions for T {
    #[inline(always)]
    fn write_var_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_len(bytes.len()).update(bytes)
    }

    #[inline(always)]
    fn write_u8(&mut self, element: u8) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_u16(&mut self, element: u16) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_u32(&mut self, element: u32) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_u64(&mut self, element: u64) -> &mut Self {
        self.update(element.to_le_bytes())
    }

    #[inline(always)]
    fn write_len(&mut self, len: usize) -> &mut Self {
        self.write_u64(len as u64)
    }
}
