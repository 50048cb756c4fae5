use crate::error::DecodeError;

/// Cursor over the decoded body bytes. Every read is bounds-checked and
/// reports the offset it failed at.
pub struct LittleEndianReader<'a> {
    inner: &'a [u8],
    pos: usize,
}

impl<'a> LittleEndianReader<'a> {
    pub fn new(inner: &'a [u8]) -> Self {
        Self { inner, pos: 0 }
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.read_bytes(4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Ok(u32::from_le_bytes(buf))
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let bytes = &self.inner[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.inner.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
