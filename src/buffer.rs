//! Growable byte buffer used for token accumulation.
//!
//! The buffer keeps a trailing NUL byte after its contents so that a raw dump
//! in a debugger reads as a C string; the NUL is never part of the logical
//! contents. Capacity is requested in multiples of a small block size, and
//! [`clear`](Buffer::clear) gives memory back down to one block, so a parser
//! that saw one huge token does not pin its peak allocation forever.
//!
//! All growth is fallible: allocation failure surfaces as
//! [`FatalError::OutOfMemory`] instead of aborting the process.

use crate::error::FatalError;

/// Capacity granularity, in bytes.
const BLOCK: usize = 64;

/// Owned, growable byte container.
#[derive(Debug)]
pub(crate) struct Buffer {
    /// Logical contents plus exactly one trailing NUL byte.
    data: Vec<u8>,
}

impl Buffer {
    pub fn new() -> Self {
        let mut data = Vec::with_capacity(BLOCK);
        data.push(0);
        Buffer { data }
    }

    /// Number of content bytes (excluding the NUL sentinel).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Content bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.data.len() - 1]
    }

    /// Drop all contents and give capacity back down toward one block.
    pub fn clear(&mut self) {
        self.data.clear();
        self.data.push(0);
        self.data.shrink_to(BLOCK);
    }

    /// Ensure room for `total` content bytes, rounding the request up to a
    /// multiple of the block size.
    pub fn reserve(&mut self, total: usize) -> Result<(), FatalError> {
        let want = (total + 1).div_ceil(BLOCK) * BLOCK;
        if want > self.data.capacity() {
            let additional = want - self.data.len();
            self.data
                .try_reserve_exact(additional)
                .map_err(|err| FatalError::from_reserve(want, err))?;
        }
        Ok(())
    }

    /// Ensure room for `add` more content bytes.
    pub fn grow(&mut self, add: usize) -> Result<(), FatalError> {
        self.reserve(self.len() + add)
    }

    /// Append `src` to the contents.
    pub fn append(&mut self, src: &[u8]) -> Result<(), FatalError> {
        self.grow(src.len())?;
        self.data.pop();
        self.data.extend_from_slice(src);
        self.data.push(0);
        Ok(())
    }

    /// Shorten the contents to `len` bytes; no-op if already shorter.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.data.truncate(len);
            self.data.push(0);
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}
