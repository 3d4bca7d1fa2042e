//! The bytes of a whole `.blend` file
//!
//! Everything ends up in one ref-counted [`Bytes`]: an owned buffer for
//! decompressed or in-memory data, or a read-only memory map for plain files
//! on disk. Block reads borrow from it; [`BlendBuf::slice`] hands out owned
//! sub-views without copying.

use crate::error::{BlendFileErrorKind, Error, Result};
use bytes::Bytes;
use std::fmt;
use std::ops::Range;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

/// Owned block data detached from the file buffer
pub type BlendSlice = Bytes;

#[derive(Clone)]
pub struct BlendBuf {
    bytes: Bytes,
    mapped: bool,
}

impl BlendBuf {
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::from(Bytes::from(data))
    }

    #[cfg(feature = "mmap")]
    pub fn from_mmap(mmap: Mmap) -> Self {
        Self {
            bytes: Bytes::from_owner(mmap),
            mapped: true,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the data is a memory map rather than an owned buffer
    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Borrow `range`, checked against the buffer length
    pub fn get(&self, range: Range<usize>) -> Result<&[u8]> {
        self.check(&range)?;
        Ok(&self.bytes[range])
    }

    /// Owned view of `range` sharing the underlying storage
    pub fn slice(&self, range: Range<usize>) -> Result<BlendSlice> {
        self.check(&range)?;
        Ok(self.bytes.slice(range))
    }

    fn check(&self, range: &Range<usize>) -> Result<()> {
        if range.start <= range.end && range.end <= self.len() {
            return Ok(());
        }
        Err(Error::blend_file(
            format!("Range {range:?} is outside a {} byte buffer", self.len()),
            BlendFileErrorKind::InvalidRange,
        ))
    }
}

impl From<Bytes> for BlendBuf {
    fn from(bytes: Bytes) -> Self {
        Self {
            bytes,
            mapped: false,
        }
    }
}

impl fmt::Debug for BlendBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.mapped { "mmap" } else { "owned" };
        write!(f, "BlendBuf({kind}, {} bytes)", self.len())
    }
}
