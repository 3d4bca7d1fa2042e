//! Block header scanning
//!
//! Blocks follow the file header back to back: a block header, then `size`
//! bytes of data. The walk ends at the `ENDB` marker.

use crate::block::{BlendFileBlock, BlockHeader};
use crate::error::{BlendFileErrorKind, Error, Result};
use crate::header::BlendFileHeader;
use log::trace;

/// On-disk block header layouts
///
/// | layout   | code | size | old_address | sdna_index | count |
/// |----------|------|------|-------------|------------|-------|
/// | legacy32 | 4    | 4    | 4           | 4          | 4     |
/// | legacy64 | 4    | 4    | 8           | 4          | 4     |
/// | v1       | 4    | 8    | 8           | 4 (first)  | 8     |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLayout {
    Legacy32,
    Legacy64,
    V1,
}

impl BlockLayout {
    pub fn for_header(header: &BlendFileHeader) -> Self {
        match (header.file_format_version, header.pointer_size) {
            (1, _) => BlockLayout::V1,
            (_, 4) => BlockLayout::Legacy32,
            _ => BlockLayout::Legacy64,
        }
    }

    pub fn header_len(self) -> usize {
        match self {
            BlockLayout::Legacy32 => 20,
            BlockLayout::Legacy64 => 24,
            BlockLayout::V1 => 32,
        }
    }

    /// Decode one block header from the start of `bytes`
    pub fn decode(self, bytes: &[u8], little_endian: bool) -> Option<BlockHeader> {
        let raw = bytes.get(..self.header_len())?;
        let mut fields = Fields {
            raw,
            at: 4,
            little_endian,
        };
        let code = [raw[0], raw[1], raw[2], raw[3]];

        let header = match self {
            BlockLayout::Legacy32 => BlockHeader {
                code,
                size: fields.u32()? as u64,
                old_address: fields.u32()? as u64,
                sdna_index: fields.u32()?,
                count: fields.u32()? as u64,
            },
            BlockLayout::Legacy64 => BlockHeader {
                code,
                size: fields.u32()? as u64,
                old_address: fields.u64()?,
                sdna_index: fields.u32()?,
                count: fields.u32()? as u64,
            },
            BlockLayout::V1 => {
                let sdna_index = fields.u32()?;
                let old_address = fields.u64()?;
                let size = fields.u64()?;
                BlockHeader {
                    code,
                    size,
                    old_address,
                    sdna_index,
                    count: fields.u64()?,
                }
            }
        };
        Some(header)
    }
}

/// Sequential endian-aware reads over a block header
struct Fields<'a> {
    raw: &'a [u8],
    at: usize,
    little_endian: bool,
}

impl Fields<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.raw.get(self.at..self.at + N)?.try_into().ok()?;
        self.at += N;
        Some(bytes)
    }

    fn u32(&mut self) -> Option<u32> {
        let b = self.take::<4>()?;
        Some(if self.little_endian {
            u32::from_le_bytes(b)
        } else {
            u32::from_be_bytes(b)
        })
    }

    fn u64(&mut self) -> Option<u64> {
        let b = self.take::<8>()?;
        Some(if self.little_endian {
            u64::from_le_bytes(b)
        } else {
            u64::from_be_bytes(b)
        })
    }
}

/// Walk every block from `start` up to (not including) `ENDB`
///
/// Blocks larger than `max_block_size` or running past the end of `data`
/// are errors tagged with the index the block would have had.
pub fn scan_blocks(
    data: &[u8],
    start: usize,
    file_header: &BlendFileHeader,
    max_block_size: u64,
) -> Result<Vec<BlendFileBlock>> {
    let layout = BlockLayout::for_header(file_header);
    let mut blocks = Vec::new();
    let mut offset = start;

    loop {
        let header = data
            .get(offset..)
            .and_then(|rest| layout.decode(rest, file_header.is_little_endian))
            .ok_or_else(|| {
                Error::blend_file(
                    format!(
                        "Truncated block header at offset {offset} ({} bytes left, {} needed)",
                        data.len().saturating_sub(offset),
                        layout.header_len()
                    ),
                    BlendFileErrorKind::InvalidData,
                )
                .with_block_index(blocks.len())
            })?;
        let data_offset = offset + layout.header_len();

        if header.is_end_block() {
            trace!("ENDB after {} blocks", blocks.len());
            return Ok(blocks);
        }

        if header.size > max_block_size {
            return Err(Error::blend_file(
                format!("Block of {} bytes exceeds the {max_block_size} byte limit", header.size),
                BlendFileErrorKind::SizeLimitExceeded,
            )
            .with_block_index(blocks.len()));
        }

        let end = data_offset as u64 + header.size;
        if end > data.len() as u64 {
            return Err(Error::blend_file(
                format!("Block data runs to byte {end} of a {} byte file", data.len()),
                BlendFileErrorKind::InvalidData,
            )
            .with_block_index(blocks.len()));
        }

        blocks.push(BlendFileBlock {
            header,
            data_offset,
            header_offset: offset,
        });
        offset = end as usize;
    }
}
