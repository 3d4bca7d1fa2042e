/// Header of a single file block as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub code: [u8; 4],
    pub size: u64,
    pub old_address: u64,
    pub sdna_index: u32,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct BlendFileBlock {
    /// Parsed header fields
    pub header: BlockHeader,
    /// Offset in the buffer where the block's raw data starts
    pub data_offset: usize,
    /// Offset in the buffer where this block header starts (for diagnostics)
    pub header_offset: usize,
}

impl BlockHeader {
    pub fn is_end_block(&self) -> bool {
        &self.code == b"ENDB"
    }

    pub fn is_dna_block(&self) -> bool {
        &self.code == b"DNA1"
    }

    pub fn code_string(&self) -> String {
        block_code_to_string(&self.code)
    }
}

impl BlendFileBlock {
    /// Byte range of the block data inside the file buffer
    pub fn data_range(&self) -> std::ops::Range<usize> {
        self.data_offset..self.data_offset + self.header.size as usize
    }
}

/// Render a block code for display, dropping trailing NUL padding
pub fn block_code_to_string(code: &[u8; 4]) -> String {
    String::from_utf8_lossy(code)
        .trim_end_matches('\0')
        .to_string()
}

/// Build a block code from a short ID code such as `"OB"` or `"GLOB"`
///
/// Codes shorter than four bytes are NUL padded the way Blender writes them.
pub fn block_code(code: &str) -> [u8; 4] {
    let mut out = [0u8; 4];
    for (slot, byte) in out.iter_mut().zip(code.bytes()) {
        *slot = byte;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_code_padding() {
        assert_eq!(&block_code("OB"), b"OB\0\0");
        assert_eq!(&block_code("GLOB"), b"GLOB");
        assert_eq!(block_code_to_string(b"SC\0\0"), "SC");
    }

    #[test]
    fn test_special_blocks() {
        let header = BlockHeader {
            code: *b"ENDB",
            size: 0,
            old_address: 0,
            sdna_index: 0,
            count: 0,
        };
        assert!(header.is_end_block());
        assert!(!header.is_dna_block());
    }

    #[test]
    fn test_data_range() {
        let block = BlendFileBlock {
            header: BlockHeader {
                code: block_code("OB"),
                size: 16,
                old_address: 0x1000,
                sdna_index: 1,
                count: 1,
            },
            data_offset: 36,
            header_offset: 12,
        };
        assert_eq!(block.data_range(), 36..52);
    }
}
