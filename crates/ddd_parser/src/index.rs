//! Block lookup tables, built once per file
//!
//! Pointers stored in block data are old memory addresses; resolving one
//! means finding the block whose header recorded that address.

use crate::block::BlendFileBlock;
use ahash::AHashMap;

#[derive(Debug, Default, Clone)]
pub struct BlockLookup {
    by_code: AHashMap<[u8; 4], Vec<usize>>,
    by_address: AHashMap<u64, usize>,
}

impl BlockLookup {
    /// Index `blocks` by code and by old address
    ///
    /// Address 0 is never indexed. If two blocks claim one address the
    /// earlier block keeps it.
    pub fn new(blocks: &[BlendFileBlock]) -> Self {
        let mut lookup = Self {
            by_code: AHashMap::new(),
            by_address: AHashMap::with_capacity(blocks.len()),
        };

        for (position, block) in blocks.iter().enumerate() {
            let header = &block.header;
            lookup.by_code.entry(header.code).or_default().push(position);
            if header.old_address != 0 {
                lookup.by_address.entry(header.old_address).or_insert(position);
            }
        }
        lookup
    }

    /// Indices of blocks with `code`, in file order
    pub fn with_code(&self, code: &[u8; 4]) -> &[usize] {
        self.by_code.get(code).map_or(&[], Vec::as_slice)
    }

    pub fn at_address(&self, address: u64) -> Option<usize> {
        match address {
            0 => None,
            _ => self.by_address.get(&address).copied(),
        }
    }

    pub fn codes(&self) -> usize {
        self.by_code.len()
    }
}
