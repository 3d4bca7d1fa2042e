//! # ddd_parser
//!
//! Reader for Blender .blend files, just deep enough to pull scene and
//! object data out of a saved document.
//!
//! ## Key Features
//!
//! - **Cross-version compatibility**: legacy 32/64-bit headers and the v1
//!   header written by Blender 5.0+
//! - **Transparent decompression**: zstd-compressed saves are decoded into
//!   memory, plain files are memory-mapped
//! - **DNA-based field reading**: members are located by struct name and
//!   dotted path, never by hard-coded offsets
//! - **Memory safety**: all reads are bounds-checked and report errors
//!
//! ## Architecture
//!
//! 1. **Header parsing**: file metadata and version information
//! 2. **Block enumeration**: every data block, indexed by code and address
//! 3. **DNA parsing**: struct definitions from the `DNA1` block
//! 4. **Field access**: [`FieldView`] over a block's bytes
//!
//! The [`writer`] module builds small valid files for tests and fixtures.

pub mod block;
pub mod buf;
pub mod compression;
pub mod dna;
pub mod error;
pub mod fieldview;
pub mod header;
pub mod index;
pub mod listbase;
pub mod scan;
pub mod writer;

pub use block::{BlendFileBlock, BlockHeader, block_code, block_code_to_string};
pub use buf::{BlendBuf, BlendSlice};
pub use compression::{CompressionKind, DecompressionMode, DecompressionPolicy, ParseOptions};
pub use dna::{DnaCollection, DnaField, DnaName, DnaStruct, ResolvedField};
pub use error::{BlendFileErrorKind, Error, Result};
pub use fieldview::FieldView;
pub use header::BlendFileHeader;

use crate::index::BlockLookup;
use log::{debug, trace};
use std::path::{Path, PathBuf};

/// A parsed blend file backed by a single buffer
#[derive(Debug)]
pub struct BlendFile {
    buf: BlendBuf,
    header: BlendFileHeader,
    blocks: Vec<BlendFileBlock>,
    dna: DnaCollection,
    lookup: BlockLookup,
    path: Option<PathBuf>,
    mode: DecompressionMode,
}

impl BlendFile {
    /// Open and parse a file with default options
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_path_with(path, &ParseOptions::default())
    }

    /// Open and parse a file, decompressing zstd saves transparently
    pub fn from_path_with<P: AsRef<Path>>(path: P, options: &ParseOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening blend file: {}", path.display());

        let (buf, mode) = compression::open_source(path, &options.decompression_policy)?;
        let mut file = Self::parse(buf, options).map_err(|e| e.with_file_path(path))?;
        file.path = Some(path.to_path_buf());
        file.mode = mode;

        debug!(
            "Parsed {} ({:?}): Blender {}, {} blocks",
            path.display(),
            mode,
            file.header.version_string(),
            file.blocks.len()
        );
        Ok(file)
    }

    /// Parse an in-memory file; the result has no document path
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::parse(BlendBuf::from_vec(data), &ParseOptions::default())
    }

    /// Parse an already loaded buffer
    pub fn parse(buf: BlendBuf, options: &ParseOptions) -> Result<Self> {
        let data = buf.as_slice();
        if compression::detect_compression(data) != CompressionKind::None {
            return Err(Error::blend_file(
                "Compressed data must be decompressed before parsing",
                BlendFileErrorKind::UnsupportedCompression,
            ));
        }

        let header = BlendFileHeader::read_from_slice(data)?;
        trace!(
            "Header parsed: version={}, pointer_size={}, little_endian={}",
            header.version, header.pointer_size, header.is_little_endian
        );

        let blocks = scan::scan_blocks(
            data,
            header.header_size(),
            &header,
            options.max_block_size,
        )?;
        trace!("Scanned {} blocks", blocks.len());

        let (dna_position, dna_block) = blocks
            .iter()
            .enumerate()
            .find(|(_, block)| block.header.is_dna_block())
            .ok_or_else(|| {
                Error::blend_file("DNA block not found", BlendFileErrorKind::NoDnaFound)
            })?;
        let dna = DnaCollection::parse(
            &data[dna_block.data_range()],
            header.pointer_size as usize,
            header.is_little_endian,
        )
        .map_err(|e| e.with_block_index(dna_position))?;
        trace!(
            "DNA parsed: {} structs, {} names",
            dna.structs.len(),
            dna.names.len()
        );

        let lookup = BlockLookup::new(&blocks);

        Ok(Self {
            buf,
            header,
            blocks,
            dna,
            lookup,
            path: None,
            mode: DecompressionMode::None,
        })
    }

    /// Path the file was read from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn decompression_mode(&self) -> DecompressionMode {
        self.mode
    }

    pub fn header(&self) -> &BlendFileHeader {
        &self.header
    }

    pub fn dna(&self) -> &DnaCollection {
        &self.dna
    }

    pub fn blocks(&self) -> &[BlendFileBlock] {
        &self.blocks
    }

    pub fn blocks_len(&self) -> usize {
        self.blocks.len()
    }

    pub fn get_block(&self, index: usize) -> Option<&BlendFileBlock> {
        self.blocks.get(index)
    }

    /// All blocks with the given code, in file order
    pub fn blocks_by_type(&self, code: &[u8; 4]) -> &[usize] {
        self.lookup.with_code(code)
    }

    /// Block whose old memory address equals a stored pointer value
    pub fn find_block_by_address(&self, address: u64) -> Option<usize> {
        self.lookup.at_address(address)
    }

    fn block(&self, index: usize) -> Result<&BlendFileBlock> {
        self.blocks.get(index).ok_or_else(|| {
            Error::blend_file(
                format!("Invalid block index: {index}"),
                BlendFileErrorKind::InvalidBlockIndex,
            )
        })
    }

    /// Borrow the raw data of a block
    pub fn read_block_slice(&self, index: usize) -> Result<&[u8]> {
        let block = self.block(index)?;
        self.buf
            .get(block.data_range())
            .map_err(|e| e.with_block_index(index))
    }

    /// Owned copy of a block's data that does not borrow the file
    pub fn read_block_bytes(&self, index: usize) -> Result<BlendSlice> {
        let block = self.block(index)?;
        self.buf
            .slice(block.data_range())
            .map_err(|e| e.with_block_index(index))
    }

    /// DNA struct describing a block's data, from its `sdna_index`
    pub fn block_struct(&self, index: usize) -> Result<&DnaStruct> {
        let block = self.block(index)?;
        self.dna
            .get_struct(block.header.sdna_index as usize)
            .ok_or_else(|| {
                Error::blend_file(
                    format!("Invalid SDNA index {}", block.header.sdna_index),
                    BlendFileErrorKind::DnaError,
                )
                .with_block_index(index)
            })
    }

    /// Field view over a block's data
    pub fn field_view(&self, index: usize) -> Result<FieldView<'_>> {
        let data = self.read_block_slice(index)?;
        Ok(FieldView::new(
            data,
            &self.dna,
            self.header.pointer_size as usize,
            self.header.is_little_endian,
        ))
    }
}
