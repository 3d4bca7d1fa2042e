//! Minimal blend file writer
//!
//! Produces small but structurally valid files: a header, data blocks, a
//! `DNA1` block describing the structs used, and `ENDB`. Used to build
//! fixtures for tests and benchmarks. Output is always little endian.

use crate::block::block_code;
use crate::dna::{DnaCollection, DnaName};
use crate::error::{BlendFileErrorKind, Error, Result};
use ahash::AHashMap;
use std::io::Write;
use std::path::Path;

/// Primitive types every catalogue starts with, with their sizes
const PRIMITIVES: &[(&str, u16)] = &[
    ("char", 1),
    ("uchar", 1),
    ("short", 2),
    ("ushort", 2),
    ("int", 4),
    ("uint", 4),
    ("float", 4),
    ("double", 8),
    ("int8_t", 1),
    ("uint8_t", 1),
    ("int64_t", 8),
    ("uint64_t", 8),
    ("void", 0),
];

/// Incrementally assembles an SDNA catalogue
#[derive(Debug, Clone)]
pub struct DnaBuilder {
    pointer_size: usize,
    names: Vec<String>,
    name_index: AHashMap<String, u16>,
    types: Vec<String>,
    type_sizes: Vec<u16>,
    type_index: AHashMap<String, u16>,
    structs: Vec<(u16, Vec<(u16, u16)>)>,
}

impl DnaBuilder {
    pub fn new(pointer_size: usize) -> Self {
        let mut builder = Self {
            pointer_size,
            names: Vec::new(),
            name_index: AHashMap::new(),
            types: Vec::new(),
            type_sizes: Vec::new(),
            type_index: AHashMap::new(),
            structs: Vec::new(),
        };
        for (name, size) in PRIMITIVES {
            builder.intern_type(name, *size);
        }
        builder
    }

    pub fn pointer_size(&self) -> usize {
        self.pointer_size
    }

    /// Declare a struct from `(type, member)` pairs in declaration order
    ///
    /// Member names use DNA syntax: `"*next"`, `"loc[3]"`, `"name[66]"`.
    /// Non-pointer members must use a primitive or an already declared struct.
    pub fn add_struct(&mut self, name: &str, fields: &[(&str, &str)]) -> Result<&mut Self> {
        if let Some(&index) = self.type_index.get(name) {
            if self.structs.iter().any(|(t, _)| *t == index) {
                return Err(Error::parser_dna_error(format!(
                    "Struct '{name}' declared twice"
                )));
            }
        }

        let mut size = 0usize;
        let mut members = Vec::with_capacity(fields.len());
        for (type_name, member) in fields {
            let parsed = DnaName::new(*member)?;
            let type_idx = if parsed.is_pointer {
                match self.type_index.get(*type_name) {
                    Some(&index) => index,
                    None => self.intern_type(type_name, 0),
                }
            } else {
                *self.type_index.get(*type_name).ok_or_else(|| {
                    Error::parser_dna_error(format!(
                        "Unknown type '{type_name}' for member '{member}' of '{name}'"
                    ))
                })?
            };

            let member_size =
                parsed.size_in(self.type_sizes[type_idx as usize] as usize, self.pointer_size)?;
            size = size.checked_add(member_size).ok_or_else(|| {
                Error::parser_dna_error(format!("Struct '{name}' size overflows"))
            })?;
            members.push((type_idx, self.intern_name(member)));
        }

        let size = u16::try_from(size).map_err(|_| {
            Error::parser_dna_error(format!("Struct '{name}' is too large: {size} bytes"))
        })?;
        let struct_type = match self.type_index.get(name) {
            Some(&index) => {
                self.type_sizes[index as usize] = size;
                index
            }
            None => self.intern_type(name, size),
        };
        self.structs.push((struct_type, members));
        Ok(self)
    }

    fn intern_type(&mut self, name: &str, size: u16) -> u16 {
        let index = self.types.len() as u16;
        self.types.push(name.to_string());
        self.type_sizes.push(size);
        self.type_index.insert(name.to_string(), index);
        index
    }

    fn intern_name(&mut self, name: &str) -> u16 {
        if let Some(&index) = self.name_index.get(name) {
            return index;
        }
        let index = self.names.len() as u16;
        self.names.push(name.to_string());
        self.name_index.insert(name.to_string(), index);
        index
    }

    /// Serialize to the payload of a `DNA1` block
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"SDNA");

        out.extend_from_slice(b"NAME");
        out.extend_from_slice(&(self.names.len() as u32).to_le_bytes());
        for name in &self.names {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
        }
        pad4(&mut out);

        out.extend_from_slice(b"TYPE");
        out.extend_from_slice(&(self.types.len() as u32).to_le_bytes());
        for type_name in &self.types {
            out.extend_from_slice(type_name.as_bytes());
            out.push(0);
        }
        pad4(&mut out);

        out.extend_from_slice(b"TLEN");
        for size in &self.type_sizes {
            out.extend_from_slice(&size.to_le_bytes());
        }
        pad4(&mut out);

        out.extend_from_slice(b"STRC");
        out.extend_from_slice(&(self.structs.len() as u32).to_le_bytes());
        for (type_idx, members) in &self.structs {
            out.extend_from_slice(&type_idx.to_le_bytes());
            out.extend_from_slice(&(members.len() as u16).to_le_bytes());
            for (member_type, member_name) in members {
                out.extend_from_slice(&member_type.to_le_bytes());
                out.extend_from_slice(&member_name.to_le_bytes());
            }
        }
        out
    }

    /// Parse the encoded catalogue back, for laying out struct data
    pub fn build(&self) -> Result<DnaCollection> {
        DnaCollection::parse(&self.encode(), self.pointer_size, true)
    }
}

fn pad4(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// Zero-initialised bytes of one struct instance, filled by member path
#[derive(Debug, Clone)]
pub struct StructData<'dna> {
    dna: &'dna DnaCollection,
    struct_name: String,
    sdna_index: u32,
    data: Vec<u8>,
}

impl<'dna> StructData<'dna> {
    pub fn new(dna: &'dna DnaCollection, struct_name: &str) -> Result<Self> {
        let sdna_index = dna.struct_index_of(struct_name).ok_or_else(|| {
            Error::parser_invalid_field(format!("Struct '{struct_name}' not found in DNA"))
        })?;
        let size = dna.structs[sdna_index].size;
        Ok(Self {
            dna,
            struct_name: struct_name.to_string(),
            sdna_index: sdna_index as u32,
            data: vec![0; size],
        })
    }

    pub fn struct_name(&self) -> &str {
        &self.struct_name
    }

    pub fn sdna_index(&self) -> u32 {
        self.sdna_index
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn member(&mut self, path: &str, len: usize) -> Result<&mut [u8]> {
        let dna = self.dna;
        let resolved = dna.resolve(&self.struct_name, path)?;
        if len > resolved.field.size {
            return Err(Error::blend_file(
                format!(
                    "{len} bytes do not fit member '{path}' of {} bytes",
                    resolved.field.size
                ),
                BlendFileErrorKind::InvalidField,
            ));
        }
        Ok(&mut self.data[resolved.offset..resolved.offset + len])
    }

    pub fn set_f32s(&mut self, path: &str, values: &[f32]) -> Result<&mut Self> {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.member(path, bytes.len())?.copy_from_slice(&bytes);
        Ok(self)
    }

    pub fn set_f32(&mut self, path: &str, value: f32) -> Result<&mut Self> {
        self.set_f32s(path, &[value])
    }

    pub fn set_u8(&mut self, path: &str, value: u8) -> Result<&mut Self> {
        self.member(path, 1)?.copy_from_slice(&[value]);
        Ok(self)
    }

    pub fn set_i16(&mut self, path: &str, value: i16) -> Result<&mut Self> {
        self.member(path, 2)?.copy_from_slice(&value.to_le_bytes());
        Ok(self)
    }

    pub fn set_i32(&mut self, path: &str, value: i32) -> Result<&mut Self> {
        self.member(path, 4)?.copy_from_slice(&value.to_le_bytes());
        Ok(self)
    }

    /// Write a pointer using the member's own width
    pub fn set_ptr(&mut self, path: &str, address: u64) -> Result<&mut Self> {
        let dna = self.dna;
        let resolved = dna.resolve(&self.struct_name, path)?;
        let width = resolved.field.size / resolved.field.name.array_size.max(1);
        match width {
            4 => {
                let address = u32::try_from(address).map_err(|_| {
                    Error::parser_invalid_field(format!(
                        "Address {address:#x} does not fit a 32-bit pointer"
                    ))
                })?;
                self.member(path, 4)?.copy_from_slice(&address.to_le_bytes());
            }
            8 => self.member(path, 8)?.copy_from_slice(&address.to_le_bytes()),
            _ => {
                return Err(Error::parser_invalid_field(format!(
                    "Member '{path}' is not a pointer"
                )));
            }
        }
        Ok(self)
    }

    /// Write a NUL-terminated string into a `char[]` member
    pub fn set_str(&mut self, path: &str, value: &str) -> Result<&mut Self> {
        let slot = self.member(path, value.len() + 1)?;
        slot[..value.len()].copy_from_slice(value.as_bytes());
        slot[value.len()] = 0;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
struct PendingBlock {
    code: [u8; 4],
    sdna_index: u32,
    old_address: u64,
    count: u64,
    data: Vec<u8>,
}

/// Assembles a complete blend file in memory
#[derive(Debug, Clone)]
pub struct BlendWriter {
    header: Vec<u8>,
    pointer_size: usize,
    v1: bool,
    blocks: Vec<PendingBlock>,
}

impl BlendWriter {
    /// Legacy format (`BLENDER-v###` / `BLENDER_v###`), 4 or 8 byte pointers
    pub fn legacy(pointer_size: usize, version: u32) -> Result<Self> {
        let marker = match pointer_size {
            4 => '_',
            8 => '-',
            other => {
                return Err(Error::parser_invalid_header(format!(
                    "Unsupported pointer size: {other}"
                )));
            }
        };
        Ok(Self {
            header: format!("BLENDER{marker}v{version:03}").into_bytes(),
            pointer_size,
            v1: false,
            blocks: Vec::new(),
        })
    }

    /// v1 format (`BLENDER17-01v####`) written by Blender 5.0 and later
    pub fn v1(version: u32) -> Self {
        Self {
            header: format!("BLENDER17-01v{version:04}").into_bytes(),
            pointer_size: 8,
            v1: true,
            blocks: Vec::new(),
        }
    }

    pub fn pointer_size(&self) -> usize {
        self.pointer_size
    }

    pub fn add_block(
        &mut self,
        code: [u8; 4],
        sdna_index: u32,
        old_address: u64,
        count: u64,
        data: Vec<u8>,
    ) -> &mut Self {
        self.blocks.push(PendingBlock {
            code,
            sdna_index,
            old_address,
            count,
            data,
        });
        self
    }

    /// Add one struct instance as its own block, e.g. `add_struct("OB", 0x1000, &object)`
    pub fn add_struct(&mut self, code: &str, old_address: u64, data: &StructData) -> &mut Self {
        self.add_block(
            block_code(code),
            data.sdna_index(),
            old_address,
            1,
            data.bytes().to_vec(),
        )
    }

    /// Add several instances of one struct as a single array block
    pub fn add_struct_array(
        &mut self,
        code: &str,
        old_address: u64,
        items: &[StructData],
    ) -> Result<&mut Self> {
        let Some(first) = items.first() else {
            return Err(Error::parser_invalid_field("Empty struct array"));
        };
        if items.iter().any(|item| item.sdna_index() != first.sdna_index()) {
            return Err(Error::parser_invalid_field(
                "Struct array mixes different struct types",
            ));
        }
        let data = items.iter().flat_map(|item| item.bytes().iter().copied()).collect();
        Ok(self.add_block(
            block_code(code),
            first.sdna_index(),
            old_address,
            items.len() as u64,
            data,
        ))
    }

    /// Serialize header, blocks, `DNA1` and `ENDB`
    pub fn finish(&self, dna: &DnaBuilder) -> Result<Vec<u8>> {
        if dna.pointer_size() != self.pointer_size {
            return Err(Error::parser_dna_error(format!(
                "DNA uses {}-byte pointers but the file uses {}",
                dna.pointer_size(),
                self.pointer_size
            )));
        }

        let mut out = self.header.clone();
        for block in &self.blocks {
            self.write_block(&mut out, block)?;
        }
        let dna_block = PendingBlock {
            code: *b"DNA1",
            sdna_index: 0,
            old_address: 0,
            count: 1,
            data: dna.encode(),
        };
        self.write_block(&mut out, &dna_block)?;
        let end = PendingBlock {
            code: *b"ENDB",
            sdna_index: 0,
            old_address: 0,
            count: 0,
            data: Vec::new(),
        };
        self.write_block(&mut out, &end)?;
        Ok(out)
    }

    pub fn write_to<P: AsRef<Path>>(&self, dna: &DnaBuilder, path: P) -> Result<()> {
        let bytes = self.finish(dna)?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| Error::from(e).with_file_path(path.as_ref()))
    }

    fn write_block<W: Write>(&self, mut w: W, block: &PendingBlock) -> Result<()> {
        let len = block.data.len() as u64;
        w.write_all(&block.code)?;
        if self.v1 {
            w.write_all(&block.sdna_index.to_le_bytes())?;
            w.write_all(&block.old_address.to_le_bytes())?;
            w.write_all(&len.to_le_bytes())?;
            w.write_all(&block.count.to_le_bytes())?;
        } else {
            let len = u32::try_from(len).map_err(|_| {
                Error::blend_file(
                    format!("Block of {len} bytes does not fit a legacy header"),
                    BlendFileErrorKind::SizeLimitExceeded,
                )
            })?;
            w.write_all(&len.to_le_bytes())?;
            if self.pointer_size == 4 {
                w.write_all(&(block.old_address as u32).to_le_bytes())?;
            } else {
                w.write_all(&block.old_address.to_le_bytes())?;
            }
            w.write_all(&block.sdna_index.to_le_bytes())?;
            w.write_all(&(block.count as u32).to_le_bytes())?;
        }
        w.write_all(&block.data)?;
        Ok(())
    }
}
