//! SDNA: the type catalogue stored in every blend file
//!
//! The `DNA1` block lists every struct Blender wrote, with member names and
//! types. Field offsets are not stored; they follow from member sizes in
//! declaration order.

use crate::error::{BlendFileErrorKind, Error, Result};
use ahash::AHashMap;

const MAX_NAMES: u32 = 1_000_000;
const MAX_TYPES: u32 = 1_000_000;
const MAX_STRUCTS: u32 = 100_000;

#[derive(Debug, Clone)]
pub struct DnaName {
    pub name_full: String,
    pub name_only: String,
    pub is_pointer: bool,
    pub is_method_pointer: bool,
    pub array_size: usize,
}

#[derive(Debug, Clone)]
pub struct DnaField {
    pub type_name: String,
    pub name: DnaName,
    pub size: usize,
    pub offset: usize,
}

#[derive(Debug, Clone)]
pub struct DnaStruct {
    pub type_name: String,
    pub size: usize,
    pub fields: Vec<DnaField>,
    fields_by_name: AHashMap<String, usize>,
}

/// A member located through a dotted path such as `"id.name"`
#[derive(Debug, Clone, Copy)]
pub struct ResolvedField<'a> {
    /// Offset from the start of the outermost struct
    pub offset: usize,
    pub field: &'a DnaField,
}

#[derive(Debug)]
pub struct DnaCollection {
    pub structs: Vec<DnaStruct>,
    struct_index: AHashMap<String, usize>,
    pub types: Vec<String>,
    pub names: Vec<DnaName>,
    pub type_sizes: Vec<u16>,
}

impl DnaName {
    /// Split a declarator such as `*next`, `mat[4][4]` or `(*func)()`
    pub fn new(name_full: impl Into<String>) -> Result<Self> {
        let name_full = name_full.into();
        let is_pointer = name_full.contains('*');
        let is_method_pointer = name_full.contains("(*");

        let name_only = name_full
            .trim_start_matches(['(', '*'])
            .split(['[', '(', ')'])
            .next()
            .unwrap_or_default()
            .to_string();

        // Product of every `[n]` dimension, 1 for scalars
        let array_size = name_full
            .split('[')
            .skip(1)
            .filter_map(|dim| dim.split(']').next()?.parse::<usize>().ok())
            .try_fold(1usize, usize::checked_mul)
            .ok_or_else(|| {
                Error::parser_dna_error(format!("Array dimensions of '{name_full}' overflow"))
            })?;

        Ok(DnaName {
            name_full,
            name_only,
            is_pointer,
            is_method_pointer,
            array_size,
        })
    }

    /// Bytes this member takes inside its struct
    pub(crate) fn size_in(&self, type_size: usize, pointer_size: usize) -> Result<usize> {
        let element = if self.is_pointer { pointer_size } else { type_size };
        element.checked_mul(self.array_size).ok_or_else(|| {
            Error::parser_dna_error(format!("Size of member '{}' overflows", self.name_full))
        })
    }
}

impl DnaStruct {
    fn new(type_name: String, size: usize) -> Self {
        DnaStruct {
            type_name,
            size,
            fields: Vec::new(),
            fields_by_name: AHashMap::new(),
        }
    }

    fn add_field(&mut self, field: DnaField) {
        self.fields_by_name
            .insert(field.name.name_only.clone(), self.fields.len());
        self.fields.push(field);
    }

    pub fn find_field(&self, name: &str) -> Option<&DnaField> {
        self.fields_by_name
            .get(name)
            .map(|&index| &self.fields[index])
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields_by_name.contains_key(name)
    }
}

impl DnaCollection {
    /// Parse the contents of a `DNA1` block
    pub fn parse(data: &[u8], pointer_size: usize, is_little_endian: bool) -> Result<Self> {
        let mut cursor = DnaCursor {
            data,
            pos: 0,
            is_little_endian,
        };

        cursor.expect_marker(b"SDNA")?;

        cursor.expect_marker(b"NAME")?;
        let names_count = cursor.read_count(MAX_NAMES, "names")?;
        let mut names = Vec::with_capacity(names_count);
        for _ in 0..names_count {
            names.push(DnaName::new(cursor.read_cstr()?)?);
        }

        cursor.align4();
        cursor.expect_marker(b"TYPE")?;
        let types_count = cursor.read_count(MAX_TYPES, "types")?;
        let mut types = Vec::with_capacity(types_count);
        for _ in 0..types_count {
            types.push(cursor.read_cstr()?);
        }

        cursor.align4();
        cursor.expect_marker(b"TLEN")?;
        let mut type_sizes = Vec::with_capacity(types_count);
        for _ in 0..types_count {
            type_sizes.push(cursor.read_u16()?);
        }

        cursor.align4();
        cursor.expect_marker(b"STRC")?;
        let struct_count = cursor.read_count(MAX_STRUCTS, "structs")?;
        let mut structs = Vec::with_capacity(struct_count);

        for _ in 0..struct_count {
            structs.push(cursor.read_struct(&types, &type_sizes, &names, pointer_size)?);
        }

        let struct_index = structs
            .iter()
            .enumerate()
            .map(|(i, s)| (s.type_name.clone(), i))
            .collect();

        Ok(DnaCollection {
            structs,
            struct_index,
            types,
            names,
            type_sizes,
        })
    }

    pub fn get_struct(&self, index: usize) -> Option<&DnaStruct> {
        self.structs.get(index)
    }

    pub fn find_struct(&self, name: &str) -> Option<&DnaStruct> {
        self.struct_index
            .get(name)
            .and_then(|&index| self.structs.get(index))
    }

    /// Index of a struct in the catalogue, as stored in block headers
    pub fn struct_index_of(&self, name: &str) -> Option<usize> {
        self.struct_index.get(name).copied()
    }

    /// Locate a member by dotted path, descending into embedded structs
    ///
    /// `resolve("Object", "id.name")` returns the `name` member of the `ID`
    /// embedded at the start of `Object`, with its offset from the start of
    /// `Object`. Pointers are never followed.
    pub fn resolve(&self, struct_name: &str, path: &str) -> Result<ResolvedField<'_>> {
        let mut current = self.find_struct(struct_name).ok_or_else(|| {
            Error::parser_invalid_field(format!("Struct '{struct_name}' not found in DNA"))
        })?;
        let mut offset = 0;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            let field = current.find_field(segment).ok_or_else(|| {
                Error::parser_invalid_field(format!(
                    "Field '{segment}' not found in struct '{}'",
                    current.type_name
                ))
            })?;
            offset += field.offset;

            if segments.peek().is_none() {
                return Ok(ResolvedField { offset, field });
            }

            if field.name.is_pointer {
                return Err(Error::parser_invalid_field(format!(
                    "Cannot descend through pointer '{segment}' in '{path}'"
                )));
            }
            current = self.find_struct(&field.type_name).ok_or_else(|| {
                Error::parser_invalid_field(format!(
                    "'{segment}' in '{path}' is not an embedded struct"
                ))
            })?;
        }

        Err(Error::parser_invalid_field("Empty field path"))
    }

    /// Whether a dotted member path exists, e.g. to probe renamed fields
    pub fn has_path(&self, struct_name: &str, path: &str) -> bool {
        self.resolve(struct_name, path).is_ok()
    }
}

/// Little cursor over the DNA block with 4-byte alignment handling
struct DnaCursor<'a> {
    data: &'a [u8],
    pos: usize,
    is_little_endian: bool,
}

impl DnaCursor<'_> {
    fn take(&mut self, len: usize) -> Result<&[u8]> {
        let end = self.pos + len;
        if end > self.data.len() {
            return Err(Error::parser_dna_error(format!(
                "DNA block truncated at offset {}",
                self.pos
            )));
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn align4(&mut self) {
        self.pos = (self.pos + 3) & !3;
    }

    fn expect_marker(&mut self, marker: &[u8; 4]) -> Result<()> {
        let found = self.take(4)?;
        if found != marker {
            return Err(Error::parser_dna_error(format!(
                "Expected {} marker, got: {:?}",
                String::from_utf8_lossy(marker),
                String::from_utf8_lossy(found)
            )));
        }
        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16> {
        let little = self.is_little_endian;
        let raw = self.take(2)?;
        let bytes = [raw[0], raw[1]];
        Ok(if little {
            u16::from_le_bytes(bytes)
        } else {
            u16::from_be_bytes(bytes)
        })
    }

    fn read_u32(&mut self) -> Result<u32> {
        let little = self.is_little_endian;
        let raw = self.take(4)?;
        let bytes = [raw[0], raw[1], raw[2], raw[3]];
        Ok(if little {
            u32::from_le_bytes(bytes)
        } else {
            u32::from_be_bytes(bytes)
        })
    }

    /// One `STRC` entry; member offsets are laid out back to back
    fn read_struct(
        &mut self,
        types: &[String],
        type_sizes: &[u16],
        names: &[DnaName],
        pointer_size: usize,
    ) -> Result<DnaStruct> {
        let type_of = |index: usize| {
            types
                .get(index)
                .zip(type_sizes.get(index))
                .ok_or_else(|| Error::parser_dna_error(format!("Type index {index} out of range")))
        };

        let (type_name, &size) = type_of(self.read_u16()? as usize)?;
        let member_count = self.read_u16()?;
        let mut dna_struct = DnaStruct::new(type_name.clone(), size as usize);

        let mut offset: usize = 0;
        for _ in 0..member_count {
            let (member_type, &type_size) = type_of(self.read_u16()? as usize)?;
            let name_index = self.read_u16()? as usize;
            let name = names.get(name_index).cloned().ok_or_else(|| {
                Error::parser_dna_error(format!("Name index {name_index} out of range"))
            })?;

            let size = name.size_in(type_size as usize, pointer_size)?;
            let end = offset.checked_add(size).ok_or_else(|| {
                Error::parser_dna_error(format!("Members of '{type_name}' overflow the address space"))
            })?;
            dna_struct.add_field(DnaField {
                type_name: member_type.clone(),
                name,
                size,
                offset,
            });
            offset = end;
        }
        Ok(dna_struct)
    }

    fn read_count(&mut self, limit: u32, what: &str) -> Result<usize> {
        let count = self.read_u32()?;
        if count > limit {
            return Err(Error::parser_dna_error(format!(
                "Unreasonably large {what} count: {count}"
            )));
        }
        Ok(count as usize)
    }

    fn read_cstr(&mut self) -> Result<String> {
        let rest = &self.data[self.pos..];
        let len = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            Error::parser_dna_error(format!("Unterminated DNA string at offset {}", self.pos))
        })?;
        let s = std::str::from_utf8(&rest[..len])
            .map_err(|_| {
                Error::blend_file("Invalid UTF-8 in DNA string", BlendFileErrorKind::InvalidData)
            })?
            .to_string();
        self.pos += len + 1;
        Ok(s)
    }
}
