//! Typed field access over block data
//!
//! A `FieldView` pairs a block's bytes with the file's DNA so members can be
//! read by struct name and dotted path. Every read is bounds-checked and
//! honors the file's endianness and pointer width.

use crate::dna::{DnaCollection, ResolvedField};
use crate::error::{BlendFileErrorKind, Error, Result};

pub struct FieldView<'data> {
    data: &'data [u8],
    dna: &'data DnaCollection,
    pointer_size: usize,
    is_little_endian: bool,
}

macro_rules! read_scalar {
    ($name:ident, $ty:ty, $len:expr) => {
        pub fn $name(&self, offset: usize) -> Result<$ty> {
            let raw = self.slice(offset, $len)?;
            let mut bytes = [0u8; $len];
            bytes.copy_from_slice(raw);
            Ok(if self.is_little_endian {
                <$ty>::from_le_bytes(bytes)
            } else {
                <$ty>::from_be_bytes(bytes)
            })
        }
    };
}

impl<'data> FieldView<'data> {
    pub fn new(
        data: &'data [u8],
        dna: &'data DnaCollection,
        pointer_size: usize,
        is_little_endian: bool,
    ) -> Self {
        Self {
            data,
            dna,
            pointer_size,
            is_little_endian,
        }
    }

    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dna(&self) -> &'data DnaCollection {
        self.dna
    }

    /// View of the `index`-th element when a block holds an array of structs
    pub fn element(&self, struct_name: &str, index: usize) -> Result<FieldView<'data>> {
        let size = self
            .dna
            .find_struct(struct_name)
            .map(|s| s.size)
            .ok_or_else(|| {
                Error::parser_invalid_field(format!("Struct '{struct_name}' not found in DNA"))
            })?;
        let data = self.slice(index * size, size)?;
        Ok(FieldView::new(
            data,
            self.dna,
            self.pointer_size,
            self.is_little_endian,
        ))
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        self.data.get(offset).copied().ok_or_else(|| {
            Error::blend_file(
                format!("Offset {offset} is past the end of a {} byte block", self.data.len()),
                BlendFileErrorKind::InvalidField,
            )
        })
    }

    read_scalar!(read_u16, u16, 2);
    read_scalar!(read_i16, i16, 2);
    read_scalar!(read_u32, u32, 4);
    read_scalar!(read_i32, i32, 4);
    read_scalar!(read_u64, u64, 8);
    read_scalar!(read_i64, i64, 8);
    read_scalar!(read_f32, f32, 4);
    read_scalar!(read_f64, f64, 8);

    /// Pointer at `offset`, 4 or 8 bytes wide depending on the file
    pub fn read_pointer(&self, offset: usize) -> Result<u64> {
        match self.pointer_size {
            4 => self.read_u32(offset).map(|v| v as u64),
            8 => self.read_u64(offset),
            other => Err(Error::parser_invalid_field(format!(
                "Unsupported pointer width {other}"
            ))),
        }
    }

    /// `len` bytes starting at `offset`
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'data [u8]> {
        let end = offset.checked_add(len).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => Ok(&self.data[offset..end]),
            None => Err(Error::blend_file(
                format!(
                    "Read of {len} bytes at offset {offset} overruns a {} byte block",
                    self.data.len()
                ),
                BlendFileErrorKind::InvalidField,
            )),
        }
    }

    /// Locate a member by struct name and dotted path
    pub fn field(&self, struct_name: &str, path: &str) -> Result<ResolvedField<'data>> {
        self.dna.resolve(struct_name, path)
    }

    pub fn has_field(&self, struct_name: &str, path: &str) -> bool {
        self.dna.has_path(struct_name, path)
    }

    pub fn read_field_u8(&self, struct_name: &str, path: &str) -> Result<u8> {
        let field = self.field(struct_name, path)?;
        self.read_u8(field.offset)
    }

    pub fn read_field_i16(&self, struct_name: &str, path: &str) -> Result<i16> {
        let field = self.field(struct_name, path)?;
        self.read_i16(field.offset)
    }

    pub fn read_field_u16(&self, struct_name: &str, path: &str) -> Result<u16> {
        let field = self.field(struct_name, path)?;
        self.read_u16(field.offset)
    }

    pub fn read_field_i32(&self, struct_name: &str, path: &str) -> Result<i32> {
        let field = self.field(struct_name, path)?;
        self.read_i32(field.offset)
    }

    pub fn read_field_u32(&self, struct_name: &str, path: &str) -> Result<u32> {
        let field = self.field(struct_name, path)?;
        self.read_u32(field.offset)
    }

    pub fn read_field_f32(&self, struct_name: &str, path: &str) -> Result<f32> {
        let field = self.field(struct_name, path)?;
        self.read_f32(field.offset)
    }

    pub fn read_field_pointer(&self, struct_name: &str, path: &str) -> Result<u64> {
        let field = self.field(struct_name, path)?;
        if !field.field.name.is_pointer {
            return Err(Error::parser_invalid_field(format!(
                "Field '{path}' in '{struct_name}' is not a pointer"
            )));
        }
        self.read_pointer(field.offset)
    }

    /// Read an integer member whatever its declared width
    ///
    /// Blender has widened some members over the years (`short` to `int`);
    /// this reads by the DNA type so callers work across versions.
    pub fn read_field_int(&self, struct_name: &str, path: &str) -> Result<i64> {
        let field = self.field(struct_name, path)?;
        let offset = field.offset;
        match field.field.type_name.as_str() {
            "char" | "int8_t" => self.read_u8(offset).map(|v| v as i8 as i64),
            "uchar" | "uint8_t" | "bool" => self.read_u8(offset).map(i64::from),
            "short" | "int16_t" => self.read_i16(offset).map(i64::from),
            "ushort" | "uint16_t" => self.read_u16(offset).map(i64::from),
            "int" | "int32_t" => self.read_i32(offset).map(i64::from),
            "uint" | "uint32_t" => self.read_u32(offset).map(i64::from),
            "int64_t" | "uint64_t" => self.read_i64(offset),
            other => Err(Error::parser_invalid_field(format!(
                "Field '{path}' in '{struct_name}' has non-integer type '{other}'"
            ))),
        }
    }

    /// Read a fixed-size float array member such as `loc[3]` or `quat[4]`
    pub fn read_field_f32_array<const N: usize>(
        &self,
        struct_name: &str,
        path: &str,
    ) -> Result<[f32; N]> {
        let field = self.field(struct_name, path)?;
        if field.field.type_name != "float" || field.field.name.array_size < N {
            return Err(Error::parser_invalid_field(format!(
                "Field '{path}' in '{struct_name}' is not a float[{N}]"
            )));
        }
        let mut out = [0f32; N];
        for (i, value) in out.iter_mut().enumerate() {
            *value = self.read_f32(field.offset + i * 4)?;
        }
        Ok(out)
    }

    /// Read a `char[]` member up to its first NUL
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn read_field_string(&self, struct_name: &str, path: &str) -> Result<String> {
        let bytes = self.read_field_bytes(struct_name, path)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    pub fn read_field_bytes(&self, struct_name: &str, path: &str) -> Result<&'data [u8]> {
        let field = self.field(struct_name, path)?;
        self.slice(field.offset, field.field.size)
    }
}
