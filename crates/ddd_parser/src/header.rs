use crate::error::{BlendFileErrorKind, Error, Result};

/// Size of the legacy header: `BLENDER` + pointer size + endianness + 3-digit version
pub const LEGACY_HEADER_SIZE: usize = 12;

/// Size of the v1 header introduced with Blender 5.0: `BLENDER17-01v####`
pub const V1_HEADER_SIZE: usize = 17;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendFileHeader {
    pub magic: [u8; 7],
    pub file_format_version: u32,
    pub pointer_size: u8,
    pub is_little_endian: bool,
    pub version: u32,
}

impl BlendFileHeader {
    /// Parse the file header from the start of a buffer
    pub fn read_from_slice(data: &[u8]) -> Result<Self> {
        if data.len() < LEGACY_HEADER_SIZE {
            return Err(Error::blend_file(
                "File too small to contain header",
                BlendFileErrorKind::InvalidHeader,
            ));
        }

        let mut magic = [0u8; 7];
        magic.copy_from_slice(&data[0..7]);
        if &magic != b"BLENDER" {
            return Err(Error::blend_file(
                format!("Invalid magic bytes: {magic:?}"),
                BlendFileErrorKind::InvalidMagic,
            ));
        }

        match data[7] {
            b'_' | b'-' => Self::read_legacy(magic, data),
            _ => Self::read_v1(magic, data),
        }
    }

    fn read_legacy(magic: [u8; 7], data: &[u8]) -> Result<Self> {
        let pointer_size = if data[7] == b'_' { 4 } else { 8 };

        let is_little_endian = match data[8] {
            b'v' => true,
            b'V' => false,
            other => {
                return Err(Error::blend_file(
                    format!("Invalid endian indicator: {}", other as char),
                    BlendFileErrorKind::InvalidHeader,
                ));
            }
        };

        let version = parse_ascii_number(&data[9..12], "version")?;

        Ok(BlendFileHeader {
            magic,
            file_format_version: 0,
            pointer_size,
            is_little_endian,
            version,
        })
    }

    fn read_v1(magic: [u8; 7], data: &[u8]) -> Result<Self> {
        if data.len() < V1_HEADER_SIZE {
            return Err(Error::blend_file(
                "File too small to contain v1 header",
                BlendFileErrorKind::InvalidHeader,
            ));
        }

        let header_size = parse_ascii_number(&data[7..9], "header size")?;
        if header_size as usize != V1_HEADER_SIZE {
            return Err(Error::blend_file(
                format!("Unknown header size: {header_size}"),
                BlendFileErrorKind::InvalidHeader,
            ));
        }

        if data[9] != b'-' {
            return Err(Error::blend_file(
                "Expected '-' separator",
                BlendFileErrorKind::InvalidHeader,
            ));
        }

        let file_format_version = parse_ascii_number(&data[10..12], "file format version")?;
        if file_format_version != 1 {
            return Err(Error::blend_file(
                format!("Unsupported version: {file_format_version}"),
                BlendFileErrorKind::UnsupportedVersion,
            ));
        }

        if data[12] != b'v' {
            return Err(Error::blend_file(
                "Expected 'v' endian indicator",
                BlendFileErrorKind::InvalidHeader,
            ));
        }

        let version = parse_ascii_number(&data[13..17], "version")?;

        Ok(BlendFileHeader {
            magic,
            file_format_version,
            pointer_size: 8,
            is_little_endian: true,
            version,
        })
    }

    pub fn header_size(&self) -> usize {
        if self.file_format_version == 0 {
            LEGACY_HEADER_SIZE
        } else {
            V1_HEADER_SIZE
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.file_format_version == 0
    }

    /// Blender version as `major.minor`, e.g. `4.2` for 402
    pub fn version_string(&self) -> String {
        format!("{}.{}", self.version / 100, self.version % 100)
    }
}

fn parse_ascii_number(bytes: &[u8], what: &str) -> Result<u32> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .ok_or_else(|| {
            Error::blend_file(
                format!("Invalid {what}: {:?}", String::from_utf8_lossy(bytes)),
                BlendFileErrorKind::InvalidHeader,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_64bit_little_endian() {
        let header = BlendFileHeader::read_from_slice(b"BLENDER-v300").unwrap();
        assert_eq!(header.pointer_size, 8);
        assert!(header.is_little_endian);
        assert_eq!(header.version, 300);
        assert_eq!(header.header_size(), 12);
        assert!(header.is_legacy());
        assert_eq!(header.version_string(), "3.0");
    }

    #[test]
    fn test_legacy_32bit_big_endian() {
        let header = BlendFileHeader::read_from_slice(b"BLENDER_V279").unwrap();
        assert_eq!(header.pointer_size, 4);
        assert!(!header.is_little_endian);
        assert_eq!(header.version, 279);
    }

    #[test]
    fn test_v1_header() {
        let header = BlendFileHeader::read_from_slice(b"BLENDER17-01v0500").unwrap();
        assert_eq!(header.file_format_version, 1);
        assert_eq!(header.pointer_size, 8);
        assert_eq!(header.version, 500);
        assert_eq!(header.header_size(), 17);
    }

    #[test]
    fn test_invalid_magic() {
        let err = BlendFileHeader::read_from_slice(b"BLUNDER-v300").unwrap_err();
        assert!(matches!(
            err,
            Error::BlendFile {
                kind: BlendFileErrorKind::InvalidMagic,
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_header() {
        assert!(BlendFileHeader::read_from_slice(b"BLENDER").is_err());
        assert!(BlendFileHeader::read_from_slice(b"BLENDER17-01v05").is_err());
    }

    #[test]
    fn test_unsupported_v1_format_version() {
        let err = BlendFileHeader::read_from_slice(b"BLENDER17-02v0500").unwrap_err();
        assert!(matches!(
            err,
            Error::BlendFile {
                kind: BlendFileErrorKind::UnsupportedVersion,
                ..
            }
        ));
    }
}
