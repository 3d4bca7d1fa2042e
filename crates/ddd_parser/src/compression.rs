//! Compressed-file detection and loading

use crate::buf::BlendBuf;
use crate::error::{BlendFileErrorKind, Error, Result};
use log::debug;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Zstandard frame magic, used by Blender 3.0+ for compressed saves
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Gzip magic, used by Blender before 3.0
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Largest single block accepted by the scanner
pub const DEFAULT_MAX_BLOCK_SIZE: u64 = 100_000_000;

/// How a file on disk is brought into memory
#[derive(Debug, Clone)]
pub struct DecompressionPolicy {
    /// Upper bound on decompressed size; larger zstd files are rejected
    pub max_in_memory_bytes: usize,
    /// Map uncompressed files instead of reading them
    pub prefer_mmap: bool,
}

impl Default for DecompressionPolicy {
    fn default() -> Self {
        Self {
            max_in_memory_bytes: 256 * 1024 * 1024,
            prefer_mmap: cfg!(feature = "mmap"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub decompression_policy: DecompressionPolicy,
    pub max_block_size: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            decompression_policy: DecompressionPolicy::default(),
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }
}

/// How the file content ended up in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressionMode {
    /// Uncompressed, read into memory
    None,
    /// Uncompressed, memory-mapped
    Mmap,
    /// Zstd decompressed into memory
    ZstdInMemory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    None,
    Zstd,
    Gzip,
}

/// Detect compression from the leading bytes of a file
pub fn detect_compression(data: &[u8]) -> CompressionKind {
    if data.starts_with(&ZSTD_MAGIC) {
        CompressionKind::Zstd
    } else if data.starts_with(&GZIP_MAGIC) {
        CompressionKind::Gzip
    } else {
        CompressionKind::None
    }
}

/// Decompress a zstd stream into memory, refusing to grow past `max_size`
pub fn decompress_zstd<R: Read>(reader: R, max_size: usize) -> Result<Vec<u8>> {
    #[cfg(feature = "zstd")]
    {
        use std::io::BufReader;

        // One byte past the limit tells "exactly max_size" from "too big"
        let limit = max_size as u64 + 1;
        let mut out = Vec::new();
        zstd::Decoder::new(BufReader::new(reader))?
            .take(limit)
            .read_to_end(&mut out)
            .map_err(|e| {
                Error::blend_file(
                    format!("Zstd stream is corrupt: {e}"),
                    BlendFileErrorKind::DecompressionFailed,
                )
            })?;

        if out.len() > max_size {
            return Err(Error::blend_file(
                format!("Decompressed size exceeds limit of {max_size} bytes"),
                BlendFileErrorKind::SizeLimitExceeded,
            ));
        }
        Ok(out)
    }

    #[cfg(not(feature = "zstd"))]
    {
        let _ = (reader, max_size);
        Err(Error::blend_file(
            "Built without the zstd feature",
            BlendFileErrorKind::UnsupportedCompression,
        ))
    }
}

/// Open a blend file and load it into a buffer, decompressing if needed
pub fn open_source<P: AsRef<Path>>(
    path: P,
    policy: &DecompressionPolicy,
) -> Result<(BlendBuf, DecompressionMode)> {
    let path = path.as_ref();
    let with_path = |e: std::io::Error| Error::from(e).with_file_path(path);
    let mut file = File::open(path).map_err(with_path)?;

    let mut magic = [0u8; 4];
    let magic_len = read_prefix(&mut file, &mut magic).map_err(with_path)?;

    match detect_compression(&magic[..magic_len]) {
        CompressionKind::Gzip => Err(Error::blend_file(
            "Gzip-compressed blend files are not supported; resave with Blender 3.0 or newer",
            BlendFileErrorKind::UnsupportedCompression,
        )
        .with_file_path(path)),
        CompressionKind::Zstd => {
            debug!("Decompressing zstd blend file: {}", path.display());
            file.rewind().map_err(with_path)?;
            let data = decompress_zstd(file, policy.max_in_memory_bytes)
                .map_err(|e| e.with_file_path(path))?;
            Ok((BlendBuf::from_vec(data), DecompressionMode::ZstdInMemory))
        }
        CompressionKind::None => {
            #[cfg(feature = "mmap")]
            if policy.prefer_mmap {
                // SAFETY: the mapping is read-only and the file is not modified by this
                // process while the buffer is alive
                match unsafe { memmap2::Mmap::map(&file) } {
                    Ok(mmap) => return Ok((BlendBuf::from_mmap(mmap), DecompressionMode::Mmap)),
                    Err(e) => log::warn!("Failed to mmap {}, reading instead: {e}", path.display()),
                }
            }

            let data = std::fs::read(path).map_err(with_path)?;
            Ok((BlendBuf::from_vec(data), DecompressionMode::None))
        }
    }
}

fn read_prefix(file: &mut File, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
