//! Kind enums, one per error domain, so callers can match on a failure
//! instead of its message

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What went wrong while reading a `.blend` file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlendFileErrorKind {
    #[error("Invalid file header")]
    InvalidHeader,
    #[error("Invalid magic bytes")]
    InvalidMagic,
    #[error("Unsupported file version")]
    UnsupportedVersion,
    #[error("Missing DNA block")]
    NoDnaFound,
    #[error("Invalid block index")]
    InvalidBlockIndex,
    #[error("DNA parsing error")]
    DnaError,
    #[error("Invalid data structure")]
    InvalidData,
    #[error("Invalid byte range")]
    InvalidRange,
    #[error("Field access error")]
    InvalidField,
    #[error("Compression not supported")]
    UnsupportedCompression,
    #[error("Decompression failed")]
    DecompressionFailed,
    #[error("File size limit exceeded")]
    SizeLimitExceeded,
}

/// Failures locating the scene, its view layer or its objects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SceneErrorKind {
    #[error("File contains no scene")]
    NoScene,
    #[error("Scene not found")]
    SceneNotFound,
    #[error("View layer not found")]
    ViewLayerNotFound,
    #[error("Struct missing from DNA")]
    MissingStruct,
    #[error("Object could not be read")]
    InvalidObject,
}

/// Output path and remap problems
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExportErrorKind {
    #[error("Document is not saved")]
    UnsavedDocument,
    #[error("No output filename")]
    MissingFilename,
    #[error("Output would overwrite the source document")]
    WouldOverwriteSource,
    #[error("Invalid axis remap")]
    InvalidRemap,
}

/// Problems in a `.ddd` file read back with `parse_records`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FormatErrorKind {
    #[error("Record truncated")]
    Truncated,
    #[error("Wrong number of values on a matrix line")]
    WrongValueCount,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Missing record separator")]
    MissingSeparator,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CliErrorKind {
    #[error("Invalid command arguments")]
    InvalidArguments,
    #[error("Output formatting failed")]
    OutputFormatError,
}

/// TOML settings file problems
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConfigErrorKind {
    #[error("Configuration file not found")]
    NotFound,
    #[error("Invalid configuration format")]
    InvalidFormat,
    #[error("Invalid configuration value")]
    InvalidValue,
}
