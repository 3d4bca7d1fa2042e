//! Constructors for each error domain
//!
//! The `parser_*`, `scene_*` and `export_*` shorthands cover the failures
//! raised most often.

use crate::kinds::*;
use crate::types::DddError;

impl DddError {
    /// I/O error with a custom message
    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io {
            message: message.into(),
            file_path: None,
            source_message: None,
        }
    }

    pub fn blend_file<M: Into<String>>(message: M, kind: BlendFileErrorKind) -> Self {
        Self::BlendFile {
            message: message.into(),
            file_path: None,
            block_index: None,
            kind,
        }
    }

    pub fn scene<M: Into<String>>(message: M, kind: SceneErrorKind) -> Self {
        Self::Scene {
            message: message.into(),
            file_path: None,
            block_index: None,
            kind,
        }
    }

    pub fn export<M: Into<String>>(message: M, kind: ExportErrorKind) -> Self {
        Self::Export {
            message: message.into(),
            file_path: None,
            kind,
        }
    }

    pub fn format<M: Into<String>>(message: M, kind: FormatErrorKind) -> Self {
        Self::Format {
            message: message.into(),
            file_path: None,
            line: None,
            kind,
        }
    }

    pub fn cli<M: Into<String>>(message: M, kind: CliErrorKind) -> Self {
        Self::Cli {
            message: message.into(),
            command: None,
            kind,
        }
    }

    pub fn config<M: Into<String>>(message: M, kind: ConfigErrorKind) -> Self {
        Self::Config {
            message: message.into(),
            config_path: None,
            kind,
        }
    }


    /// Bad magic, pointer size, endianness or version
    pub fn parser_invalid_header<M: Into<String>>(message: M) -> Self {
        Self::blend_file(message, BlendFileErrorKind::InvalidHeader)
    }

    /// `DNA1` block missing or malformed
    pub fn parser_dna_error<M: Into<String>>(message: M) -> Self {
        Self::blend_file(message, BlendFileErrorKind::DnaError)
    }

    /// Unknown member, wrong type or out-of-range read
    pub fn parser_invalid_field<M: Into<String>>(message: M) -> Self {
        Self::blend_file(message, BlendFileErrorKind::InvalidField)
    }


    /// The file's DNA lacks a struct or member the exporter relies on
    pub fn scene_missing_struct<M: Into<String>>(message: M) -> Self {
        Self::scene(message, SceneErrorKind::MissingStruct)
    }

    /// An object pointer or its transform cannot be read
    pub fn scene_invalid_object<M: Into<String>>(message: M) -> Self {
        Self::scene(message, SceneErrorKind::InvalidObject)
    }


    /// No saved document path and no `basedir`
    pub fn export_unsaved_document<M: Into<String>>(message: M) -> Self {
        Self::export(message, ExportErrorKind::UnsavedDocument)
    }

    pub fn export_invalid_remap<M: Into<String>>(message: M) -> Self {
        Self::export(message, ExportErrorKind::InvalidRemap)
    }


    /// `line` is 1-based
    pub fn format_at_line<M: Into<String>>(message: M, kind: FormatErrorKind, line: usize) -> Self {
        Self::format(message, kind).with_line(line)
    }


    pub fn cli_invalid_arguments<M: Into<String>>(message: M) -> Self {
        Self::cli(message, CliErrorKind::InvalidArguments)
    }


    pub fn config_not_found<M: Into<String>>(message: M) -> Self {
        Self::config(message, ConfigErrorKind::NotFound)
    }

    /// TOML that does not parse or has unknown keys
    pub fn config_invalid_format<M: Into<String>>(message: M) -> Self {
        Self::config(message, ConfigErrorKind::InvalidFormat)
    }
}
