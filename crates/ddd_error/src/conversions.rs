//! Conversions into `DddError` plus context builders and accessors
//!
//! Errors are usually created deep in the parser or exporter and gain file
//! paths, block indices or line numbers as they travel up to the CLI.

use crate::kinds::*;
use crate::types::DddError;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

impl From<std::io::Error> for DddError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            file_path: None,
            source_message: Some(format!("{:?}", err.kind())),
        }
    }
}

impl From<std::fmt::Error> for DddError {
    fn from(err: std::fmt::Error) -> Self {
        Self::cli(format!("formatting failed: {err}"), CliErrorKind::OutputFormatError)
    }
}

impl DddError {
    /// Attach the file the error is about; ignored for CLI errors
    pub fn with_file_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        match &mut self {
            Self::Io { file_path, .. }
            | Self::BlendFile { file_path, .. }
            | Self::Scene { file_path, .. }
            | Self::Export { file_path, .. }
            | Self::Format { file_path, .. }
            | Self::Config {
                config_path: file_path,
                ..
            } => *file_path = Some(path.into()),
            Self::Cli { .. } => {}
        }
        self
    }

    /// Attach the block the error was found in (blend file and scene errors)
    pub fn with_block_index(mut self, index: usize) -> Self {
        if let Self::BlendFile { block_index, .. } | Self::Scene { block_index, .. } = &mut self {
            *block_index = Some(index);
        }
        self
    }

    /// Attach a 1-based line number to a format error
    pub fn with_line(mut self, number: usize) -> Self {
        if let Self::Format { line, .. } = &mut self {
            *line = Some(number);
        }
        self
    }

    /// Name the CLI command that failed
    pub fn with_command<C: Into<String>>(mut self, name: C) -> Self {
        if let Self::Cli { command, .. } = &mut self {
            *command = Some(name.into());
        }
        self
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    pub fn is_blend_file(&self) -> bool {
        matches!(self, Self::BlendFile { .. })
    }

    pub fn is_scene(&self) -> bool {
        matches!(self, Self::Scene { .. })
    }

    pub fn is_export(&self) -> bool {
        matches!(self, Self::Export { .. })
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    pub fn is_cli(&self) -> bool {
        matches!(self, Self::Cli { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// The document was never saved and no output directory was given
    pub fn is_unsaved_document(&self) -> bool {
        matches!(
            self,
            Self::Export {
                kind: ExportErrorKind::UnsavedDocument,
                ..
            }
        )
    }

    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { file_path, .. }
            | Self::BlendFile { file_path, .. }
            | Self::Scene { file_path, .. }
            | Self::Export { file_path, .. }
            | Self::Format { file_path, .. }
            | Self::Config {
                config_path: file_path,
                ..
            } => file_path.as_ref(),
            Self::Cli { .. } => None,
        }
    }

    pub fn block_index(&self) -> Option<usize> {
        match self {
            Self::BlendFile { block_index, .. } | Self::Scene { block_index, .. } => *block_index,
            _ => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Format { line, .. } => *line,
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Cli { command, .. } => command.as_deref(),
            _ => None,
        }
    }

    /// One-line message for the terminal, with whatever context is known
    pub fn user_message(&self) -> String {
        let (prefix, message) = match self {
            Self::Io { message, .. } => ("File operation failed", message),
            Self::BlendFile { message, .. } => ("Blend file error", message),
            Self::Scene { message, .. } => ("Could not read scene", message),
            Self::Export { message, .. } => ("Export failed", message),
            Self::Format { message, .. } => ("Malformed matrix file", message),
            Self::Config { message, .. } => ("Configuration error", message),
            Self::Cli {
                message,
                command: Some(name),
                ..
            } => return format!("Command '{name}' failed: {message}"),
            Self::Cli { message, .. } => ("Command failed", message),
        };

        let mut out = format!("{prefix}: {message}");
        match (self.file_path(), self.line()) {
            (Some(path), Some(line)) => {
                let _ = write!(out, " ({}:{line})", path.display());
            }
            (Some(path), None) => push_file(&mut out, self, path),
            (None, Some(line)) => {
                let _ = write!(out, " (line {line})");
            }
            (None, None) => {}
        }
        if let Some(index) = self.block_index() {
            let _ = write!(out, " (block {index})");
        }
        out
    }
}

fn push_file(out: &mut String, err: &DddError, path: &Path) {
    let label = if err.is_config() { "config" } else { "file" };
    let _ = write!(out, " ({label}: {})", path.display());
}
