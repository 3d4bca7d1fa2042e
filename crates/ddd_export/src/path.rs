//! Output path resolution

use crate::config::ExportConfig;
use ddd_error::{DddError, ExportErrorKind, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where an export is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub base_dir: PathBuf,
    pub filename: String,
    pub path: PathBuf,
}

impl OutputTarget {
    /// Resolve `base_dir/filename` from the document location and config
    ///
    /// `base_dir` is the configured `basedir` when non-empty, else the
    /// document's directory. `filename` is the configured one, else the
    /// document's file name. Nothing is created or checked on disk.
    pub fn resolve(document: Option<&Path>, config: &ExportConfig) -> Result<Self> {
        let document = document.filter(|p| !p.as_os_str().is_empty());
        let override_dir = config.effective_basedir();

        let base_dir = match (override_dir, document) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(doc)) => doc.parent().map(Path::to_path_buf).unwrap_or_default(),
            (None, None) => {
                return Err(DddError::export_unsaved_document(
                    "Blend file is not saved and no basedir is configured",
                ));
            }
        };

        let filename = match config.effective_filename() {
            Some(name) => name.trim_start_matches('/').to_string(),
            None => document
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    DddError::export(
                        "Document is not saved; set a filename for the export",
                        ExportErrorKind::MissingFilename,
                    )
                })?,
        };
        if filename.is_empty() {
            return Err(DddError::export(
                "Output filename is empty",
                ExportErrorKind::MissingFilename,
            ));
        }

        let path = base_dir.join(&filename);
        if let Some(doc) = document {
            if same_file(doc, &path) {
                return Err(DddError::export(
                    "Export would overwrite the blend file; set basedir or filename",
                    ExportErrorKind::WouldOverwriteSource,
                )
                .with_file_path(&path));
            }
        }

        Ok(Self {
            base_dir,
            filename,
            path,
        })
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
