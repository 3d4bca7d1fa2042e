//! The export loop and its output file

use crate::config::ExportConfig;
use crate::object::SceneObject;
use crate::path::OutputTarget;
use crate::record::write_record;
use crate::remap::{AxisRemap, recompute_local_matrix};
use crate::source::ObjectSource;
use ddd_error::{DddError, Result};
use log::{debug, info, trace};
use std::fs::File;
use std::hash::Hasher;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use twox_hash::XxHash64;

/// Counts of one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSummary {
    pub exported: usize,
    pub skipped: usize,
    pub bytes_written: u64,
    /// xxh64 (seed 0) of everything written
    pub digest: u64,
}

/// Write one record per visible object, in the given order
///
/// Hidden objects are skipped. Objects are only read.
pub fn export_objects<W: Write + ?Sized>(
    objects: &[SceneObject],
    remap: AxisRemap,
    writer: &mut W,
) -> Result<ExportSummary> {
    let mut out = DigestWriter::new(writer);
    let mut summary = ExportSummary::default();

    for object in objects {
        if object.hidden {
            trace!("Skipping hidden object '{}'", object.name);
            summary.skipped += 1;
            continue;
        }

        let matrix = recompute_local_matrix(&object.transform, remap);
        write_record(&mut out, &object.name, &matrix)?;
        summary.exported += 1;
    }

    summary.bytes_written = out.bytes;
    summary.digest = out.hasher.finish();
    Ok(summary)
}

/// Hashes and counts bytes on their way to the inner writer
struct DigestWriter<'a, W: ?Sized> {
    inner: &'a mut W,
    hasher: XxHash64,
    bytes: u64,
}

impl<'a, W: Write + ?Sized> DigestWriter<'a, W> {
    fn new(inner: &'a mut W) -> Self {
        Self {
            inner,
            hasher: XxHash64::with_seed(0),
            bytes: 0,
        }
    }
}

impl<W: Write + ?Sized> Write for DigestWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.write(&buf[..n]);
        self.bytes += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// The output file, open for the duration of an export
///
/// Dropping the guard closes the file on every path; [`ExportFile::finish`]
/// flushes and reports write errors that a drop would swallow.
pub struct ExportFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ExportFile {
    /// Create or truncate the file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| {
            DddError::io(format!("Cannot create output file: {e}")).with_file_path(&path)
        })?;
        debug!("Opened {}", path.display());
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| DddError::from(e).with_file_path(&self.path))
    }
}

impl Write for ExportFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Result of [`Exporter::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub target: OutputTarget,
    pub summary: ExportSummary,
}

/// Exports the visible objects of a source to a ddd file
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Resolve where the export would go without touching the disk
    pub fn target<S: ObjectSource + ?Sized>(&self, source: &S) -> Result<OutputTarget> {
        OutputTarget::resolve(source.document_path(), &self.config)
    }

    /// Resolve the output path, then write every visible object to it
    ///
    /// Path problems are reported before the output file is created. A
    /// failure while reading objects or writing leaves whatever was already
    /// written in place.
    pub fn run<S: ObjectSource + ?Sized>(&self, source: &S) -> Result<ExportReport> {
        let target = self.target(source)?;
        debug!("basedir: {}", target.base_dir.display());
        debug!("filename: {}", target.filename);
        debug!("path: {}", target.path.display());

        let mut file = ExportFile::create(&target.path)?;
        let objects = source.objects()?;
        let remap = self.config.remap();
        debug!("Exporting {} objects with remap {remap}", objects.len());

        let summary = export_objects(&objects, remap, &mut file)
            .map_err(|e| e.with_file_path(file.path()))?;
        file.finish()?;

        info!(
            "Exported {} objects ({} hidden) to {}",
            summary.exported,
            summary.skipped,
            target.path.display()
        );
        Ok(ExportReport { target, summary })
    }
}
