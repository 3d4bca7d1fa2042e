use crate::util::CommandContext;
use ddd_error::DddError;
use ddd_export::{ExportConfig, Exporter};
use log::{debug, info};
use std::path::PathBuf;

/// File settings first, then command-line flags on top
pub fn build_config(
    config_path: Option<&PathBuf>,
    overrides: ExportConfig,
) -> Result<ExportConfig, DddError> {
    let base = match config_path {
        Some(path) => {
            info!("Loading export config: {}", path.display());
            ExportConfig::load(path)?
        }
        None => ExportConfig::default(),
    };
    Ok(base.overlay(overrides))
}

pub fn cmd_export(
    file_path: PathBuf,
    config_path: Option<PathBuf>,
    overrides: ExportConfig,
    ctx: &CommandContext,
) -> Result<(), DddError> {
    let config = build_config(config_path.as_ref(), overrides)?;
    debug!("Effective export config: {config:?}");

    let scene = ctx.load_scene(&file_path, config.selection())?;
    let exporter = Exporter::new(config);

    // Resolved before anything is written so path errors leave no file behind
    let target = exporter.target(&scene)?;
    ctx.output.print_info(&target.base_dir.display().to_string());
    ctx.output.print_info(&target.filename);
    ctx.output.print_info(&target.path.display().to_string());

    let report = exporter.run(&scene)?;
    info!(
        "{} exported, {} hidden, {} bytes, xxh64 {:016x}",
        report.summary.exported,
        report.summary.skipped,
        report.summary.bytes_written,
        report.summary.digest
    );

    ctx.output.print_result("done");
    Ok(())
}
