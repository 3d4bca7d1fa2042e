use crate::util::{CommandContext, colorize_index, colorize_name};
use ddd_error::{CliErrorKind, DddError};
use ddd_export::{format_fixed, parse_records};
use log::info;
use std::path::PathBuf;

pub fn cmd_show(file_path: PathBuf, json: bool, ctx: &CommandContext) -> Result<(), DddError> {
    let text = std::fs::read_to_string(&file_path)
        .map_err(|e| DddError::from(e).with_file_path(&file_path))?;
    let records = parse_records(&text).map_err(|e| e.with_file_path(&file_path))?;
    info!("{} records in {}", records.len(), file_path.display());

    if json {
        let text = serde_json::to_string_pretty(&records).map_err(|e| {
            DddError::cli(
                format!("Failed to serialize records: {e}"),
                CliErrorKind::OutputFormatError,
            )
        })?;
        ctx.output.print_result(&text);
        return Ok(());
    }

    ctx.output
        .print_info(&format!("File: {} ({} records)", file_path.display(), records.len()));
    for (index, record) in records.iter().enumerate() {
        let [x, y, z] = record.translation();
        ctx.output.print_result(&format!(
            "{}: {} at ({} {} {})",
            colorize_index(index),
            colorize_name(&record.name),
            format_fixed(x),
            format_fixed(y),
            format_fixed(z)
        ));
    }
    Ok(())
}
