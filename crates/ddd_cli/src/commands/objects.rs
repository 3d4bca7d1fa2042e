use crate::util::{CommandContext, colorize_dim, colorize_index, colorize_name};
use ddd_error::{CliErrorKind, DddError};
use ddd_export::{ObjectSource, SceneSelection, format_fixed};
use log::info;
use std::path::PathBuf;

pub fn cmd_objects(
    file_path: PathBuf,
    scene: Option<String>,
    view_layer: Option<String>,
    json: bool,
    ctx: &CommandContext,
) -> Result<(), DddError> {
    let selection = SceneSelection { scene, view_layer };
    let blend = ctx.load_scene(&file_path, selection)?;
    let scene_name = blend.scene_name()?;
    let objects = blend.objects()?;
    info!("Scene '{scene_name}' has {} objects", objects.len());

    if json {
        let entries: Vec<serde_json::Value> = objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                let t = &object.transform;
                serde_json::json!({
                    "index": index,
                    "name": object.name,
                    "hidden": object.hidden,
                    "location": t.location.to_array(),
                    "rotation_mode": t.rotation.mode_name(),
                    "scale": t.scale.to_array(),
                })
            })
            .collect();
        let value = serde_json::json!({ "scene": scene_name, "objects": entries });
        let text = serde_json::to_string_pretty(&value).map_err(|e| {
            DddError::cli(
                format!("Failed to serialize objects: {e}"),
                CliErrorKind::OutputFormatError,
            )
        })?;
        ctx.output.print_result(&text);
        return Ok(());
    }

    ctx.output.print_info(&format!("Scene: {}", colorize_name(&scene_name)));
    for (index, object) in objects.iter().enumerate() {
        let loc = object.location();
        let mut line = format!(
            "{}: {} ({} {} {})",
            colorize_index(index),
            colorize_name(&object.name),
            format_fixed(loc.x),
            format_fixed(loc.y),
            format_fixed(loc.z)
        );
        if object.hidden {
            line.push(' ');
            line.push_str(&colorize_dim("[hidden]"));
        }
        ctx.output.print_result(&line);
    }
    Ok(())
}
