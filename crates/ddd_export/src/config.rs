//! Export settings, loadable from a TOML file
//!
//! ```toml
//! basedir = "/tmp/ddd"
//! filename = "level.ddd"
//! scene = "Scene"
//! view_layer = "ViewLayer"
//! remap = "x,z,-y"
//! ```
//!
//! Every key is optional. Command-line values are layered on top with
//! [`ExportConfig::overlay`].

use crate::blend::SceneSelection;
use crate::remap::AxisRemap;
use ddd_error::{ConfigErrorKind, DddError, Result};
use log::debug;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Output directory; replaces the document's directory when non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basedir: Option<PathBuf>,
    /// Output file name; replaces the document's file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_layer: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_remap",
        deserialize_with = "deserialize_remap"
    )]
    pub remap: Option<AxisRemap>,
}

impl ExportConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| DddError::config_invalid_format(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            let err = if e.kind() == std::io::ErrorKind::NotFound {
                DddError::config_not_found(format!("Config file not found: {e}"))
            } else {
                DddError::from(e)
            };
            err.with_file_path(path)
        })?;
        let config = Self::from_toml_str(&text).map_err(|e| e.with_file_path(path))?;
        debug!("Loaded export config from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            DddError::config(e.to_string(), ConfigErrorKind::InvalidValue)
        })
    }

    /// Values set in `top` win over values in `self`
    pub fn overlay(self, top: ExportConfig) -> ExportConfig {
        ExportConfig {
            basedir: top.basedir.or(self.basedir),
            filename: top.filename.or(self.filename),
            scene: top.scene.or(self.scene),
            view_layer: top.view_layer.or(self.view_layer),
            remap: top.remap.or(self.remap),
        }
    }

    /// The configured output directory, `None` when unset or empty
    pub fn effective_basedir(&self) -> Option<&Path> {
        self.basedir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    /// The configured file name, `None` when unset or empty
    pub fn effective_filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|name| !name.is_empty())
    }

    pub fn remap(&self) -> AxisRemap {
        self.remap.unwrap_or_default()
    }

    pub fn selection(&self) -> SceneSelection {
        SceneSelection {
            scene: self.scene.clone(),
            view_layer: self.view_layer.clone(),
        }
    }
}

fn serialize_remap<S: Serializer>(
    remap: &Option<AxisRemap>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match remap {
        Some(remap) => serializer.collect_str(remap),
        None => serializer.serialize_none(),
    }
}

fn deserialize_remap<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<AxisRemap>, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse()
        .map(Some)
        .map_err(|e: DddError| serde::de::Error::custom(e.to_string()))
}
