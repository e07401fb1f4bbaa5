//! Application config holding named presets

use crate::{Error, Result};
use fwt_fs::{ConfigFile, NormalizedPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Directory below the platform config dir.
pub const CONFIG_DIR_NAME: &str = "fwt";

pub const CONFIG_FILE_NAME: &str = "config.json";

/// A named set of option values for one or more commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    /// Commands this preset may be used with.
    pub command: Vec<String>,
    pub description: String,
    pub ext: Vec<String>,
    pub preferred: Vec<String>,
    #[serde(alias = "byname", skip_serializing_if = "Option::is_none")]
    pub by_name: Option<bool>,
    #[serde(alias = "bycontent", skip_serializing_if = "Option::is_none")]
    pub by_content: Option<bool>,
    pub exclude: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove: Option<String>,
    pub replace: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowercase: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_src: Option<bool>,
}

impl Preset {
    pub fn supports(&self, command: &str) -> bool {
        self.command.iter().any(|c| c == command)
    }
}

/// Contents of the application config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub presets: BTreeMap<String, Preset>,
}

impl AppConfig {
    /// `<config_dir>/fwt/config.json`, or `None` on platforms without a
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigFile::new(path.clone())?.load()?)
    }

    /// Load `path`, writing an empty config there first when it is missing.
    pub fn load_or_create(path: &NormalizedPath) -> Result<Self> {
        Ok(ConfigFile::new(path.clone())?.load_or_create()?)
    }

    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        Ok(ConfigFile::new(path.clone())?.save(self)?)
    }

    /// The preset `name`, checked against the invoked `command`.
    pub fn preset_for(&self, name: &str, command: &str) -> Result<&Preset> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| Error::PresetNotFound {
                name: name.to_string(),
            })?;
        if !preset.supports(command) {
            return Err(Error::PresetCommandMismatch {
                name: name.to_string(),
                command: command.to_string(),
            });
        }
        Ok(preset)
    }
}
