//! Run context shared by commands
//!
//! Resolves the data root for the paths a command works on and merges
//! command-line options over the selected preset.

use std::path::{Path, PathBuf};

use fwt_core::{AppConfig, DataRoot, PathResolver, ToolOptions};
use fwt_fs::NormalizedPath;

use crate::error::{CliError, Result};

/// Global options of one invocation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub data_root: Option<PathBuf>,
}

impl Context {
    /// Config file location: `--config`, else the platform default.
    pub fn config_path(&self) -> Result<NormalizedPath> {
        self.config
            .clone()
            .or_else(AppConfig::default_path)
            .map(NormalizedPath::new)
            .ok_or_else(|| CliError::user("No config directory on this platform; pass --config"))
    }

    /// Load the app config, creating an empty one when missing.
    pub fn app_config(&self) -> Result<AppConfig> {
        Ok(AppConfig::load_or_create(&self.config_path()?)?)
    }

    /// Resolver over `--data-root`, or the data root above `start`.
    pub fn resolver(&self, start: &Path) -> Result<PathResolver> {
        let data_root = match &self.data_root {
            Some(dir) => DataRoot::new(dir)?,
            None => DataRoot::discover(absolute(start)?)?,
        };
        tracing::debug!("Using data root {}", data_root.path());
        Ok(PathResolver::new(data_root))
    }

    /// Explicit options merged over the preset for `command`, if one is selected.
    pub fn options(&self, command: &str, explicit: ToolOptions) -> Result<ToolOptions> {
        let Some(name) = &self.preset else {
            return Ok(explicit);
        };
        let config = self.app_config()?;
        let preset = config.preset_for(name, command)?;
        tracing::debug!("Applying preset {} to {}", name, command);
        Ok(explicit.merge(&ToolOptions::from(preset)))
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
