//! The JSON settings file holding tool presets
//!
//! The file is plain JSON so configs written by earlier releases of the
//! tool (`byname`/`bycontent` keys, no trailing newline) keep loading.

use crate::{Error, NormalizedPath, Result, io};
use serde::{Serialize, de::DeserializeOwned};

/// Extension every settings file must carry.
pub const CONFIG_EXTENSION: &str = "json";

/// One JSON settings file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: NormalizedPath,
}

impl ConfigFile {
    /// Settings file at `path`. Anything but a `.json` file is refused.
    pub fn new(path: impl Into<NormalizedPath>) -> Result<Self> {
        let path = path.into();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(CONFIG_EXTENSION));
        if !is_json {
            return Err(Error::NotJsonConfig {
                path: path.to_native(),
            });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Parse the file. A blank file reads as `null`, so types with
    /// `#[serde(default)]` still need at least `{}`.
    pub fn load<T: DeserializeOwned>(&self) -> Result<T> {
        let content = io::read_text(&self.path)?;
        serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
            path: self.path.to_native(),
            line: e.line(),
            column: e.column(),
            message: e.to_string(),
        })
    }

    /// Load the file, first writing `T::default()` when it does not exist.
    pub fn load_or_create<T>(&self) -> Result<T>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        if self.exists() {
            return self.load();
        }
        tracing::debug!("No config at {}, creating a default one", self.path);
        let value = T::default();
        self.save(&value)?;
        Ok(value)
    }

    /// Write `value` as pretty JSON with a trailing newline, atomically.
    pub fn save<T: Serialize>(&self, value: &T) -> Result<()> {
        let mut content =
            serde_json::to_string_pretty(value).map_err(|e| Error::ConfigSerialize {
                path: self.path.to_native(),
                message: e.to_string(),
            })?;
        content.push('\n');
        io::write_atomic(&self.path, content.as_bytes())
    }
}
