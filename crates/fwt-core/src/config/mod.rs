//! Presets and option merging
//!
//! Options for a command come from up to three places, merged in this
//! order (earlier wins for scalars, lists are unioned with earlier entries
//! first):
//!
//! 1. **Explicit** - flags given on the command line
//! 2. **Preset** - a named entry in the application config
//! 3. **Defaults**
//!
//! # Example
//!
//! ```ignore
//! use fwt_core::config::{AppConfig, ToolOptions};
//!
//! let config = AppConfig::load_or_create(&AppConfig::default_path()?)?;
//! let preset = config.preset_for("images", "dedup")?;
//! let options = explicit.merge(&ToolOptions::from(preset));
//! let mode = options.detection_mode()?;
//! ```

mod options;
mod preset;

pub use options::ToolOptions;
pub use preset::{AppConfig, CONFIG_DIR_NAME, CONFIG_FILE_NAME, Preset};
