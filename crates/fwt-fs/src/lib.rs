//! Filesystem primitives for Foundry World Tools
//!
//! Provides forward-slash path handling, no-clobber file moves and copies,
//! content fingerprinting and the JSON preset file.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigFile;
pub use constants::{ProjectKind, RECORD_STORE_EXTENSION, TRASH_DIR};
pub use error::{Error, Result};
pub use path::NormalizedPath;
