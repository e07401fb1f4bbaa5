//! Constants and enums for the data root and project filesystem layout.

use std::path::Path;

/// Directory holding every project, next to the application config.
pub const DATA_DIR: &str = "Data";

/// The application's own configuration file, relative to the user data
/// directory that contains [`DATA_DIR`].
pub const APP_CONFIG_FILE: &str = "Config/options.json";

/// Per-project trash root. Each run gets its own session directory below it.
pub const TRASH_DIR: &str = "Trash";

/// Record-store file extension (one JSON record per line).
pub const RECORD_STORE_EXTENSION: &str = "db";

/// Project subdirectories holding record stores.
pub const RECORD_STORE_DIRS: [&str; 2] = ["data", "packs"];

/// Upper bound on upward directory walks.
pub const MAX_ANCESTOR_DEPTH: usize = 128;

/// Project kinds, identified by the manifest file at the project root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    World,
    System,
    Module,
}

impl ProjectKind {
    /// All kinds, in manifest lookup order.
    pub const ALL: [ProjectKind; 3] = [Self::World, Self::System, Self::Module];

    /// Get the string representation (the manifest file stem).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::World => "world",
            Self::System => "system",
            Self::Module => "module",
        }
    }

    /// Manifest file name at the project root.
    pub fn manifest_file(&self) -> &'static str {
        match self {
            Self::World => "world.json",
            Self::System => "system.json",
            Self::Module => "module.json",
        }
    }

    /// Directory below the data root that holds projects of this kind.
    pub fn collection_dir(&self) -> &'static str {
        match self {
            Self::World => "worlds",
            Self::System => "systems",
            Self::Module => "modules",
        }
    }

    /// Look up a kind from a manifest file name.
    pub fn from_manifest_file(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.manifest_file() == name)
    }

    /// Return the kind whose manifest is present in `dir`, if any.
    pub fn detect(dir: &Path) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| dir.join(k.manifest_file()).is_file())
    }
}

impl AsRef<str> for ProjectKind {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
