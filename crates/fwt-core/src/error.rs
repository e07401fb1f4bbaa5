//! Error types for fwt-core

use std::path::PathBuf;

/// Result type for fwt-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fwt-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No ancestor of the start path holds the application config file
    #[error("Data root not found above {start}")]
    DataRootNotFound { start: PathBuf },

    /// No manifest file in the path or any of its ancestors
    #[error("{path} is not inside a project (no world.json, system.json or module.json found)")]
    NotAProject { path: PathBuf },

    #[error("Path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// Path lies outside the data root and no manifest can place it inside
    #[error("{path} is outside the data root {data_root} and not inside a project")]
    OutsideDataRoot { path: PathBuf, data_root: PathBuf },

    /// A destination is already occupied. Nothing was moved or copied.
    #[error("Target {path} already exists")]
    TargetExists { path: PathBuf },

    #[error("Invalid detection mode: exactly one of by_content ({by_content}) or by_name ({by_name}) must be set")]
    InvalidDetectionMode { by_content: bool, by_name: bool },

    /// A record store disappeared between enumeration and rewrite
    #[error("Record store {path} vanished before it could be rewritten")]
    RewriteTargetMissing { path: PathBuf },

    #[error("Record store path {path} is not a project, directory or .db file")]
    InvalidRecordStorePath { path: PathBuf },

    #[error("File {path} is locked")]
    EntityLocked { path: PathBuf },

    #[error("File {path} has already been moved to trash or deleted")]
    EntityRetired { path: PathBuf },

    /// Content bucket probing gave up
    #[error("Gave up placing {path} after {probes} hash probes")]
    ProbeLimitExceeded { path: PathBuf, probes: usize },

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid glob {glob:?}: {source}")]
    InvalidGlob {
        glob: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Preset not found: {name}")]
    PresetNotFound { name: String },

    #[error("Preset {name} cannot be used with the {command} command")]
    PresetCommandMismatch { name: String, command: String },

    /// Filesystem error from fwt-fs
    #[error(transparent)]
    Fs(fwt_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<fwt_fs::Error> for Error {
    fn from(err: fwt_fs::Error) -> Self {
        match err {
            fwt_fs::Error::TargetExists { path } => Self::TargetExists { path },
            other => Self::Fs(other),
        }
    }
}

impl Error {
    pub(crate) fn pattern(pattern: &str, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    }

    /// True when the failure is a permission problem.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Fs(e) => e.is_permission_denied(),
            Self::Io(e) => e.kind() == std::io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}
