//! Error types for fwt-fs

use std::path::PathBuf;

/// Result type for fwt-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fwt-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A move or copy destination is already occupied. Nothing was changed.
    #[error("Target {path} already exists")]
    TargetExists { path: PathBuf },

    #[error("Invalid JSON in config {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Failed to serialize config for {path}: {message}")]
    ConfigSerialize { path: PathBuf, message: String },

    /// Presets live in a JSON file; other formats are not read.
    #[error("Config {path} is not a .json file")]
    NotJsonConfig { path: PathBuf },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when the underlying cause is a permission problem.
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied
        )
    }
}
