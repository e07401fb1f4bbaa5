//! Duplicate detection
//!
//! Scanned files are grouped into [`DuplicateSet`]s either by content or by
//! name. Each set then picks one preferred member; the rest are queued for
//! the trash and their references redirected to the preferred file.

mod engine;
mod set;

pub use engine::{DuplicateSetEngine, MAX_PROBES};
pub use set::{DuplicateSet, PROJECT_DIR_PLACEHOLDER, PreferredPatterns};

use crate::{Error, Result};
use fwt_fs::NormalizedPath;

/// How files are considered equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
    /// Identical bytes.
    Content,
    /// Same parent directory and file stem (`a.png` and `a.webp`).
    Name,
}

impl DetectionMode {
    /// Exactly one of the flags must be set.
    pub fn from_flags(by_content: bool, by_name: bool) -> Result<Self> {
        match (by_content, by_name) {
            (true, false) => Ok(Self::Content),
            (false, true) => Ok(Self::Name),
            _ => Err(Error::InvalidDetectionMode {
                by_content,
                by_name,
            }),
        }
    }
}

impl std::fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content => write!(f, "content"),
            Self::Name => write!(f, "name"),
        }
    }
}

/// Identity shared by all members of a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SetKey {
    /// Content bucket key (after probing).
    Content(u64),
    /// Parent directory and file stem.
    Name {
        parent: NormalizedPath,
        stem: String,
    },
    /// Assembled explicitly rather than detected.
    Manual,
}

impl std::fmt::Display for SetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Content(key) => write!(f, "{:016x}", key),
            Self::Name { parent, stem } => write!(f, "{}/{}.*", parent, stem),
            Self::Manual => write!(f, "manual"),
        }
    }
}
