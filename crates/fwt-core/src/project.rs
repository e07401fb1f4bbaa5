//! Projects and their per-run trash directory

use crate::resolver::{PathReference, PathResolver, ProjectIdentity, ResolveOptions};
use crate::store::{ProjectStore, RecordStore};
use crate::{Error, Result};
use chrono::Utc;
use fwt_fs::constants::RECORD_STORE_DIRS;
use fwt_fs::{NormalizedPath, TRASH_DIR};
use uuid::Uuid;

/// Session-scoped trash directory.
///
/// Everything removed or overwritten during a run lands here, laid out like
/// the project, so it can be restored by moving it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashDir {
    root: NormalizedPath,
}

impl TrashDir {
    /// A fresh session directory below `<project>/Trash`.
    ///
    /// Named `<UTC timestamp>-<8 hex>` so runs never share a directory. The
    /// directory itself is created on first use.
    pub fn session(project_root: &NormalizedPath) -> Self {
        let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
        let id = Uuid::new_v4().simple().to_string();
        let name = format!("{}-{}", stamp, &id[..8]);
        Self {
            root: project_root.join(TRASH_DIR).join(name),
        }
    }

    /// Use an explicit directory as the trash.
    pub fn at(root: impl Into<NormalizedPath>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// Trash location for `reference`, mirroring its position in the project.
    pub fn path_for(&self, reference: &PathReference) -> NormalizedPath {
        let relative = reference
            .project_relative()
            .filter(|p| !p.is_empty())
            .or(reference.data_relative())
            .cloned()
            .unwrap_or_else(|| NormalizedPath::new(reference.file_name().unwrap_or("unnamed")));
        self.root.join(relative.as_str())
    }
}

/// A project directory: manifest identity plus the trash for this run.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathReference,
    identity: ProjectIdentity,
    trash: TrashDir,
}

impl Project {
    /// Open the project containing `path`.
    pub fn open(resolver: &PathResolver, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let reference = resolver.resolve(path, ResolveOptions::project().existing())?;
        let enclosing = reference
            .project_root()
            .filter(|root| *root != reference.absolute())
            .map(NormalizedPath::to_native);
        let root = match enclosing {
            Some(dir) => resolver.resolve(dir, ResolveOptions::project())?,
            None => reference,
        };
        let identity = root.project().cloned().ok_or_else(|| Error::NotAProject {
            path: root.to_native(),
        })?;
        let trash = TrashDir::session(root.absolute());
        Ok(Self {
            root,
            identity,
            trash,
        })
    }

    /// Replace the session trash, e.g. to resume into an earlier one.
    pub fn with_trash(mut self, trash: TrashDir) -> Self {
        self.trash = trash;
        self
    }

    pub fn root(&self) -> &PathReference {
        &self.root
    }

    pub fn dir(&self) -> &NormalizedPath {
        self.root.absolute()
    }

    pub fn identity(&self) -> &ProjectIdentity {
        &self.identity
    }

    pub fn trash(&self) -> &TrashDir {
        &self.trash
    }

    /// Directories that never hold assets: the trash and record-store dirs.
    pub fn default_exclusions(&self) -> Vec<NormalizedPath> {
        let mut dirs = vec![self.dir().join(TRASH_DIR)];
        dirs.extend(RECORD_STORE_DIRS.iter().map(|d| self.dir().join(d)));
        dirs
    }

    /// All record stores of this project.
    pub fn record_stores(&self, resolver: &PathResolver) -> Result<Vec<RecordStore>> {
        ProjectStore::new(resolver).stores_at(self.dir().to_native())
    }
}
