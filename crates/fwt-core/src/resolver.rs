//! Path resolution against the data root
//!
//! A [`PathReference`] carries every view of a path the rest of the crate
//! needs: the absolute path, the path relative to the shared data root (the
//! form record stores use), and the path relative to the owning project.
//!
//! Paths that live outside the data root, typically because a project
//! directory is a symlink to another disk, are mapped back into the data
//! root through the project's manifest: `{kind}s/{name}/{remainder}`.

use crate::{Error, Result};
use fwt_fs::constants::{APP_CONFIG_FILE, DATA_DIR, MAX_ANCESTOR_DEPTH};
use fwt_fs::{NormalizedPath, ProjectKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The shared directory containing every project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRoot {
    path: NormalizedPath,
}

impl DataRoot {
    /// Use an explicitly configured data root.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = absolutize(path.as_ref())?;
        if !path.is_dir() {
            return Err(Error::DataRootNotFound {
                start: path.to_native(),
            });
        }
        Ok(Self { path })
    }

    /// Walk upward from `start` looking for the application config file.
    ///
    /// The data root is the `Data` directory next to `Config/options.json`.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let start = absolutize(start.as_ref())?;
        let mut current = Some(start.clone());
        let mut depth = 0;

        while let Some(dir) = current {
            if depth > MAX_ANCESTOR_DEPTH {
                break;
            }
            let data = dir.join(DATA_DIR);
            if dir.join(APP_CONFIG_FILE).is_file() && data.is_dir() {
                debug!("DataRoot::discover: found {} above {}", data, start);
                return Ok(Self { path: data });
            }
            current = dir.parent();
            depth += 1;
        }

        Err(Error::DataRootNotFound {
            start: start.to_native(),
        })
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }
}

/// Contents of a project manifest that the toolkit relies on.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectManifest {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Identity of the project owning a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    pub kind: ProjectKind,
    pub name: String,
    pub title: Option<String>,
    /// Absolute path of the directory holding the manifest.
    pub root: NormalizedPath,
}

impl ProjectIdentity {
    /// Find the nearest manifest at or above `start`.
    pub fn find(start: &NormalizedPath) -> Result<Option<Self>> {
        let mut current = Some(start.clone());
        let mut depth = 0;

        while let Some(dir) = current {
            if depth > MAX_ANCESTOR_DEPTH {
                break;
            }
            if let Some(kind) = ProjectKind::detect(&dir.to_native()) {
                return Self::load(&dir, kind).map(Some);
            }
            current = dir.parent();
            depth += 1;
        }
        Ok(None)
    }

    fn load(dir: &NormalizedPath, kind: ProjectKind) -> Result<Self> {
        let manifest_path = dir.join(kind.manifest_file()).to_native();
        let content = std::fs::read_to_string(&manifest_path)?;
        let manifest: ProjectManifest =
            serde_json::from_str(&content).map_err(|source| Error::ManifestParse {
                path: manifest_path.clone(),
                source,
            })?;

        let identity = Self {
            kind,
            name: manifest.name,
            title: manifest.title,
            root: dir.clone(),
        };
        if identity.name_mismatch() {
            warn!(
                "{} declares name {:?} but lives in directory {:?}",
                manifest_path.display(),
                identity.name,
                dir.file_name().unwrap_or_default()
            );
        }
        Ok(identity)
    }

    /// The manifest name differs from the directory holding it.
    pub fn name_mismatch(&self) -> bool {
        self.root.file_name() != Some(self.name.as_str())
    }

    /// Data-root-relative directory this project occupies by declaration.
    pub fn virtual_root(&self) -> NormalizedPath {
        NormalizedPath::new(self.kind.collection_dir()).join(&self.name)
    }
}

/// Constraints applied by [`PathResolver::resolve`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Fail with `NotAProject` when no manifest is found.
    pub require_project: bool,
    /// Fail with `PathNotFound` when the path does not exist.
    pub require_exists: bool,
    /// Tolerate a missing data-root view (reporting only).
    pub best_effort: bool,
}

impl ResolveOptions {
    pub fn project() -> Self {
        Self {
            require_project: true,
            ..Self::default()
        }
    }

    pub fn existing(mut self) -> Self {
        self.require_exists = true;
        self
    }

    pub fn best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }
}

/// A resolved path and its derived views.
///
/// Views are fixed at construction. After a file really moves, build a new
/// reference with [`PathReference::join`], [`PathReference::with_project_relative`]
/// or by resolving again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathReference {
    absolute: NormalizedPath,
    data_relative: Option<NormalizedPath>,
    project: Option<ProjectIdentity>,
    project_relative: Option<NormalizedPath>,
    /// Data-relative location of the project root.
    project_data_root: Option<NormalizedPath>,
}

impl PathReference {
    pub fn absolute(&self) -> &NormalizedPath {
        &self.absolute
    }

    pub fn data_relative(&self) -> Option<&NormalizedPath> {
        self.data_relative.as_ref()
    }

    pub fn project(&self) -> Option<&ProjectIdentity> {
        self.project.as_ref()
    }

    pub fn project_root(&self) -> Option<&NormalizedPath> {
        self.project.as_ref().map(|p| &p.root)
    }

    pub fn project_relative(&self) -> Option<&NormalizedPath> {
        self.project_relative.as_ref()
    }

    pub fn is_project_member(&self) -> bool {
        self.project.is_some()
    }

    pub fn exists(&self) -> bool {
        self.absolute.to_native().symlink_metadata().is_ok()
    }

    pub fn is_symlinked(&self) -> bool {
        self.absolute.is_symlinked()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.absolute.file_name()
    }

    pub fn to_native(&self) -> PathBuf {
        self.absolute.to_native()
    }

    /// Key used in rewrite queues: project-relative, else data-relative,
    /// else absolute.
    pub fn rewrite_key(&self) -> &NormalizedPath {
        self.project_relative
            .as_ref()
            .or(self.data_relative.as_ref())
            .unwrap_or(&self.absolute)
    }

    /// Derive a reference for a path below this one.
    pub fn join(&self, segment: &str) -> Self {
        Self {
            absolute: self.absolute.join(segment),
            data_relative: self.data_relative.as_ref().map(|p| p.join(segment)),
            project: self.project.clone(),
            project_relative: self.project_relative.as_ref().map(|p| p.join(segment)),
            project_data_root: self.project_data_root.clone(),
        }
    }

    /// Derive a reference to another path in the same project.
    ///
    /// Returns `None` for references that are not project members.
    pub fn with_project_relative(&self, relative: &NormalizedPath) -> Option<Self> {
        let project = self.project.as_ref()?;
        Some(Self {
            absolute: project.root.join(relative.as_str()),
            data_relative: self
                .project_data_root
                .as_ref()
                .map(|root| root.join(relative.as_str())),
            project: self.project.clone(),
            project_relative: Some(relative.clone()),
            project_data_root: self.project_data_root.clone(),
        })
    }

    /// Derive a reference with a different file name in the same directory.
    pub fn with_file_name(&self, name: &str) -> Self {
        Self {
            absolute: self.absolute.with_file_name(name),
            data_relative: self.data_relative.as_ref().map(|p| p.with_file_name(name)),
            project: self.project.clone(),
            project_relative: self.project_relative.as_ref().map(|p| p.with_file_name(name)),
            project_data_root: self.project_data_root.clone(),
        }
    }
}

impl std::fmt::Display for PathReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.absolute)
    }
}

/// Resolves raw paths into [`PathReference`]s against one data root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    data_root: DataRoot,
}

impl PathResolver {
    pub fn new(data_root: DataRoot) -> Self {
        Self { data_root }
    }

    pub fn data_root(&self) -> &DataRoot {
        &self.data_root
    }

    /// Resolve `raw` into a reference with all views computed.
    pub fn resolve(&self, raw: impl AsRef<Path>, opts: ResolveOptions) -> Result<PathReference> {
        let absolute = absolutize(raw.as_ref())?;
        let project = ProjectIdentity::find(&absolute)?;

        if opts.require_project && project.is_none() {
            return Err(Error::NotAProject {
                path: absolute.to_native(),
            });
        }
        if opts.require_exists && absolute.to_native().symlink_metadata().is_err() {
            return Err(Error::PathNotFound {
                path: absolute.to_native(),
            });
        }

        let root = self.data_root.path();
        let (data_relative, project_data_root) = match absolute.strip_prefix(root) {
            Some(relative) => {
                let project_data_root = project
                    .as_ref()
                    .and_then(|p| p.root.strip_prefix(root))
                    .or_else(|| project.as_ref().map(ProjectIdentity::virtual_root));
                (Some(relative), project_data_root)
            }
            None => match &project {
                Some(p) => {
                    let remainder = absolute.strip_prefix(&p.root).unwrap_or_default();
                    let virtual_root = p.virtual_root();
                    debug!(
                        "resolve: {} is outside {}, mapped to {}",
                        absolute,
                        root,
                        virtual_root.join(remainder.as_str())
                    );
                    (Some(virtual_root.join(remainder.as_str())), Some(virtual_root))
                }
                None if opts.best_effort => (None, None),
                None => {
                    return Err(Error::OutsideDataRoot {
                        path: absolute.to_native(),
                        data_root: root.to_native(),
                    });
                }
            },
        };

        let project_relative = project
            .as_ref()
            .and_then(|p| absolute.strip_prefix(&p.root));

        Ok(PathReference {
            absolute,
            data_relative,
            project,
            project_relative,
            project_data_root,
        })
    }
}

/// Absolute, lexically normalized form of `path`.
pub fn absolutize(path: &Path) -> Result<NormalizedPath> {
    if path.is_absolute() {
        return Ok(NormalizedPath::new(path));
    }
    let cwd = std::env::current_dir()?;
    Ok(NormalizedPath::new(cwd.join(path)))
}
