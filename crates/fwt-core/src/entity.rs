//! A single asset file and its pending mutation

use crate::project::TrashDir;
use crate::resolver::PathReference;
use crate::{Error, Result};
use fwt_fs::{NormalizedPath, io};
use tracing::debug;

/// How a file leaves the project when trashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrashAction {
    /// Move into the session trash at this absolute path.
    MoveTo(NormalizedPath),
    /// Delete permanently.
    Delete,
}

/// One physical file and at most one pending destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntity {
    path: PathReference,
    new_path: Option<PathReference>,
    trash: Option<TrashAction>,
    keep_source: bool,
    locked: bool,
    retired: bool,
}

impl FileEntity {
    pub fn new(path: PathReference) -> Self {
        Self {
            path,
            new_path: None,
            trash: None,
            keep_source: false,
            locked: false,
            retired: false,
        }
    }

    pub fn path(&self) -> &PathReference {
        &self.path
    }

    pub fn new_path(&self) -> Option<&PathReference> {
        self.new_path.as_ref()
    }

    /// Where references to this file should point once all operations ran.
    pub fn final_path(&self) -> &PathReference {
        self.new_path.as_ref().unwrap_or(&self.path)
    }

    pub fn trash_action(&self) -> Option<&TrashAction> {
        self.trash.as_ref()
    }

    pub fn keep_source(&self) -> bool {
        self.keep_source
    }

    pub fn set_keep_source(&mut self, keep: bool) {
        self.keep_source = keep;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Pin the file: it can no longer be given a destination or trashed.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.retired {
            return Err(Error::EntityRetired {
                path: self.path.to_native(),
            });
        }
        if self.locked {
            return Err(Error::EntityLocked {
                path: self.path.to_native(),
            });
        }
        Ok(())
    }

    /// Queue a move or copy to `target`.
    ///
    /// Returns `Ok(false)` when `target` is the current path. An existing
    /// directory target means "into this directory, same file name". Any
    /// other existing target is rejected, unless it is the current file under
    /// another spelling (case-only renames).
    pub fn set_new_path(&mut self, target: PathReference) -> Result<bool> {
        self.ensure_mutable()?;
        if target.absolute() == self.path.absolute() {
            return Ok(false);
        }

        let target = if target.absolute().is_dir() {
            match self.path.file_name() {
                Some(name) => target.join(name),
                None => target,
            }
        } else {
            target
        };
        if target.absolute() == self.path.absolute() {
            return Ok(false);
        }

        if target.exists() && !io::is_case_rename(self.path.absolute(), target.absolute()) {
            return Err(Error::TargetExists {
                path: target.to_native(),
            });
        }

        debug!("set_new_path: {} -> {}", self.path, target);
        self.new_path = Some(target);
        Ok(true)
    }

    /// Drop any queued destination.
    pub fn clear_new_path(&mut self) {
        self.new_path = None;
    }

    /// Queue the file for the trash at `trash_path`, or for deletion with `None`.
    pub fn set_trash_path(&mut self, trash_path: Option<NormalizedPath>) -> Result<()> {
        self.ensure_mutable()?;
        self.trash = Some(match trash_path {
            Some(path) => TrashAction::MoveTo(path),
            None => TrashAction::Delete,
        });
        Ok(())
    }

    /// Queue the file for `trash`, mirroring its project-relative path.
    pub fn set_trash(&mut self, trash: Option<&TrashDir>) -> Result<()> {
        let target = trash.map(|t| t.path_for(&self.path));
        self.set_trash_path(target)
    }

    /// Perform the queued move. Returns `Ok(false)` when nothing is queued.
    pub fn rename(&mut self) -> Result<bool> {
        if self.keep_source {
            return self.copy();
        }
        if self.retired {
            return Err(Error::EntityRetired {
                path: self.path.to_native(),
            });
        }
        let Some(target) = self.new_path.take() else {
            return Ok(false);
        };

        if let Err(e) = io::move_no_clobber(self.path.absolute(), target.absolute()) {
            self.new_path = Some(target);
            return Err(e.into());
        }
        debug!("rename: completed {} -> {}", self.path, target);
        self.path = target;
        Ok(true)
    }

    /// Copy to the queued destination; the entity then tracks the copy.
    ///
    /// The source file is left in place.
    pub fn copy(&mut self) -> Result<bool> {
        if self.retired {
            return Err(Error::EntityRetired {
                path: self.path.to_native(),
            });
        }
        let Some(target) = self.new_path.take() else {
            return Ok(false);
        };

        if let Err(e) = io::copy_no_clobber(self.path.absolute(), target.absolute()) {
            self.new_path = Some(target);
            return Err(e.into());
        }
        debug!("copy: completed {} -> {}", self.path, target);
        self.path = target;
        Ok(true)
    }

    /// Move the file into the trash or delete it. Terminal.
    ///
    /// Returns `Ok(false)` when the file was never queued for trashing.
    pub fn trash(&mut self) -> Result<bool> {
        self.ensure_mutable()?;
        let Some(action) = self.trash.clone() else {
            return Ok(false);
        };

        match &action {
            TrashAction::MoveTo(target) => {
                io::move_no_clobber(self.path.absolute(), target)?;
                debug!("trash: moved {} -> {}", self.path, target);
            }
            TrashAction::Delete => {
                io::remove_file(self.path.absolute())?;
                debug!("trash: deleted {}", self.path);
            }
        }
        self.trash = None;
        self.new_path = None;
        self.retired = true;
        Ok(true)
    }
}

impl std::fmt::Display for FileEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.new_path {
            Some(new_path) => write!(f, "{} -> {}", self.path, new_path),
            None => write!(f, "{}", self.path),
        }
    }
}
