//! Duplicate sets and preferred-member selection

use super::SetKey;
use crate::entity::FileEntity;
use crate::names::NameRules;
use crate::project::TrashDir;
use crate::resolver::PathReference;
use crate::{Error, Result};
use fwt_fs::NormalizedPath;
use regex::Regex;
use tracing::{debug, warn};

/// Token in a preference pattern replaced by the escaped project root.
pub const PROJECT_DIR_PLACEHOLDER: &str = "<project_dir>";

/// Preference patterns compiled for one project, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct PreferredPatterns {
    patterns: Vec<Regex>,
}

impl PreferredPatterns {
    /// Compile `patterns`, substituting [`PROJECT_DIR_PLACEHOLDER`] with the
    /// regex-escaped `project_root`.
    pub fn compile<S: AsRef<str>>(patterns: &[S], project_root: &NormalizedPath) -> Result<Self> {
        let escaped = regex::escape(project_root.as_str());
        let patterns = patterns
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                let pattern = raw.replace(PROJECT_DIR_PLACEHOLDER, &escaped);
                Regex::new(&pattern).map_err(|e| Error::pattern(raw, e))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Index of the member chosen by the first pattern that matches any
    /// member.
    fn select(&self, members: &[FileEntity]) -> Option<(usize, &Regex)> {
        self.patterns.iter().find_map(|pattern| {
            members
                .iter()
                .position(|m| pattern.is_match(m.path().absolute().as_str()))
                .map(|i| (i, pattern))
        })
    }
}

/// Files that represent the same asset.
#[derive(Debug, Clone)]
pub struct DuplicateSet {
    key: SetKey,
    members: Vec<FileEntity>,
    preferred: Option<usize>,
}

impl DuplicateSet {
    pub fn new(key: SetKey, members: Vec<FileEntity>) -> Self {
        Self {
            key,
            members,
            preferred: None,
        }
    }

    pub fn key(&self) -> &SetKey {
        &self.key
    }

    pub fn members(&self) -> &[FileEntity] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [FileEntity] {
        &mut self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn preferred_index(&self) -> Option<usize> {
        self.preferred
    }

    pub fn preferred(&self) -> Option<&FileEntity> {
        self.preferred.map(|i| &self.members[i])
    }

    pub fn preferred_mut(&mut self) -> Option<&mut FileEntity> {
        self.preferred.map(|i| &mut self.members[i])
    }

    /// Members other than the preferred one.
    pub fn duplicates(&self) -> impl Iterator<Item = &FileEntity> {
        let preferred = self.preferred;
        self.members
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != preferred)
            .map(|(_, m)| m)
    }

    /// Choose the preferred member: first pattern match, else the first
    /// member. A set that already has a preferred member keeps it.
    pub fn select_preferred(&mut self, patterns: &PreferredPatterns) -> Option<usize> {
        if self.preferred.is_some() || self.members.is_empty() {
            return self.preferred;
        }
        let index = match patterns.select(&self.members) {
            Some((i, pattern)) => {
                debug!(
                    "select_preferred: {} matched {}",
                    self.members[i].path(),
                    pattern
                );
                i
            }
            None => 0,
        };
        self.preferred = Some(index);
        self.preferred
    }

    /// Force the member at `index` to be preferred.
    pub fn set_preferred(&mut self, index: usize) -> bool {
        if index >= self.members.len() {
            return false;
        }
        self.preferred = Some(index);
        true
    }

    /// Relocate the preferred member according to `rules`.
    ///
    /// An occupied destination leaves the preferred file in place.
    pub fn relocate_preferred(&mut self, rules: &NameRules) -> Result<bool> {
        if rules.is_empty() {
            return Ok(false);
        }
        let Some(preferred) = self.preferred_mut() else {
            return Ok(false);
        };
        let Some(relative) = preferred.path().project_relative() else {
            return Ok(false);
        };
        let renamed = rules.apply(relative);
        if &renamed == relative {
            return Ok(false);
        }
        let Some(target) = preferred.path().with_project_relative(&renamed) else {
            return Ok(false);
        };
        match preferred.set_new_path(target) {
            Ok(changed) => Ok(changed),
            Err(Error::TargetExists { path }) => {
                warn!(
                    "relocate_preferred: {} not renamed, {} already exists",
                    preferred.path(),
                    path.display()
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Queue every non-preferred member for `trash` (deletion with `None`).
    pub fn assign_trash(&mut self, trash: Option<&TrashDir>) -> Result<()> {
        let preferred = self.preferred;
        for (i, member) in self.members.iter_mut().enumerate() {
            if Some(i) != preferred {
                member.set_trash(trash)?;
            }
        }
        Ok(())
    }

    /// Rewrites implied by this set: every duplicate points at the
    /// preferred file's final location, and a relocated preferred file
    /// points at its new location.
    pub fn rewrite_entries(&self) -> Vec<(PathReference, PathReference)> {
        let Some(preferred) = self.preferred() else {
            return Vec::new();
        };
        let target = preferred.final_path();
        let mut entries = Vec::with_capacity(self.members.len());
        if preferred.new_path().is_some() {
            entries.push((preferred.path().clone(), target.clone()));
        }
        entries.extend(
            self.duplicates()
                .map(|member| (member.path().clone(), target.clone())),
        );
        entries
    }
}

impl std::fmt::Display for DuplicateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "set {} ({} files)", self.key, self.members.len())?;
        for (i, member) in self.members.iter().enumerate() {
            let marker = if Some(i) == self.preferred { "*" } else { " " };
            writeln!(f, "  {} {}", marker, member)?;
        }
        Ok(())
    }
}
