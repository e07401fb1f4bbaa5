//! Ordered old-path to new-path mapping

use crate::resolver::PathReference;
use fwt_fs::NormalizedPath;
use std::collections::HashSet;
use tracing::{debug, warn};

/// One queued path change.
///
/// `old`/`new` are project-relative when both paths belong to the same
/// project. The data-relative forms are what record stores usually contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteEntry {
    pub old: NormalizedPath,
    pub new: NormalizedPath,
    pub old_data: Option<NormalizedPath>,
    pub new_data: Option<NormalizedPath>,
}

impl RewriteEntry {
    /// Every (old, new) string pair this entry substitutes.
    pub fn forms(&self) -> impl Iterator<Item = (&str, &str)> {
        let data = match (&self.old_data, &self.new_data) {
            (Some(old), Some(new)) => Some((old.as_str(), new.as_str())),
            _ => None,
        };
        std::iter::once((self.old.as_str(), self.new.as_str())).chain(data)
    }
}

/// Old paths mapped to new ones, unique by old path, in insertion order.
///
/// The first mapping recorded for a path wins; later ones are ignored.
#[derive(Debug, Clone, Default)]
pub struct RewriteQueue {
    entries: Vec<RewriteEntry>,
    keys: HashSet<NormalizedPath>,
}

impl RewriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `old -> new`. Returns `false` when nothing was added.
    pub fn push(&mut self, old: &PathReference, new: &PathReference) -> bool {
        let same_project = old.project_root().is_some() && old.project_root() == new.project_root();
        let (old_key, new_key) = if same_project {
            (old.rewrite_key().clone(), new.rewrite_key().clone())
        } else {
            match (old.data_relative(), new.data_relative()) {
                (Some(o), Some(n)) => (o.clone(), n.clone()),
                _ => (old.absolute().clone(), new.absolute().clone()),
            }
        };

        if old_key == new_key {
            return false;
        }
        if self.keys.contains(&old_key) {
            warn!(
                "rewrite queue: ignoring {} -> {}, {} is already mapped",
                old_key, new_key, old_key
            );
            return false;
        }

        let (old_data, new_data) = match (old.data_relative(), new.data_relative()) {
            (Some(o), Some(n)) if *o != old_key && o != n => (Some(o.clone()), Some(n.clone())),
            _ => (None, None),
        };

        debug!("rewrite queue: {} -> {}", old_key, new_key);
        self.keys.insert(old_key.clone());
        self.entries.push(RewriteEntry {
            old: old_key,
            new: new_key,
            old_data,
            new_data,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RewriteEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RewriteEntry> {
        self.entries.iter()
    }

    /// All (old, new) string pairs across entries, each old string once.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        let mut pairs = Vec::new();
        for (old, new) in self.entries.iter().flat_map(RewriteEntry::forms) {
            if seen.insert(old) {
                pairs.push((old.to_string(), new.to_string()));
            }
        }
        pairs
    }
}

impl<'a> IntoIterator for &'a RewriteQueue {
    type Item = &'a RewriteEntry;
    type IntoIter = std::slice::Iter<'a, RewriteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
