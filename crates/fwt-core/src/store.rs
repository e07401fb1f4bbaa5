//! Record stores: line-oriented JSON files referencing assets by path

use crate::resolver::{PathReference, PathResolver, ResolveOptions, absolutize};
use crate::{Error, Result};
use fwt_fs::constants::RECORD_STORE_DIRS;
use fwt_fs::{NormalizedPath, ProjectKind, RECORD_STORE_EXTENSION};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Where a record store was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreCategory {
    /// `<project>/data/*.db`
    Data,
    /// `<project>/packs/*.db`
    Packs,
    /// Addressed directly by the caller.
    Direct,
}

impl StoreCategory {
    fn from_dir_name(name: Option<&str>) -> Self {
        match name {
            Some("data") => Self::Data,
            Some("packs") => Self::Packs,
            _ => Self::Direct,
        }
    }
}

/// A single record-store file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore {
    pub category: StoreCategory,
    pub path: PathReference,
}

impl RecordStore {
    /// Store name: the file stem (`actors` for `actors.db`).
    pub fn name(&self) -> &str {
        self.path.absolute().file_stem().unwrap_or_default()
    }

    /// Parse every non-blank line as a JSON record.
    pub fn records(&self) -> Result<Vec<Value>> {
        let content = fs::read_to_string(self.path.to_native())?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }

    /// Records (at any depth) whose `_id` equals `id`; `*` matches any id.
    pub fn find_by_id(&self, id: &str) -> Result<Vec<Value>> {
        let records = self.records()?;
        let mut found = Vec::new();
        for record in &records {
            collect_by_key(record, "_id", id, &mut found);
        }
        Ok(found.into_iter().cloned().collect())
    }
}

/// Walk `value` collecting objects whose `key` equals `wanted` (or any, for `*`).
///
/// A matching object is collected whole and not searched further.
fn collect_by_key<'a>(value: &'a Value, key: &str, wanted: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            let hit = map
                .get(key)
                .is_some_and(|v| wanted == "*" || v.as_str() == Some(wanted));
            if hit {
                out.push(value);
            } else {
                for child in map.values() {
                    collect_by_key(child, key, wanted, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_by_key(item, key, wanted, out);
            }
        }
        _ => {}
    }
}

/// Enumerates record stores for a project, directory or single file.
pub struct ProjectStore<'a> {
    resolver: &'a PathResolver,
}

impl<'a> ProjectStore<'a> {
    pub fn new(resolver: &'a PathResolver) -> Self {
        Self { resolver }
    }

    /// Record stores addressed by `path`.
    ///
    /// - project root: every `*.db` in `data/` and `packs/`
    /// - directory: every `*.db` in it
    /// - `*.db` file: that file
    pub fn stores_at(&self, path: impl AsRef<Path>) -> Result<Vec<RecordStore>> {
        let path = absolutize(path.as_ref())?;
        let native = path.to_native();

        let stores = if ProjectKind::detect(&native).is_some() {
            let mut stores = Vec::new();
            for dir in RECORD_STORE_DIRS {
                let dir = path.join(dir);
                if dir.is_dir() {
                    stores.extend(self.stores_in_dir(&dir)?);
                }
            }
            stores
        } else if native.is_dir() {
            self.stores_in_dir(&path)?
        } else if native.is_file() && path.extension() == Some(RECORD_STORE_EXTENSION) {
            vec![RecordStore {
                category: StoreCategory::Direct,
                path: self.resolve(&path)?,
            }]
        } else {
            return Err(Error::InvalidRecordStorePath { path: native });
        };

        debug!("stores_at({}): {} record stores", path, stores.len());
        Ok(stores)
    }

    /// Record stores at `path`, grouped by category.
    pub fn grouped(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<BTreeMap<StoreCategory, Vec<RecordStore>>> {
        let mut groups: BTreeMap<StoreCategory, Vec<RecordStore>> = BTreeMap::new();
        for store in self.stores_at(path)? {
            groups.entry(store.category).or_default().push(store);
        }
        Ok(groups)
    }

    fn stores_in_dir(&self, dir: &NormalizedPath) -> Result<Vec<RecordStore>> {
        let category = StoreCategory::from_dir_name(dir.file_name());
        let mut files: Vec<NormalizedPath> = fs::read_dir(dir.to_native())?
            .filter_map(|entry| entry.ok())
            .map(|entry| NormalizedPath::new(entry.path()))
            .filter(|p| p.extension() == Some(RECORD_STORE_EXTENSION) && p.is_file())
            .collect();
        files.sort();

        files
            .iter()
            .map(|file| {
                Ok(RecordStore {
                    category,
                    path: self.resolve(file)?,
                })
            })
            .collect()
    }

    fn resolve(&self, path: &NormalizedPath) -> Result<PathReference> {
        self.resolver
            .resolve(path.to_native(), ResolveOptions::default().best_effort())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collect_by_key_finds_nested_ids() {
        let record = json!({
            "_id": "actor1",
            "items": [{"_id": "item1", "img": "a.png"}, {"_id": "item2"}]
        });
        let mut found = Vec::new();
        collect_by_key(&record, "_id", "item2", &mut found);
        assert_eq!(found, vec![&json!({"_id": "item2"})]);
    }

    #[test]
    fn wildcard_matches_outermost_objects() {
        let record = json!({"_id": "actor1", "items": [{"_id": "item1"}]});
        let mut found = Vec::new();
        collect_by_key(&record, "_id", "*", &mut found);
        assert_eq!(found.len(), 1);
    }
}
