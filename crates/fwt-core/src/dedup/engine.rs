//! Grouping scanned files into duplicate sets

use super::{DetectionMode, DuplicateSet, SetKey};
use crate::entity::FileEntity;
use crate::resolver::PathReference;
use crate::scan::{ScanPipeline, ScanReport};
use crate::{Error, Result};
use fwt_fs::checksum::{self, KeyFn};
use fwt_fs::NormalizedPath;
use std::collections::HashMap;
use tracing::{debug, info};

/// Maximum number of consecutive keys tried for one file before giving up.
pub const MAX_PROBES: usize = 1024;

/// Collects files into buckets keyed by [`SetKey`].
///
/// In content mode the key only nominates a bucket: membership is confirmed
/// by comparing bytes with the bucket's first file. A file that differs
/// probes the next key (open addressing), so two different contents never
/// share a set even when their keys collide.
pub struct DuplicateSetEngine {
    mode: DetectionMode,
    key_fn: KeyFn,
    buckets: Vec<(SetKey, Vec<PathReference>)>,
    index: HashMap<SetKey, usize>,
    files: usize,
}

impl DuplicateSetEngine {
    pub fn new(mode: DetectionMode) -> Self {
        Self {
            mode,
            key_fn: checksum::sha256_key,
            buckets: Vec::new(),
            index: HashMap::new(),
            files: 0,
        }
    }

    /// Replace the content key function.
    pub fn with_key_fn(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = key_fn;
        self
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    /// Files added so far.
    pub fn files(&self) -> usize {
        self.files
    }

    /// Add every file yielded by `pipeline`.
    pub fn scan(&mut self, pipeline: &ScanPipeline) -> Result<ScanReport> {
        let report = pipeline.run(|reference| self.add(reference))?;
        info!(
            "scanned {} files by {}, {} candidate groups",
            report.files,
            self.mode,
            self.buckets.iter().filter(|(_, m)| m.len() > 1).count()
        );
        Ok(report)
    }

    /// Place one file into its bucket.
    pub fn add(&mut self, reference: PathReference) -> Result<()> {
        let key = match self.mode {
            DetectionMode::Content => self.content_key(&reference)?,
            DetectionMode::Name => name_key(&reference),
        };
        self.insert(key, reference);
        self.files += 1;
        Ok(())
    }

    fn content_key(&self, reference: &PathReference) -> Result<SetKey> {
        let native = reference.to_native();
        let mut key = checksum::prefix_key(&native, self.key_fn)?;

        for probe in 0..MAX_PROBES {
            let Some(&slot) = self.index.get(&SetKey::Content(key)) else {
                return Ok(SetKey::Content(key));
            };
            let head = &self.buckets[slot].1[0];
            if checksum::files_identical(&head.to_native(), &native)? {
                return Ok(SetKey::Content(key));
            }
            debug!(
                "content_key: {} collides with {} at {:016x} (probe {})",
                reference, head, key, probe
            );
            key = key.wrapping_add(1);
        }

        Err(Error::ProbeLimitExceeded {
            path: native,
            probes: MAX_PROBES,
        })
    }

    fn insert(&mut self, key: SetKey, reference: PathReference) {
        match self.index.get(&key) {
            Some(&slot) => self.buckets[slot].1.push(reference),
            None => {
                self.index.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![reference]));
            }
        }
    }

    /// Finish grouping. Buckets with fewer than two files are dropped; sets
    /// come out in first-seen order.
    pub fn into_sets(self) -> Vec<DuplicateSet> {
        let sets: Vec<DuplicateSet> = self
            .buckets
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(key, members)| {
                DuplicateSet::new(key, members.into_iter().map(FileEntity::new).collect())
            })
            .collect();
        debug!("into_sets: {} duplicate sets", sets.len());
        sets
    }
}

fn name_key(reference: &PathReference) -> SetKey {
    let absolute = reference.absolute();
    SetKey::Name {
        parent: absolute.parent().unwrap_or_else(NormalizedPath::empty),
        stem: absolute
            .file_stem()
            .or(absolute.file_name())
            .unwrap_or_default()
            .to_string(),
    }
}
