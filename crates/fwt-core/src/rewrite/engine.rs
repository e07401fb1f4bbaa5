//! Crash-safe substitution of paths inside record stores
//!
//! Each store is rewritten into a temporary file next to it. Only when at
//! least one line changed is the original moved into the session trash and
//! the temporary file persisted in its place; at every point one complete
//! copy of the store exists on disk.

use super::RewriteQueue;
use crate::project::TrashDir;
use crate::resolver::PathReference;
use crate::store::RecordStore;
use crate::{Error, Result};
use fwt_fs::{NormalizedPath, io};
use regex::bytes::{Captures, Regex, RegexBuilder};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Options for [`RewriteEngine`].
#[derive(Debug, Clone, Copy)]
pub struct RewriteOptions {
    /// Only replace complete quoted values (`"img/a.png"`).
    pub whole_value: bool,
    /// Replace an existing backup in the trash instead of picking a new name.
    pub overwrite_backups: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            whole_value: true,
            overwrite_backups: false,
        }
    }
}

/// Result of rewriting one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The store was replaced; the original sits at `backup`.
    Rewritten {
        lines_changed: usize,
        backup: NormalizedPath,
    },
    /// Nothing matched; the store was not touched.
    Unchanged,
}

/// Summary of a batch rewrite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Stores that were replaced, with their changed-line counts.
    pub rewritten: Vec<(NormalizedPath, usize)>,
    /// Stores left as they were.
    pub unchanged: Vec<NormalizedPath>,
}

impl RewriteReport {
    pub fn lines_changed(&self) -> usize {
        self.rewritten.iter().map(|(_, n)| n).sum()
    }
}

/// Compiled single-pass substitution over all queued keys.
struct Substitution {
    regex: Regex,
    replacements: HashMap<Vec<u8>, Vec<u8>>,
    quoted: bool,
}

impl Substitution {
    fn new(pairs: Vec<(String, String)>, quoted: bool) -> Result<Option<Self>> {
        if pairs.is_empty() {
            return Ok(None);
        }
        let mut keys: Vec<&str> = pairs.iter().map(|(old, _)| old.as_str()).collect();
        // Longest first so that the alternation prefers the longest key at
        // any position.
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternation = keys
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = if quoted {
            format!("\"({})\"", alternation)
        } else {
            format!("({})", alternation)
        };
        let regex = RegexBuilder::new(&pattern)
            .size_limit(256 * (1 << 20))
            .build()
            .map_err(|e| Error::pattern(&pattern, e))?;

        let replacements = pairs
            .into_iter()
            .map(|(old, new)| (old.into_bytes(), new.into_bytes()))
            .collect();
        Ok(Some(Self {
            regex,
            replacements,
            quoted,
        }))
    }

    /// Substitute within one line. `None` when nothing matched.
    fn apply(&self, line: &[u8]) -> Option<Vec<u8>> {
        if !self.regex.is_match(line) {
            return None;
        }
        let replaced = self.regex.replace_all(line, |caps: &Captures<'_>| {
            let old = &caps[1];
            let new = self
                .replacements
                .get(old)
                .map(Vec::as_slice)
                .unwrap_or(old);
            if self.quoted {
                let mut out = Vec::with_capacity(new.len() + 2);
                out.push(b'"');
                out.extend_from_slice(new);
                out.push(b'"');
                out
            } else {
                new.to_vec()
            }
        });
        if replaced.as_ref() == line {
            return None;
        }
        Some(replaced.into_owned())
    }
}

/// Applies a [`RewriteQueue`] to record stores.
pub struct RewriteEngine {
    substitution: Option<Substitution>,
    trash: TrashDir,
    options: RewriteOptions,
}

impl RewriteEngine {
    /// Compile `queue`. Originals of rewritten stores go to `trash`.
    pub fn new(queue: &RewriteQueue, trash: TrashDir, options: RewriteOptions) -> Result<Self> {
        Ok(Self {
            substitution: Substitution::new(queue.pairs(), options.whole_value)?,
            trash,
            options,
        })
    }

    pub fn options(&self) -> RewriteOptions {
        self.options
    }

    /// Substitute within a single line; `None` when nothing matched.
    pub fn rewrite_line(&self, line: &[u8]) -> Option<Vec<u8>> {
        self.substitution.as_ref()?.apply(line)
    }

    /// Rewrite every store, stopping at the first failure.
    pub fn apply(&self, stores: &[RecordStore]) -> Result<RewriteReport> {
        let mut report = RewriteReport::default();
        for store in stores {
            match self.rewrite_file(&store.path)? {
                RewriteOutcome::Rewritten { lines_changed, .. } => report
                    .rewritten
                    .push((store.path.absolute().clone(), lines_changed)),
                RewriteOutcome::Unchanged => report.unchanged.push(store.path.absolute().clone()),
            }
        }
        info!(
            "rewrote {} record stores ({} lines), {} unchanged",
            report.rewritten.len(),
            report.lines_changed(),
            report.unchanged.len()
        );
        Ok(report)
    }

    /// Rewrite one store in place.
    pub fn rewrite_file(&self, store: &PathReference) -> Result<RewriteOutcome> {
        let native = store.to_native();
        let missing = || Error::RewriteTargetMissing {
            path: native.clone(),
        };
        if !native.is_file() {
            return Err(missing());
        }
        let Some(substitution) = &self.substitution else {
            return Ok(RewriteOutcome::Unchanged);
        };

        let source = match File::open(&native) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(missing()),
            Err(e) => return Err(e.into()),
        };
        let dir = native.parent().ok_or_else(missing)?;
        let temp = tempfile::Builder::new()
            .prefix(".fwt-")
            .suffix(".tmp")
            .tempfile_in(dir)?;

        let mut reader = BufReader::new(source);
        let mut writer = BufWriter::new(temp.as_file());
        let mut line = Vec::new();
        let mut lines_changed = 0;
        let mut written = 0;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            match substitution.apply(&line) {
                Some(new_line) => {
                    lines_changed += 1;
                    writer.write_all(&new_line)?;
                    written += new_line.len();
                }
                None => {
                    writer.write_all(&line)?;
                    written += line.len();
                }
            }
        }
        writer.flush()?;
        drop(writer);

        if written == 0 || lines_changed == 0 {
            debug!("rewrite_file: {} unchanged", store);
            return Ok(RewriteOutcome::Unchanged);
        }
        temp.as_file().sync_all()?;

        let backup = self.backup_path(store)?;
        io::move_no_clobber(store.absolute(), &backup)?;

        if let Err(e) = temp.persist_noclobber(&native) {
            warn!(
                "rewrite_file: could not replace {}, restoring original: {}",
                store, e.error
            );
            io::move_no_clobber(&backup, store.absolute())?;
            return Err(e.error.into());
        }
        carry_security(&backup.to_native(), &native);

        debug!(
            "rewrite_file: {} ({} lines), original at {}",
            store, lines_changed, backup
        );
        Ok(RewriteOutcome::Rewritten {
            lines_changed,
            backup,
        })
    }

    fn backup_path(&self, store: &PathReference) -> Result<NormalizedPath> {
        let target = self.trash.path_for(store);
        if !self.options.overwrite_backups {
            return Ok(io::unique_path(&target));
        }
        if target.is_file() {
            io::remove_file(&target)?;
        }
        Ok(target)
    }
}

/// Give the rewritten store its original's owner and mode. The store is
/// already in place, so a failure here is only logged.
fn carry_security(original: &Path, store: &Path) {
    if let Err(e) = io::copy_security(original, store) {
        warn!(
            "rewrite_file: {} rewritten but its permissions were not carried over: {}",
            store.display(),
            e
        );
    }
}
