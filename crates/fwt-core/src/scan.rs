//! Directory scanning with composable include/exclude filters
//!
//! Directory filters decide whether the walk descends; file filters decide
//! whether a file is yielded. In both lists the first matching filter wins.
//! Unmatched directories are descended. Unmatched files are yielded only
//! when no include filter exists.

use crate::project::Project;
use crate::resolver::PathReference;
use crate::{Error, Result};
use fwt_fs::NormalizedPath;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterAction {
    Include,
    Exclude,
}

/// What a filter tests.
pub enum PathMatcher {
    /// File extensions, compared case-insensitively without the dot.
    Extensions(Vec<String>),
    /// Globs over the path relative to the scan root.
    Glob(GlobSet),
    /// Absolute path prefix (component-wise).
    Prefix(NormalizedPath),
    /// Arbitrary test on the absolute path.
    Predicate(Box<dyn Fn(&NormalizedPath) -> bool + Send + Sync>),
}

impl PathMatcher {
    pub fn extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Extensions(
            extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        )
    }

    pub fn globs<I, S>(globs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for glob in globs {
            let glob = glob.as_ref();
            builder.add(Glob::new(glob).map_err(|source| Error::InvalidGlob {
                glob: glob.to_string(),
                source,
            })?);
        }
        let set = builder.build().map_err(|source| Error::InvalidGlob {
            glob: String::new(),
            source,
        })?;
        Ok(Self::Glob(set))
    }

    pub fn prefix(path: impl Into<NormalizedPath>) -> Self {
        Self::Prefix(path.into())
    }

    pub fn predicate(f: impl Fn(&NormalizedPath) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Box::new(f))
    }

    fn matches(&self, absolute: &NormalizedPath, relative: &NormalizedPath) -> bool {
        match self {
            Self::Extensions(exts) => absolute
                .extension()
                .is_some_and(|ext| exts.iter().any(|e| e.eq_ignore_ascii_case(ext))),
            Self::Glob(set) => set.is_match(relative.as_str()),
            Self::Prefix(prefix) => absolute.starts_with(prefix),
            Self::Predicate(f) => f(absolute),
        }
    }
}

impl std::fmt::Debug for PathMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extensions(exts) => f.debug_tuple("Extensions").field(exts).finish(),
            Self::Glob(set) => write!(f, "Glob({} patterns)", set.len()),
            Self::Prefix(p) => f.debug_tuple("Prefix").field(p).finish(),
            Self::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}

#[derive(Debug)]
struct Filter {
    matcher: PathMatcher,
    action: FilterAction,
}

fn decide(filters: &[Filter], absolute: &NormalizedPath, relative: &NormalizedPath) -> Option<FilterAction> {
    filters
        .iter()
        .find(|f| f.matcher.matches(absolute, relative))
        .map(|f| f.action)
}

/// Totals from one walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Files yielded and processed.
    pub files: usize,
    /// Entries skipped because they could not be read.
    pub skipped: usize,
    /// Yielded files per lowercase extension (`""` for none).
    pub types: BTreeMap<String, usize>,
}

/// A reusable scan definition over one root directory.
#[derive(Debug)]
pub struct ScanPipeline {
    root: PathReference,
    dir_filters: Vec<Filter>,
    file_filters: Vec<Filter>,
    follow_links: bool,
}

impl ScanPipeline {
    pub fn new(root: PathReference) -> Self {
        Self {
            root,
            dir_filters: Vec::new(),
            file_filters: Vec::new(),
            follow_links: false,
        }
    }

    /// Scan of a project root that skips its trash and record-store dirs.
    pub fn for_project(project: &Project) -> Self {
        project
            .default_exclusions()
            .into_iter()
            .fold(Self::new(project.root().clone()), |scan, dir| {
                scan.exclude_dirs(PathMatcher::prefix(dir))
            })
    }

    pub fn root(&self) -> &PathReference {
        &self.root
    }

    pub fn exclude_dirs(mut self, matcher: PathMatcher) -> Self {
        self.dir_filters.push(Filter {
            matcher,
            action: FilterAction::Exclude,
        });
        self
    }

    pub fn include_dirs(mut self, matcher: PathMatcher) -> Self {
        self.dir_filters.push(Filter {
            matcher,
            action: FilterAction::Include,
        });
        self
    }

    pub fn include_files(mut self, matcher: PathMatcher) -> Self {
        self.file_filters.push(Filter {
            matcher,
            action: FilterAction::Include,
        });
        self
    }

    pub fn exclude_files(mut self, matcher: PathMatcher) -> Self {
        self.file_filters.push(Filter {
            matcher,
            action: FilterAction::Exclude,
        });
        self
    }

    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    fn relative(&self, absolute: &NormalizedPath) -> NormalizedPath {
        absolute
            .strip_prefix(self.root.absolute())
            .unwrap_or_else(|| absolute.clone())
    }

    fn descend(&self, absolute: &NormalizedPath) -> bool {
        let relative = self.relative(absolute);
        relative.is_empty()
            || decide(&self.dir_filters, absolute, &relative) != Some(FilterAction::Exclude)
    }

    fn accept(&self, absolute: &NormalizedPath) -> bool {
        let relative = self.relative(absolute);
        match decide(&self.file_filters, absolute, &relative) {
            Some(action) => action == FilterAction::Include,
            None => !self
                .file_filters
                .iter()
                .any(|f| f.action == FilterAction::Include),
        }
    }

    /// Lazily walk the tree. Each call starts a new walk.
    pub fn iter(&self) -> ScanIter<'_> {
        let skipped = Rc::new(Cell::new(0));
        let walker = WalkDir::new(self.root.to_native())
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                !entry.file_type().is_dir() || self.descend(&NormalizedPath::new(entry.path()))
            });
        ScanIter {
            pipeline: self,
            inner: Box::new(walker),
            skipped,
        }
    }

    /// Walk the tree feeding every candidate to `stage`.
    ///
    /// Unreadable entries, stage failures caused by I/O and files that
    /// cannot be placed into a set are counted as skipped. Any other stage
    /// error aborts the scan.
    pub fn run<F>(&self, mut stage: F) -> Result<ScanReport>
    where
        F: FnMut(PathReference) -> Result<()>,
    {
        let mut report = ScanReport::default();
        let mut iter = self.iter();

        for reference in iter.by_ref() {
            let ext = reference
                .absolute()
                .extension()
                .map(str::to_lowercase)
                .unwrap_or_default();
            match stage(reference.clone()) {
                Ok(()) => {
                    report.files += 1;
                    *report.types.entry(ext).or_default() += 1;
                }
                Err(e @ (Error::Io(_) | Error::Fs(_) | Error::ProbeLimitExceeded { .. })) => {
                    warn!("scan: skipping {}: {}", reference, e);
                    report.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        report.skipped += iter.skipped();

        debug!(
            "scan: {} files, {} skipped under {}",
            report.files,
            report.skipped,
            self.root
        );
        Ok(report)
    }
}

/// Lazy iterator over scanned files.
pub struct ScanIter<'a> {
    pipeline: &'a ScanPipeline,
    inner: Box<dyn Iterator<Item = walkdir::Result<walkdir::DirEntry>> + 'a>,
    skipped: Rc<Cell<usize>>,
}

impl ScanIter<'_> {
    /// Entries that could not be read so far.
    pub fn skipped(&self) -> usize {
        self.skipped.get()
    }
}

impl Iterator for ScanIter<'_> {
    type Item = PathReference;

    fn next(&mut self) -> Option<PathReference> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("scan: skipping unreadable entry: {}", e);
                    self.skipped.set(self.skipped.get() + 1);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            let absolute = NormalizedPath::new(entry.path());
            if !self.pipeline.accept(&absolute) {
                continue;
            }
            let relative = self.pipeline.relative(&absolute);
            return Some(self.pipeline.root.join(relative.as_str()));
        }
    }
}
