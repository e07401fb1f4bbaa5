//! End-to-end workflows: dedup, rename-all, replace and rename
//!
//! Each workflow first builds a [`Plan`]: every destination, trash path and
//! rewrite is decided before anything touches the disk. [`Plan::apply`]
//! then rewrites the record stores and afterwards performs the file
//! operations, so an interrupted run leaves stores pointing at files that
//! a re-run will finish moving.

use crate::config::ToolOptions;
use crate::dedup::{DuplicateSet, DuplicateSetEngine, PreferredPatterns, SetKey};
use crate::entity::FileEntity;
use crate::project::Project;
use crate::resolver::{PathResolver, ResolveOptions};
use crate::rewrite::{RewriteEngine, RewriteOptions, RewriteQueue, RewriteReport};
use crate::scan::{PathMatcher, ScanPipeline, ScanReport};
use crate::{Error, Result};
use fwt_fs::NormalizedPath;
use fwt_fs::checksum::{self, KeyFn};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Everything one run intends to do.
#[derive(Debug)]
pub struct Plan {
    project: Project,
    sets: Vec<DuplicateSet>,
    entities: Vec<FileEntity>,
    queue: RewriteQueue,
    scan: Option<ScanReport>,
}

impl Plan {
    fn new(project: Project) -> Self {
        Self {
            project,
            sets: Vec::new(),
            entities: Vec::new(),
            queue: RewriteQueue::new(),
            scan: None,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Duplicate sets (dedup and replace).
    pub fn sets(&self) -> &[DuplicateSet] {
        &self.sets
    }

    /// Standalone files to move (rename-all and rename).
    pub fn entities(&self) -> &[FileEntity] {
        &self.entities
    }

    pub fn queue(&self) -> &RewriteQueue {
        &self.queue
    }

    pub fn scan_report(&self) -> Option<&ScanReport> {
        self.scan.as_ref()
    }

    /// Nothing to rewrite, move or trash.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
            && self.sets.is_empty()
            && self.entities.iter().all(|e| e.new_path().is_none())
    }

    /// Rewrite the project's record stores, then move and trash files.
    ///
    /// A failing file operation is recorded and the remaining ones still
    /// run. When a preferred file cannot be moved, its duplicates are kept.
    pub fn apply(mut self, resolver: &PathResolver, options: RewriteOptions) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        if !self.queue.is_empty() {
            let stores = self.project.record_stores(resolver)?;
            let engine = RewriteEngine::new(&self.queue, self.project.trash().clone(), options)?;
            report.rewrite = engine.apply(&stores)?;
        }

        for entity in &mut self.entities {
            report.record_move(entity);
        }

        for set in &mut self.sets {
            let preferred_ok = match set.preferred_mut() {
                Some(preferred) => report.record_move(preferred),
                None => false,
            };
            let preferred = set.preferred_index();
            for (i, member) in set.members_mut().iter_mut().enumerate() {
                if Some(i) == preferred {
                    continue;
                }
                if !preferred_ok {
                    debug!("apply: keeping {} because its preferred file did not move", member.path());
                    continue;
                }
                let from = member.path().absolute().clone();
                match member.trash() {
                    Ok(true) => report.trashed.push(from),
                    Ok(false) => {}
                    Err(error) => {
                        warn!("apply: could not trash {}: {}", from, error);
                        report.failures.push(ApplyFailure { path: from, error });
                    }
                }
            }
        }

        info!(
            "applied: {} moved, {} trashed, {} failed",
            report.moved.len(),
            report.trashed.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

/// A file operation that did not complete.
#[derive(Debug)]
pub struct ApplyFailure {
    pub path: NormalizedPath,
    pub error: Error,
}

/// What [`Plan::apply`] did.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub rewrite: RewriteReport,
    /// `(from, to)` for every moved or copied file.
    pub moved: Vec<(NormalizedPath, NormalizedPath)>,
    /// Original locations of trashed files.
    pub trashed: Vec<NormalizedPath>,
    pub failures: Vec<ApplyFailure>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Run the entity's queued move. Returns `false` on failure.
    fn record_move(&mut self, entity: &mut FileEntity) -> bool {
        let from = entity.path().absolute().clone();
        match entity.rename() {
            Ok(true) => {
                self.moved.push((from, entity.path().absolute().clone()));
                true
            }
            Ok(false) => true,
            Err(error) => {
                warn!("apply: could not move {}: {}", from, error);
                self.failures.push(ApplyFailure { path: from, error });
                false
            }
        }
    }
}

/// Destinations already taken by earlier entities of one plan.
#[derive(Debug, Default)]
struct Destinations {
    paths: HashSet<NormalizedPath>,
}

impl Destinations {
    /// Keep `entity`'s queued destination if no other entity holds it,
    /// otherwise leave the file where it is.
    fn claim(&mut self, entity: &mut FileEntity, op: &str) {
        let Some(new) = entity.new_path() else {
            return;
        };
        if !self.paths.insert(new.absolute().clone()) {
            warn!(
                "{}: skipping {}, {} is already the destination of another file",
                op,
                entity.path(),
                new
            );
            entity.clear_new_path();
        }
    }
}

/// Builds plans against one data root.
pub struct Workflow<'a> {
    resolver: &'a PathResolver,
    key_fn: KeyFn,
}

impl<'a> Workflow<'a> {
    pub fn new(resolver: &'a PathResolver) -> Self {
        Self {
            resolver,
            key_fn: checksum::sha256_key,
        }
    }

    /// Use a different content key function for dedup.
    pub fn with_key_fn(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = key_fn;
        self
    }

    fn pipeline(&self, project: &Project, options: &ToolOptions) -> Result<ScanPipeline> {
        let mut pipeline = ScanPipeline::for_project(project);
        if !options.exclude.is_empty() {
            pipeline = pipeline.exclude_dirs(PathMatcher::globs(&options.exclude)?);
        }
        if !options.extensions.is_empty() {
            pipeline = pipeline.include_files(PathMatcher::extensions(&options.extensions));
        }
        Ok(pipeline)
    }

    /// Find duplicates in a project and plan to keep one file of each set.
    pub fn dedup(&self, project_dir: impl AsRef<Path>, options: &ToolOptions) -> Result<Plan> {
        let project = Project::open(self.resolver, project_dir)?;
        let mode = options.detection_mode()?;
        let patterns = PreferredPatterns::compile(&options.preferred, project.dir())?;
        let rules = options.name_rules()?;
        let pipeline = self.pipeline(&project, options)?;

        let mut engine = DuplicateSetEngine::new(mode).with_key_fn(self.key_fn);
        let scan = engine.scan(&pipeline)?;

        let mut plan = Plan::new(project);
        let mut claimed = Destinations::default();
        for mut set in engine.into_sets() {
            set.select_preferred(&patterns);
            if set.relocate_preferred(&rules)? {
                if let Some(preferred) = set.preferred_mut() {
                    claimed.claim(preferred, "dedup");
                }
            }
            set.assign_trash(Some(plan.project.trash()))?;
            for (old, new) in set.rewrite_entries() {
                plan.queue.push(&old, &new);
            }
            plan.sets.push(set);
        }
        plan.scan = Some(scan);

        info!(
            "dedup: {} sets, {} rewrites in {}",
            plan.sets.len(),
            plan.queue.len(),
            plan.project.dir()
        );
        Ok(plan)
    }

    /// Rename every scanned file according to the name rules.
    ///
    /// Files whose new name is already taken are left alone.
    pub fn rename_all(&self, project_dir: impl AsRef<Path>, options: &ToolOptions) -> Result<Plan> {
        let project = Project::open(self.resolver, project_dir)?;
        let rules = options.name_rules()?;
        let pipeline = self.pipeline(&project, options)?;

        let mut entities = Vec::new();
        let scan = pipeline.run(|reference| {
            entities.push(FileEntity::new(reference));
            Ok(())
        })?;

        let mut plan = Plan::new(project);
        let mut claimed = Destinations::default();
        if !rules.is_empty() {
            for entity in &mut entities {
                let Some(relative) = entity.path().project_relative() else {
                    continue;
                };
                let renamed = rules.apply(relative);
                if &renamed == relative {
                    continue;
                }
                let Some(target) = entity.path().with_project_relative(&renamed) else {
                    continue;
                };
                match entity.set_new_path(target) {
                    Ok(true) => claimed.claim(entity, "rename_all"),
                    Ok(false) => {}
                    Err(Error::TargetExists { path }) => {
                        warn!(
                            "rename_all: skipping {}, {} already exists",
                            entity.path(),
                            path.display()
                        );
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        entities.retain(|e| e.new_path().is_some());
        for entity in &entities {
            if let Some(new) = entity.new_path() {
                plan.queue.push(entity.path(), new);
            }
        }
        plan.entities = entities;
        plan.scan = Some(scan);

        info!(
            "rename_all: {} files to rename in {}",
            plan.entities.len(),
            plan.project.dir()
        );
        Ok(plan)
    }

    /// Retire `target` and point its references at `source`.
    pub fn replace(&self, target: impl AsRef<Path>, source: impl AsRef<Path>) -> Result<Plan> {
        let opts = ResolveOptions::project().existing();
        let source = self.resolver.resolve(source, opts)?;
        let target = self.resolver.resolve(target, opts)?;
        let project = Project::open(self.resolver, source.to_native())?;

        let mut plan = Plan::new(project);
        if source.absolute() == target.absolute() {
            debug!("replace: {} is its own replacement", source);
            return Ok(plan);
        }

        let mut keep = FileEntity::new(source);
        keep.lock();
        let mut set = DuplicateSet::new(SetKey::Manual, vec![keep, FileEntity::new(target)]);
        set.set_preferred(0);
        set.assign_trash(Some(plan.project.trash()))?;
        for (old, new) in set.rewrite_entries() {
            plan.queue.push(&old, &new);
        }
        plan.sets.push(set);
        Ok(plan)
    }

    /// Move (or with `keep_src`, copy) one file and update its references.
    pub fn rename(
        &self,
        source: impl AsRef<Path>,
        target: impl AsRef<Path>,
        keep_src: bool,
    ) -> Result<Plan> {
        let source = self
            .resolver
            .resolve(source, ResolveOptions::project().existing())?;
        let target = self.resolver.resolve(target, ResolveOptions::default())?;
        let project = Project::open(self.resolver, source.to_native())?;

        let mut entity = FileEntity::new(source);
        entity.set_keep_source(keep_src);
        entity.set_new_path(target)?;

        let mut plan = Plan::new(project);
        if let Some(new) = entity.new_path() {
            plan.queue.push(entity.path(), new);
            plan.entities.push(entity);
        }
        Ok(plan)
    }
}
