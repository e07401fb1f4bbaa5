//! Core asset reconciliation for Foundry World Tools
//!
//! This crate keeps a project's asset files and the record stores that
//! reference them consistent while files are deduplicated, renamed or
//! replaced:
//!
//! - **Path resolution**: absolute, data-root-relative and project-relative
//!   views of every path, including projects symlinked in from elsewhere
//! - **Scanning**: filtered directory walks yielding candidate files
//! - **Duplicate detection**: content or name based sets with a preferred
//!   member chosen by pattern
//! - **Rewriting**: crash-safe, exactly-once substitution of paths inside
//!   record stores
//! - **Workflows**: dedup, rename-all, replace and rename plans
//!
//! # Architecture
//!
//! ```text
//!                 fwt-cli
//!                    |
//!                 fwt-core
//!    (resolver, scan, dedup, rewrite, workflow)
//!                    |
//!                  fwt-fs
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fwt_core::{DataRoot, PathResolver, ToolOptions, Workflow, RewriteOptions};
//!
//! let resolver = PathResolver::new(DataRoot::discover(".")?);
//! let options = ToolOptions { by_content: Some(true), ..Default::default() };
//! let plan = Workflow::new(&resolver).dedup("worlds/acme", &options)?;
//! let report = plan.apply(&resolver, RewriteOptions::default())?;
//! ```

pub mod config;
pub mod dedup;
pub mod entity;
pub mod error;
pub mod names;
pub mod project;
pub mod resolver;
pub mod rewrite;
pub mod scan;
pub mod store;
pub mod workflow;

pub use config::{AppConfig, Preset, ToolOptions};
pub use dedup::{DetectionMode, DuplicateSet, DuplicateSetEngine, PreferredPatterns, SetKey};
pub use entity::{FileEntity, TrashAction};
pub use error::{Error, Result};
pub use names::{NameRule, NameRules};
pub use project::{Project, TrashDir};
pub use resolver::{DataRoot, PathReference, PathResolver, ProjectIdentity, ResolveOptions};
pub use rewrite::{RewriteEngine, RewriteOptions, RewriteOutcome, RewriteQueue, RewriteReport};
pub use scan::{PathMatcher, ScanPipeline, ScanReport};
pub use store::{ProjectStore, RecordStore, StoreCategory};
pub use workflow::{ApplyFailure, ApplyReport, Plan, Workflow};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn target_exists_displays_path() {
        let error = Error::TargetExists {
            path: PathBuf::from("/data/worlds/acme/img/a.png"),
        };
        let display = error.to_string();
        assert!(
            display.contains("/data/worlds/acme/img/a.png"),
            "Error display should contain the path, got: {}",
            display
        );
    }

    #[test]
    fn fs_target_exists_maps_to_core_variant() {
        let error: Error = fwt_fs::Error::TargetExists {
            path: PathBuf::from("/tmp/x"),
        }
        .into();
        assert!(matches!(error, Error::TargetExists { .. }));
    }
}
