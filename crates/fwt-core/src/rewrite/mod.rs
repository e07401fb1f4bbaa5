//! Record-store path rewriting
//!
//! A [`RewriteQueue`] collects old-to-new path mappings once every
//! destination is decided; a [`RewriteEngine`] applies it to record stores.

mod engine;
mod queue;

pub use engine::{RewriteEngine, RewriteOptions, RewriteOutcome, RewriteReport};
pub use queue::{RewriteEntry, RewriteQueue};
