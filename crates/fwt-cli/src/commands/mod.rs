//! Command implementations for fwt-cli

pub mod presets;
pub mod report;
pub mod workflow;

pub use presets::run_presets;
pub use workflow::{run_dedup, run_rename, run_rename_all, run_replace};
