//! dedup, rename-all, replace and rename
//!
//! Each command builds a plan, prints it, and applies it unless it is a dry
//! run. Failed file operations turn into a non-zero exit after the summary.

use std::path::Path;

use colored::Colorize;
use fwt_core::{Plan, PathResolver, RewriteOptions, ToolOptions, Workflow};

use super::report::{print_plan, print_report};
use crate::context::Context;
use crate::error::{CliError, Result};

fn finish(plan: Plan, resolver: &PathResolver, dry_run: bool) -> Result<()> {
    print_plan(&plan);

    if dry_run {
        println!();
        println!("{} Dry run, nothing was changed.", "NOTE".yellow().bold());
        return Ok(());
    }

    let report = plan.apply(resolver, RewriteOptions::default())?;
    print_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} file operations failed",
            report.failures.len()
        )))
    }
}

/// Run the dedup command
pub fn run_dedup(
    context: &Context,
    project_dir: &Path,
    explicit: ToolOptions,
    dry_run: bool,
) -> Result<()> {
    let options = context.options("dedup", explicit)?;
    if options.by_name.is_none() && options.by_content.is_none() {
        return Err(CliError::user(
            "dedup needs one of --by-name or --by-content",
        ));
    }

    let resolver = context.resolver(project_dir)?;
    let plan = Workflow::new(&resolver).dedup(project_dir, &options)?;

    if plan.sets().is_empty() {
        print_plan(&plan);
        println!();
        println!("{} No duplicates found.", "OK".green().bold());
        return Ok(());
    }
    finish(plan, &resolver, dry_run)
}

/// Run the rename-all command
pub fn run_rename_all(
    context: &Context,
    project_dir: &Path,
    explicit: ToolOptions,
    dry_run: bool,
) -> Result<()> {
    let options = context.options("rename-all", explicit)?;
    if options.name_rules()?.is_empty() {
        return Err(CliError::user(
            "rename-all needs at least one of --remove, --replace or --lowercase",
        ));
    }

    let resolver = context.resolver(project_dir)?;
    let plan = Workflow::new(&resolver).rename_all(project_dir, &options)?;

    if plan.is_empty() {
        print_plan(&plan);
        println!();
        println!("{} Nothing to rename.", "OK".green().bold());
        return Ok(());
    }
    finish(plan, &resolver, dry_run)
}

/// Run the replace command
pub fn run_replace(context: &Context, target: &Path, source: &Path) -> Result<()> {
    let resolver = context.resolver(source)?;
    let plan = Workflow::new(&resolver).replace(target, source)?;
    finish(plan, &resolver, false)
}

/// Run the rename command
pub fn run_rename(
    context: &Context,
    source: &Path,
    target: &Path,
    explicit: ToolOptions,
) -> Result<()> {
    let options = context.options("rename", explicit)?;
    let resolver = context.resolver(source)?;
    let plan = Workflow::new(&resolver).rename(source, target, options.keep_src())?;
    finish(plan, &resolver, false)
}
