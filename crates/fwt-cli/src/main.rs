//! Foundry World Tools CLI
//!
//! Deduplicates, renames and relinks asset files inside Foundry VTT worlds,
//! systems and modules.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{} could not set up logging: {}", "warning:".yellow().bold(), e);
    }
    tracing::debug!("Verbose mode enabled");

    let context = Context {
        config: cli.config,
        preset: cli.preset,
        data_root: cli.data_root,
    };

    match cli.command {
        Some(cmd) => execute_command(&context, cmd),
        None => {
            println!("{} Foundry World Tools", "fwt".green().bold());
            println!();
            println!("Run {} for available commands.", "fwt --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(context: &Context, cmd: Commands) -> Result<()> {
    let options = cmd.tool_options();
    match cmd {
        Commands::Dedup {
            project_dir,
            dry_run,
            ..
        } => commands::run_dedup(context, &project_dir, options, dry_run),
        Commands::RenameAll {
            project_dir,
            dry_run,
            ..
        } => commands::run_rename_all(context, &project_dir, options, dry_run),
        Commands::Replace { target, source } => commands::run_replace(context, &target, &source),
        Commands::Rename { src, target, .. } => {
            commands::run_rename(context, &src, &target, options)
        }
        Commands::Presets => commands::run_presets(context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwt_core::ToolOptions;
    use fwt_test_utils::TestDataRoot;

    fn context() -> Context {
        Context::default()
    }

    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn test_dedup_requires_detection_mode() {
        let data = TestDataRoot::new();
        let world = data.add_world("acme");

        let result = commands::run_dedup(&context(), &world, ToolOptions::default(), true);
        assert!(matches!(result, Err(error::CliError::User { .. })));
    }

    #[test]
    fn test_dedup_dry_run_changes_nothing() {
        let data = TestDataRoot::new();
        let world = data.add_world("acme");
        data.write_asset("worlds/acme/a.png", b"same");
        data.write_asset("worlds/acme/b.png", b"same");

        let options = ToolOptions {
            by_content: Some(true),
            ..ToolOptions::default()
        };
        commands::run_dedup(&context(), &world, options, true).unwrap();

        data.assert_exists("worlds/acme/a.png");
        data.assert_exists("worlds/acme/b.png");
        assert!(data.list("worlds/acme/Trash").is_empty());
    }

    #[test]
    fn test_rename_all_requires_rules() {
        let data = TestDataRoot::new();
        let world = data.add_world("acme");

        let result = commands::run_rename_all(&context(), &world, ToolOptions::default(), false);
        assert!(matches!(result, Err(error::CliError::User { .. })));
    }

    #[test]
    fn test_rename_moves_file() {
        let data = TestDataRoot::new();
        data.add_world("acme");
        let source = data.write_asset("worlds/acme/token.png", b"png");

        commands::run_rename(
            &context(),
            &source,
            &data.data_dir().join("worlds/acme/tokens/hero.png"),
            ToolOptions::default(),
        )
        .unwrap();

        data.assert_not_exists("worlds/acme/token.png");
        data.assert_exists("worlds/acme/tokens/hero.png");
    }

    #[test]
    fn test_explicit_data_root() {
        let data = TestDataRoot::new();
        let world = data.add_world("acme");
        let context = Context {
            data_root: Some(data.data_dir()),
            ..Context::default()
        };
        let resolver = context.resolver(&world).unwrap();
        assert_eq!(
            resolver.data_root().path(),
            &fwt_fs::NormalizedPath::new(data.data_dir())
        );
    }
}
