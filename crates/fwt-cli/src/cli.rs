//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use fwt_core::ToolOptions;
use std::path::PathBuf;

/// Foundry World Tools - deduplicate, rename and relink assets in Foundry VTT projects
#[derive(Parser, Debug)]
#[command(name = "fwt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file holding presets (default: <config dir>/fwt/config.json)
    #[arg(long, global = true, env = "FWT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Preset to take option defaults from
    #[arg(long, global = true)]
    pub preset: Option<String>,

    /// Foundry data directory (default: discovered from the project path)
    #[arg(long, global = true, env = "FWT_DATA_ROOT")]
    pub data_root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Find duplicate files in a project and keep one of each
    ///
    /// Duplicates are moved into the project's Trash directory and every
    /// reference to them in the record stores is pointed at the kept file.
    ///
    /// Examples:
    ///   fwt dedup worlds/acme --by-content
    ///   fwt dedup worlds/acme --by-name --ext png --ext webp
    ///   fwt dedup worlds/acme --by-content --preferred '^<project_dir>/tokens/'
    Dedup {
        /// Project directory (world, system or module)
        project_dir: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Regex selecting the file to keep; the first pattern matching any member wins
        #[arg(long)]
        preferred: Vec<String>,

        /// Files with the same name and directory are duplicates
        #[arg(long, conflicts_with = "by_content")]
        by_name: bool,

        /// Files with the same bytes are duplicates
        #[arg(long)]
        by_content: bool,

        #[command(flatten)]
        rules: NameRuleArgs,

        /// Show the plan without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Rename every file in a project according to name rules
    ///
    /// Examples:
    ///   fwt rename-all worlds/acme --lowercase
    ///   fwt rename-all worlds/acme --remove '_copy' --ext png
    ///   fwt rename-all worlds/acme --replace ' =_'
    RenameAll {
        /// Project directory (world, system or module)
        project_dir: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        rules: NameRuleArgs,

        /// Show the plan without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Retire TARGET and point its references at SOURCE
    Replace {
        /// File to retire into the trash
        target: PathBuf,

        /// File that takes its place
        source: PathBuf,
    },

    /// Move a file and update references to it
    Rename {
        /// File to move
        src: PathBuf,

        /// New location (a directory keeps the file name)
        target: PathBuf,

        /// Copy instead of move, leaving the source in place
        #[arg(long)]
        keep_src: bool,
    },

    /// List presets from the config file
    Presets,
}

impl Commands {
    /// Name used to match presets against.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Dedup { .. } => "dedup",
            Commands::RenameAll { .. } => "rename-all",
            Commands::Replace { .. } => "replace",
            Commands::Rename { .. } => "rename",
            Commands::Presets => "presets",
        }
    }
}

/// Which files a project scan visits
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterArgs {
    /// Only consider files with this extension (repeatable)
    #[arg(long)]
    pub ext: Vec<String>,

    /// Skip directories matching this glob, relative to the project (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,
}

/// How files are renamed
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct NameRuleArgs {
    /// Remove this regex from every path segment
    #[arg(long)]
    pub remove: Option<String>,

    /// Replace a regex in every path segment, as PATTERN=TEXT (repeatable)
    #[arg(long)]
    pub replace: Vec<String>,

    /// Lowercase every path segment
    #[arg(long)]
    pub lowercase: bool,
}

/// Set a flag only when given, so presets can fill it otherwise.
fn flag(value: bool) -> Option<bool> {
    value.then_some(true)
}

impl Commands {
    /// Options given explicitly on the command line.
    pub fn tool_options(&self) -> ToolOptions {
        match self {
            Commands::Dedup {
                filters,
                preferred,
                by_name,
                by_content,
                rules,
                ..
            } => ToolOptions {
                extensions: filters.ext.clone(),
                exclude: filters.exclude.clone(),
                preferred: preferred.clone(),
                by_name: flag(*by_name),
                by_content: flag(*by_content),
                remove: rules.remove.clone(),
                replace: rules.replace.clone(),
                lowercase: flag(rules.lowercase),
                ..ToolOptions::default()
            },
            Commands::RenameAll { filters, rules, .. } => ToolOptions {
                extensions: filters.ext.clone(),
                exclude: filters.exclude.clone(),
                remove: rules.remove.clone(),
                replace: rules.replace.clone(),
                lowercase: flag(rules.lowercase),
                ..ToolOptions::default()
            },
            Commands::Rename { keep_src, .. } => ToolOptions {
                keep_src: flag(*keep_src),
                ..ToolOptions::default()
            },
            Commands::Replace { .. } | Commands::Presets => ToolOptions::default(),
        }
    }
}
