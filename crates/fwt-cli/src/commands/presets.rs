//! List presets from the config file

use colored::Colorize;

use crate::context::Context;
use crate::error::Result;

/// Run the presets command
pub fn run_presets(context: &Context) -> Result<()> {
    let path = context.config_path()?;
    let config = context.app_config()?;

    println!("{} {}", "Presets in".bold(), path.as_str().dimmed());
    if config.presets.is_empty() {
        println!("   (none)");
        return Ok(());
    }

    println!();
    for (name, preset) in &config.presets {
        println!(
            "  {:<16} {} [{}]",
            name.green(),
            preset.description,
            preset.command.join(", ").cyan()
        );
    }
    Ok(())
}
