//! Configuration command
//!
//! Shows the settings jrnmaint resolves from its config file and flags.

use anyhow::{Context, Result};
use cli_lib::config::{self, Settings};
use owo_colors::OwoColorize;

/// Show the resolved settings
pub fn run_show(settings: &Settings) -> Result<()> {
    println!("{}", "Configuration".bold());
    match &settings.source {
        Some(path) => println!("{}: {}\n", "Location".dimmed(), path.display().dimmed()),
        None => println!("{}\n", "No config file (using defaults)".dimmed()),
    }

    println!("  {} = {}", "root".cyan(), settings.root.display());
    println!("  {} = {}", "journal_name".cyan(), settings.journal_name);
    println!("  {} = {}", "info_space".cyan(), settings.info_space);
    println!("  {} = {}", "message_queue".cyan(), settings.message_queue);
    Ok(())
}

/// Show the default config file path
pub fn run_path() -> Result<()> {
    let config_path = config::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", config_path.display());
    if !config_path.exists() {
        println!("{}", "File does not exist. Use --example for a starting point.".yellow());
    }
    Ok(())
}

/// Show example configuration
pub fn run_example() -> Result<()> {
    println!("{}", config::example_config());
    Ok(())
}
