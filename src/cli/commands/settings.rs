//! Application settings management

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

use crate::config::Config;
use crate::tui::ThemeVariant;

#[derive(Args)]
pub struct SettingsCommands {
    #[command(subcommand)]
    pub command: SettingsSubcommands,
}

#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Show current settings
    Show,
    /// Set the UI theme ("mocha" or "latte")
    Theme {
        /// Theme name
        name: String,
    },
}

pub async fn settings_command(args: SettingsCommands) -> Result<()> {
    match args.command {
        SettingsSubcommands::Show => show_command(),
        SettingsSubcommands::Theme { name } => theme_command(name),
    }
}

fn show_command() -> Result<()> {
    let config = Config::load()?;
    let settings = config.get_settings();

    println!();
    println!("  {}", "Settings".bright_white().bold());
    println!("    {}: {}", "theme".dimmed(), settings.theme.cyan());

    Ok(())
}

fn theme_command(name: String) -> Result<()> {
    let name = name.to_lowercase();
    if !matches!(name.as_str(), "mocha" | "latte") {
        anyhow::bail!("Unknown theme '{}'. Available themes: mocha, latte", name);
    }

    // Round-trip through the variant so config only ever stores known names
    let variant = ThemeVariant::from_name(&name);
    let mut config = Config::load()?;
    config.update_theme(name.clone())?;

    println!(
        "{} Theme set to '{}' ({:?})",
        "✓".bright_green().bold(),
        name.cyan(),
        variant
    );

    Ok(())
}
