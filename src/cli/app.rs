use super::commands::auth::AuthCommands;
use super::commands::properties::PropertiesCommands;
use super::commands::settings::SettingsCommands;
use super::commands::tui::TuiCommands;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "metahub-cli")]
#[command(about = "A CLI tool for browsing custom properties in a MetaHub catalog")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Catalog connection management
    Auth(AuthCommands),
    /// Inspect an entity's custom properties
    Properties(PropertiesCommands),
    /// Application settings management
    Settings(SettingsCommands),
    /// Launch the interactive property browser
    Tui(TuiCommands),
}
