//! CLI help: stable command names for logging.

use crate::cli::parse::{Commands, ConfigCommands, PatternCommands};

/// Command name string for log records (e.g. "patterns.add", "config.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Classify { .. } => "classify".to_string(),
        Commands::Collapse { .. } => "collapse".to_string(),
        Commands::Patterns { command } => format!("patterns.{}", pattern_command_name(command)),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn pattern_command_name(command: &PatternCommands) -> &'static str {
    match command {
        PatternCommands::List { .. } => "list",
        PatternCommands::Add { .. } => "add",
        PatternCommands::Remove { .. } => "remove",
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show => "show",
    }
}
