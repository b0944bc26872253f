use anyhow::Result;
use colored::Colorize;

use crate::app::{get_config_dir, init_config};

use super::Commands;

/// Handle subcommands that finish without scanning; returns true when handled
pub fn handle_command(command: &Commands) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing marktree configuration...");
            let created = init_config()?;
            if created.is_empty() {
                println!("  Nothing to do, configuration already exists.");
            }
            for path in created {
                println!("  {} {}", "created".green(), path.display());
            }
            println!(
                "Global config lives in {}",
                get_config_dir()?.display().to_string().cyan()
            );
            Ok(true)
        }
        Commands::Scan { .. } => Ok(false),
    }
}
