//! CLI help: stable command names for logs.

use crate::cli::parse::Commands;

pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Run(_) => "run",
        Commands::Validate { .. } => "validate",
        Commands::SetupStorage { .. } => "setup-storage",
        Commands::DeleteImage { .. } => "delete-image",
    }
}
