//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::{Environment, Settings};

/// Execute the CLI command with merged settings.
///
/// No subcommand runs the server.
///
/// # Errors
/// Returns errors from command handlers
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> anyhow::Result<()> {
    match cli.command_or_default() {
        Commands::Serve { dry_run, .. } => {
            ServeCommandHandler::new(settings, environment)
                .execute(dry_run)
                .await
        }
        Commands::Migrate { dry_run, rollback } => {
            if let Some(steps) = rollback
                && steps > 10
            {
                tracing::warn!(steps, "Rolling back a large number of migrations");
            }

            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await?;
            Ok(())
        }
    }
}
