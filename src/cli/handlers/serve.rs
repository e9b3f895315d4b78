//! Serve command handler

use crate::config::{Environment, Settings};
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    /// Run the server, or only validate the configuration when `dry_run` is set.
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Server startup errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            self.validate_only()?;
            return Ok(());
        }

        Server::new(self.config, self.environment).run().await
    }

    /// Validate configuration without connecting to the database or binding.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        println!("✓ Configuration is valid ({} environment)", self.environment);
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!("✓ Database: {}", self.config.database.name);
        println!(
            "✓ Repository operations time out after {}s",
            self.config.database.operation_timeout
        );
        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
