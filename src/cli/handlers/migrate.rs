//! Migrate command handler
//!
//! Applies, previews or reverts the embedded schema migrations against
//! `{database.url}/{database.name}`.

use crate::config::Settings;
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::{AppError, AppResult};

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// # Errors
    /// - Configuration validation errors
    /// - Database connection errors
    /// - Migration execution errors
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate()?;

        if dry_run {
            return self.show_pending_migrations().await;
        }

        match rollback {
            Some(steps) => self.rollback_migrations(steps).await,
            None => self.run_migrations().await,
        }
    }

    async fn show_pending_migrations(&self) -> AppResult<()> {
        println!("Checking for pending migrations...");

        let pending = pending_migrations(self.config.database.connection_url()).await?;

        if pending.is_empty() {
            println!("✓ No pending migrations found - database is up to date");
        } else {
            println!("Found {} pending migration(s):", pending.len());
            for migration in &pending {
                println!("  - {}", migration);
            }
            println!("\nRun without --dry-run to apply these migrations");
        }

        Ok(())
    }

    async fn run_migrations(&self) -> AppResult<()> {
        println!("Running database migrations...");

        let applied = run_pending_migrations(self.config.database.connection_url()).await?;
        tracing::info!(count = applied.len(), migrations = ?applied, "Migrations applied");

        if applied.is_empty() {
            println!("✓ No migrations to apply - database is already up to date");
        } else {
            println!("✓ Applied {} migration(s):", applied.len());
            for migration in &applied {
                println!("  - {}", migration);
            }
        }

        Ok(())
    }

    async fn rollback_migrations(&self, steps: u32) -> AppResult<()> {
        if steps == 0 {
            return Err(AppError::invalid_argument(
                "Number of rollback steps must be greater than 0",
            ));
        }

        println!("Rolling back {} migration(s)...", steps);

        let reverted = revert_migrations(self.config.database.connection_url(), steps).await?;
        tracing::info!(count = reverted.len(), migrations = ?reverted, "Migrations reverted");

        println!("✓ Rolled back {} migration(s):", reverted.len());
        for migration in &reverted {
            println!("  - {}", migration);
        }
        if (reverted.len() as u32) < steps {
            println!("Only {} migration(s) were applied", reverted.len());
        }

        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
