//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Product catalog HTTP service
#[derive(Parser, Debug)]
#[command(name = "catalog-rs")]
#[command(about = "Product catalog HTTP service backed by PostgreSQL")]
#[command(long_about = "
catalog-rs serves a JSON API for creating, listing, reading, updating and
deleting catalog products. Configuration is layered from config/*.toml files,
CATALOG_* environment variables and the flags below.

EXAMPLES:
    # Start the server with the layered configuration
    catalog-rs

    # Bind to all interfaces on port 9000
    catalog-rs serve --host 0.0.0.0 --port 9000

    # Use a single configuration file
    catalog-rs --config /etc/catalog/catalog.toml serve

    # Validate configuration without starting
    catalog-rs --env production serve --dry-run

    # Apply, preview or revert schema migrations
    catalog-rs migrate
    catalog-rs migrate --dry-run
    catalog-rs migrate --rollback 1
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute; `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Load this single TOML file instead of the layered config directory
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Environment whose `{environment}.toml` layer is loaded
    ///
    /// Overrides CATALOG_APP_ENV.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level for this run; beats --verbose and --quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit without binding or connecting
        #[arg(long)]
        dry_run: bool,
    },
    /// Manage the products table schema
    Migrate {
        /// List pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert the given number of most recent migrations
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve {
            host: None,
            port: None,
            log_level: None,
            dry_run: false,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl Cli {
    /// The subcommand to run, `serve` with no overrides when none was given.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["catalog-rs", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["catalog-rs"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command_or_default(),
            Commands::Serve {
                host: None,
                port: None,
                log_level: None,
                dry_run: false
            }
        ));
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "catalog-rs",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--log-level",
            "warning",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Serve {
                host,
                port,
                log_level,
                dry_run,
            }) => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
                assert_eq!(log_level, Some(LogLevel::Warn));
                assert!(!dry_run);
            }
            other => panic!("Expected Serve command, got {:?}", other),
        }
    }

    #[test]
    fn test_env_aliases() {
        let cli = Cli::try_parse_from(["catalog-rs", "--env", "stage"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Staging));
        assert_eq!(
            crate::config::Environment::from(Environment::Staging),
            crate::config::Environment::Staging
        );

        let cli = Cli::try_parse_from(["catalog-rs", "-e", "prod"]).unwrap();
        assert_eq!(cli.env, Some(Environment::Production));
    }

    #[test]
    fn test_migrate_flags_conflict() {
        let err = Cli::try_parse_from(["catalog-rs", "migrate", "--dry-run", "--rollback", "2"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["catalog-rs", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_missing_config_file_is_rejected() {
        let result = Cli::try_parse_from(["catalog-rs", "--config", "/no/such/catalog.toml"]);
        assert!(result.is_err());
    }
}
