//! Command-line interface: argument parsing, configuration merging and
//! command dispatch.

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment, LogLevel};

use crate::config::Settings;
use crate::logger::init_logger;

/// Settings after every source and CLI override has been applied.
#[derive(Debug)]
pub struct LoadedConfig {
    pub settings: Settings,
    pub environment: crate::config::Environment,
}

/// Load configuration files and environment, then apply CLI overrides.
///
/// # Errors
/// Returns error if loading, merging, or validation fails
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<LoadedConfig> {
    let merger = ConfigurationMerger::from_cli(cli)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let settings = merger
        .merge_cli_args(cli)
        .map_err(|e| anyhow::anyhow!("Configuration merge error: {}", e))?;

    Ok(LoadedConfig {
        settings,
        environment: merger.environment(),
    })
}

/// Install the global tracing subscriber from the logger settings.
///
/// # Errors
/// Returns error if the logger settings are invalid or a subscriber is
/// already installed
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<()> {
    let logger_config = settings
        .logger
        .clone()
        .into_logger_config()
        .map_err(|e| anyhow::anyhow!("Logger configuration error: {}", e))?;

    init_logger(logger_config).map_err(|e| anyhow::anyhow!("Logger initialization error: {}", e))
}
