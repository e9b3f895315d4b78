use catalog_rs::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = load_and_merge_config(&cli)?;
    init_logger_from_settings(&loaded.settings)?;

    execute_command(&cli, loaded.settings, loaded.environment).await
}
