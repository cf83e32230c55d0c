//! DATAGATE CLI entry point.

use clap::Parser;
use datagate_client::cli::{self, Cli, CliError};
use datagate_client::DataAccess;
use datagate_core::DataGateConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing();

    let config = DataGateConfig::load(cli.config.as_deref())?;
    tracing::debug!(environment = %config.environment, "configuration loaded");

    let access = DataAccess::from_config(config)?;
    let output = cli::run(&access, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("datagate_client=info,warn"));
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
