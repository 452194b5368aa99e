use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;

use ames_price_api::cli::{self, Cli};
use ames_price_api::config::Settings;
use ames_price_api::monitoring;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut settings);

    monitoring::init_tracing(&settings.log_level, cli.verbose)?;

    info!("{} starting up...", cli::banner());

    cli::run(cli, settings).await
}
