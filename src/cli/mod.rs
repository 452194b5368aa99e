use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::api::{self, AppState, PredictResponse, PredictionServer, ServerConfig};
use crate::config::Settings;
use crate::ml::ModelArtifact;

#[derive(Parser, Debug)]
#[command(name = "ames-price-api", author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (TOML, JSON or YAML); defaults to ./ames-api.* when present
    #[arg(short, long, global = true, env = "AMES_API_CONFIG")]
    pub config: Option<PathBuf>,

    /// Exported model pipeline, overriding the settings file
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Frozen engineered column list, overriding the settings file
    #[arg(long, global = true)]
    pub columns: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the prediction API over HTTP
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Predict the price for a JSON property record
    Predict {
        /// File holding one JSON object with the 15 property attributes
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Print the expected engineered columns, in order
    Columns,
}

impl Cli {
    /// Apply flag overrides on top of loaded settings
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(model) = &self.model {
            settings.model_path = model.clone();
        }
        if let Some(columns) = &self.columns {
            settings.columns_path = columns.clone();
        }
        if let Commands::Serve { host, port } = &self.command {
            if let Some(host) = host {
                settings.host = host.clone();
            }
            if let Some(port) = port {
                settings.port = *port;
            }
        }
    }
}

/// Execute the parsed command against already-initialized settings
pub async fn run(cli: Cli, settings: Settings) -> Result<()> {
    let artifact = Arc::new(ModelArtifact::load(
        &settings.model_path,
        &settings.columns_path,
    ));

    match &cli.command {
        Commands::Serve { .. } => {
            let state = AppState::new(artifact)?;
            let config = ServerConfig {
                host: settings.host.clone(),
                port: settings.port,
            };
            PredictionServer::new(config, state).start().await
        }
        Commands::Predict { input } => {
            let content = std::fs::read_to_string(input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let body: Value = serde_json::from_str(&content)
                .with_context(|| format!("{} is not valid JSON", input.display()))?;

            let state = AppState::new(artifact)?;
            let record = match state.validator().validate(&body) {
                Ok(record) => record,
                Err(errors) => {
                    println!("{}", serde_json::to_string_pretty(&errors)?);
                    bail!("{}", errors);
                }
            };

            let response = PredictResponse::from(state.predictor().predict(&record));
            println!("{}", serde_json::to_string_pretty(&response)?);

            match response {
                PredictResponse::Price { predicted_sale_price } => {
                    info!(predicted_sale_price, "Prediction complete");
                    Ok(())
                }
                PredictResponse::Error { error } => bail!(error),
            }
        }
        Commands::Columns => {
            let columns = artifact
                .columns()
                .map_err(|e| anyhow::anyhow!("{}", e))
                .context("Expected columns are not available")?;
            for column in columns.columns() {
                println!("{}", column);
            }
            Ok(())
        }
    }
}

/// Title line printed by `--version` style banners
pub fn banner() -> String {
    format!("{} v{}", api::API_TITLE, api::API_VERSION)
}
