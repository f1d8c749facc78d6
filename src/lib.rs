pub mod cli;
pub mod core;
pub mod handler;
pub mod providers;
pub mod server;

use crate::core::config::AppConfig;
use crate::handler::ConversionHandler;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Serve { listen: Option<String> },
    Convert { usd_amount: String, as_json: bool },
}

pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("pecan starting...");

    let config = load_config(config_path)?;
    debug!("Loaded config: {config:#?}");

    let handler = Arc::new(ConversionHandler::from_config(&config)?);

    match command {
        AppCommand::Serve { listen } => {
            let listen = listen.as_deref().unwrap_or(&config.server.listen);
            server::serve(handler, listen).await
        }
        AppCommand::Convert {
            usd_amount,
            as_json,
        } => cli::convert::run(&handler, &usd_amount, as_json).await,
    }
}
