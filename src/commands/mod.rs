//! Subcommand implementations

pub mod account;
pub mod trade;

use anyhow::Result;
use backpack_trader::backpack::{BackpackClient, PublicClient};
use backpack_trader::Config;
use std::time::Duration;
use tracing::info;

/// Load the config file and report where it came from
pub fn load_config(config_path: &str) -> Result<Config> {
    let config = Config::from_file(config_path)?;
    info!("Loaded configuration from: {}", config_path);
    Ok(config)
}

/// Signed client built from the exchange section
pub fn signed_client(config: &Config) -> Result<BackpackClient> {
    let credentials = config.exchange.credentials()?;
    let client = BackpackClient::with_config(credentials, config.exchange.client_config())?;
    Ok(client)
}

/// Unsigned client pointed at the same host as the signed one
pub fn public_client(config: &Config) -> Result<PublicClient> {
    let client = PublicClient::with_base_url(
        config.exchange.base_url.clone(),
        Duration::from_secs(config.exchange.timeout_secs),
    )?;
    Ok(client)
}
