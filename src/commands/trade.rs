//! Trading loop and one-shot market order commands

use anyhow::Result;
use backpack_trader::backpack::Side;
use backpack_trader::trader::{self, Trader};
use rust_decimal::Decimal;
use tracing::info;

use super::{load_config, public_client, signed_client};

pub async fn run(
    config_path: String,
    cycles_override: Option<u32>,
    interval_override: Option<u64>,
) -> Result<()> {
    info!("Starting trading loop");

    let mut config = load_config(&config_path)?;

    if let Some(cycles) = cycles_override {
        info!("Overriding cycles to: {}", cycles);
        config.trading.cycles = Some(cycles);
    }

    if let Some(interval) = interval_override {
        info!("Overriding interval to: {}s", interval);
        config.trading.interval_secs = interval;
    }

    let client = signed_client(&config)?;
    let public = public_client(&config)?;

    info!(
        "Market: {} | Side: {} | Amount: {} | Limit: {}% of index | SL: {}% | TP: {}%",
        config.trading.symbol,
        config.trading.side,
        config.trading.amount,
        config.trading.limit_price_pct,
        config.trading.stop_loss_pct,
        config.trading.take_profit_pct
    );

    let trader = Trader::new(client, public, config.trading);
    trader.prepare().await?;

    let summary = trader.run().await;
    if summary.placed == 0 && summary.failed > 0 {
        anyhow::bail!("No orders placed in {} cycles", summary.cycles);
    }
    Ok(())
}

pub async fn market(config_path: &str, symbol: &str, side: Side, amount: Decimal) -> Result<()> {
    let config = load_config(config_path)?;
    let client = signed_client(&config)?;

    let summary = trader::market_order(&client, symbol, side, amount).await?;
    info!("{}", summary);
    println!("{}", summary);
    Ok(())
}
