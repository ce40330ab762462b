//! Read-only account queries and housekeeping commands

use anyhow::Result;
use backpack_trader::trader;
use tracing::info;

use super::{load_config, public_client, signed_client};

pub async fn show_account(config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let client = signed_client(&config)?;

    let account = client.get_account().await?;
    println!("{}", serde_json::to_string_pretty(&account)?);
    Ok(())
}

pub async fn show_balances(config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let client = signed_client(&config)?;

    let balances = client.get_balances().await?;
    if balances.is_empty() {
        println!("No balances.");
        return Ok(());
    }

    let mut assets: Vec<_> = balances.into_iter().collect();
    assets.sort_by(|a, b| a.0.cmp(&b.0));

    println!("{:<10} {:>18} {:>18} {:>18}", "Asset", "Available", "Locked", "Staked");
    for (asset, balance) in assets {
        println!(
            "{:<10} {:>18} {:>18} {:>18}",
            asset, balance.available, balance.locked, balance.staked
        );
    }
    Ok(())
}

pub async fn show_orders(config_path: &str, symbol: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let client = signed_client(&config)?;

    let orders = client.get_open_orders(symbol).await?;
    info!("{} open orders", orders.len());
    println!("{}", serde_json::to_string_pretty(&orders)?);
    Ok(())
}

pub async fn show_positions(config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let client = signed_client(&config)?;

    let positions = client.get_open_positions().await?;
    info!("{} open positions", positions.len());
    println!("{}", serde_json::to_string_pretty(&positions)?);
    Ok(())
}

pub async fn show_price(config_path: &str, symbol: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let public = public_client(&config)?;

    for price in public.get_mark_price(symbol).await? {
        println!(
            "{}: mark={} index={}",
            price.symbol, price.mark_price, price.index_price
        );
    }
    Ok(())
}

pub async fn cancel_all(config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let client = signed_client(&config)?;

    let cancelled = trader::close_all_orders(&client).await?;
    println!("Cancelled {} orders", cancelled);
    Ok(())
}

pub async fn close_positions(config_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let client = signed_client(&config)?;

    let closed = trader::close_all_positions(&client).await?;
    println!("Closed {} positions", closed);
    Ok(())
}
