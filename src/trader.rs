//! Limit-order trading loop and account housekeeping
//!
//! One cycle: read the index price, compute targets, submit a limit order
//! with stop loss and take profit (retrying "would immediately match"
//! rejections), then wait for the next cycle. A failed cycle means no order
//! was placed; there is never partial state to undo.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::backpack::{
    BackpackClient, OrderIntent, OrderOutcome, PublicClient, Side,
};
use crate::config::TradingConfig;
use crate::strategy::PriceTargets;

/// Counts for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u32,
    pub placed: u32,
    pub failed: u32,
}

pub struct Trader {
    client: BackpackClient,
    public: PublicClient,
    config: TradingConfig,
}

impl Trader {
    pub fn new(client: BackpackClient, public: PublicClient, config: TradingConfig) -> Self {
        Self {
            client,
            public,
            config,
        }
    }

    pub fn config(&self) -> &TradingConfig {
        &self.config
    }

    /// Apply account settings and optionally clear resting orders
    pub async fn prepare(&self) -> Result<()> {
        let update = self.config.account_update();
        if !update.is_empty() {
            self.client
                .update_account(&update)
                .await
                .context("Failed to update account settings")?;
        }

        if self.config.cancel_open_orders_on_start {
            close_all_orders(&self.client).await?;
        }

        Ok(())
    }

    /// Compute targets from the current index price and place one order.
    /// An error means no order was placed.
    pub async fn run_cycle(&self) -> Result<OrderOutcome> {
        let symbol = &self.config.symbol;
        let index_price = self
            .public
            .get_index_price(symbol)
            .await
            .with_context(|| format!("Failed to fetch index price for {}", symbol))?;
        info!("Current price of {}: {}", symbol, index_price);

        let targets = PriceTargets::compute(index_price, &self.config)?;
        info!(
            "Placing {} limit order at {} qty={} | SL={} TP={}",
            self.config.side,
            targets.limit_price,
            targets.quantity,
            targets.stop_loss_price,
            targets.take_profit_price
        );

        let order = targets.to_order(&self.config);
        let outcome = self
            .client
            .execute_order_with_retry(&order)
            .await
            .context("Order submission failed")?;

        info!("{}", outcome);
        Ok(outcome)
    }

    /// Run cycles until the configured count is reached, or forever
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        if self.config.cycles == Some(0) {
            info!("Cycle count is 0, nothing to run");
            return summary;
        }

        loop {
            summary.cycles += 1;
            info!("━━━ Trading cycle {} ━━━", summary.cycles);

            match self.run_cycle().await {
                Ok(_) => summary.placed += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!("No order placed: {:#}", e);
                }
            }

            if let Some(limit) = self.config.cycles {
                if summary.cycles >= limit {
                    break;
                }
            }

            countdown(self.config.interval()).await;
        }

        info!(
            "Finished {} cycles: {} placed, {} failed",
            summary.cycles, summary.placed, summary.failed
        );
        summary
    }
}

/// Sleep for `duration`, logging the time left every ten seconds
pub async fn countdown(duration: Duration) {
    let mut remaining = duration.as_secs();
    if remaining == 0 {
        sleep(duration).await;
        return;
    }

    while remaining > 0 {
        if remaining % 10 == 0 {
            info!("Next cycle in {}s", remaining);
        } else {
            debug!("Next cycle in {}s", remaining);
        }
        sleep(Duration::from_secs(1)).await;
        remaining -= 1;
    }
}

/// Cancel every open order. Returns the number cancelled.
pub async fn close_all_orders(client: &BackpackClient) -> Result<usize> {
    let open_orders = client
        .get_open_orders(None)
        .await
        .context("Failed to list open orders")?;

    if open_orders.is_empty() {
        info!("No open order to close.");
        return Ok(0);
    }

    let mut cancelled = 0;
    for order in &open_orders {
        match client
            .cancel_open_order(&order.symbol, Some(&order.id), None)
            .await
        {
            Ok(_) => {
                cancelled += 1;
                info!("Cancelled order: {}, ID: {}", order.symbol, order.id);
            }
            Err(e) => warn!("Failed to cancel {} {}: {}", order.symbol, order.id, e),
        }
    }

    Ok(cancelled)
}

/// Flatten every open position with a reduce-only market order on the
/// opposite side. Returns the number of positions closed.
pub async fn close_all_positions(client: &BackpackClient) -> Result<usize> {
    let positions = client
        .get_open_positions()
        .await
        .context("Failed to list open positions")?;

    let open: Vec<_> = positions
        .iter()
        .filter(|p| !p.net_quantity.is_zero())
        .collect();
    if open.is_empty() {
        info!("No open positions to close.");
        return Ok(0);
    }

    let mut closed = 0;
    for position in open {
        let side = if position.net_quantity > Decimal::ZERO {
            Side::Ask
        } else {
            Side::Bid
        };
        info!(
            "Closing position: {}, netQuantity: {}, side: {}",
            position.symbol, position.net_quantity, side
        );

        let order = OrderIntent::market(side, &position.symbol, position.net_quantity.abs())
            .with_reduce_only(true);
        match client.execute_order(&order).await {
            Ok(outcome) => {
                closed += 1;
                info!(
                    "Closed position status: {}",
                    outcome.status().unwrap_or("accepted")
                );
            }
            Err(e) => error!("Failed to close {}: {}", position.symbol, e),
        }
    }

    Ok(closed)
}

/// One-shot market order sized in quote currency. Returns a summary line.
pub async fn market_order(
    client: &BackpackClient,
    symbol: &str,
    side: Side,
    quote_quantity: Decimal,
) -> Result<String> {
    let order = OrderIntent::market_quote(side, symbol, quote_quantity);
    let outcome = client
        .execute_order(&order)
        .await
        .with_context(|| format!("Market {} on {} failed", side, symbol))?;

    let base = symbol.split('_').next().unwrap_or(symbol);
    Ok(match outcome.order() {
        Some(response) => format!(
            "Ordered: {} - Status: {} - {} {} quote for {} {}",
            response.id,
            response.status,
            side,
            quote_quantity,
            response.executed_quantity.unwrap_or(Decimal::ZERO),
            base
        ),
        None => format!("{} - {} {} quote of {}", outcome, side, quote_quantity, base),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_countdown_waits_full_duration() {
        let start = Instant::now();
        countdown(Duration::from_secs(12)).await;
        assert_eq!(start.elapsed().as_secs(), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_zero() {
        let start = Instant::now();
        countdown(Duration::ZERO).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_run_summary_default() {
        assert_eq!(
            RunSummary::default(),
            RunSummary {
                cycles: 0,
                placed: 0,
                failed: 0
            }
        );
    }
}
