//! Price targets for the limit-order loop
//!
//! Each cycle places one limit order a fixed percentage away from the index
//! price, with a stop loss and take profit attached as trigger prices.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::backpack::{OrderIntent, Side};
use crate::config::TradingConfig;

#[derive(Debug, Error, PartialEq)]
pub enum TargetError {
    #[error("index price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("limit price rounds to {0}, cannot size the order")]
    NonPositiveLimit(Decimal),

    #[error("amount {amount} at price {price} rounds to a zero quantity")]
    ZeroQuantity { amount: Decimal, price: Decimal },
}

/// Truncate a price to the precision the exchange tick sizes allow:
/// one decimal from 1,000,000 up, between one and four decimals from 1 up
/// (fewer as the integer part grows), untouched below 1.
pub fn format_decimal(num: Decimal) -> Decimal {
    if num >= dec!(1000000) {
        num.round_dp_with_strategy(1, RoundingStrategy::ToZero)
    } else if num >= Decimal::ONE {
        let integer_digits = num.trunc().to_string().len() as u32;
        let places = 5u32.saturating_sub(integer_digits).clamp(1, 4);
        num.round_dp_with_strategy(places, RoundingStrategy::ToZero)
    } else {
        num
    }
}

/// Prices and size for one cycle
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTargets {
    pub limit_price: Decimal,
    pub stop_loss_price: Decimal,
    pub take_profit_price: Decimal,
    pub quantity: Decimal,
}

impl PriceTargets {
    pub fn compute(index_price: Decimal, config: &TradingConfig) -> Result<Self, TargetError> {
        if index_price <= Decimal::ZERO {
            return Err(TargetError::NonPositivePrice(index_price));
        }

        let hundred = Decimal::ONE_HUNDRED;
        let limit_price = format_decimal(index_price * config.limit_price_pct / hundred);
        if limit_price <= Decimal::ZERO {
            return Err(TargetError::NonPositiveLimit(limit_price));
        }

        let stop_offset = config.stop_loss_pct / hundred;
        let profit_offset = config.take_profit_pct / hundred;
        let (stop_loss, take_profit) = match config.side {
            Side::Bid => (
                limit_price * (Decimal::ONE - stop_offset),
                limit_price * (Decimal::ONE + profit_offset),
            ),
            Side::Ask => (
                limit_price * (Decimal::ONE + stop_offset),
                limit_price * (Decimal::ONE - profit_offset),
            ),
        };

        let quantity = (config.amount / limit_price)
            .round_dp_with_strategy(config.quantity_decimals, RoundingStrategy::ToZero);
        if quantity <= Decimal::ZERO {
            return Err(TargetError::ZeroQuantity {
                amount: config.amount,
                price: limit_price,
            });
        }

        Ok(Self {
            limit_price,
            stop_loss_price: format_decimal(stop_loss),
            take_profit_price: format_decimal(take_profit),
            quantity,
        })
    }

    /// Limit order carrying the stop loss and take profit triggers
    pub fn to_order(&self, config: &TradingConfig) -> OrderIntent {
        OrderIntent::limit(config.side, &config.symbol, self.limit_price, self.quantity)
            .with_post_only(config.post_only)
            .with_stop_loss(self.stop_loss_price, None)
            .with_take_profit(self.take_profit_price, None)
    }
}
