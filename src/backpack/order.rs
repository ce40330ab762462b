//! Order intents and the payload builder for order execution
//!
//! An [`OrderIntent`] carries exactly what the caller asked for. The builder
//! turns it into the smallest parameter set the exchange accepts and does not
//! try to validate combinations: a market order with both `quantity` and
//! `quoteQuantity` is sent as-is and the exchange decides.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::warn;

use super::transport::ApiResponse;
use super::types::{OrderResponse, OrderType, Params, SelfTradePrevention, Side, TimeInForce};

/// Order-type specific fields
#[derive(Debug, Clone, PartialEq)]
pub enum OrderKind {
    Limit {
        price: Decimal,
        quantity: Decimal,
        /// When set, `postOnly` is not sent
        time_in_force: Option<TimeInForce>,
        post_only: bool,
    },
    Market {
        quantity: Option<Decimal>,
        quote_quantity: Option<Decimal>,
    },
}

impl OrderKind {
    pub fn order_type(&self) -> OrderType {
        match self {
            OrderKind::Limit { .. } => OrderType::Limit,
            OrderKind::Market { .. } => OrderType::Market,
        }
    }
}

/// Optional risk and behaviour flags. `None` means "not sent", which the
/// exchange treats differently from an explicit `false` or zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderOptions {
    pub client_id: Option<u32>,
    pub self_trade_prevention: Option<SelfTradePrevention>,
    pub trigger_price: Option<Decimal>,
    pub reduce_only: Option<bool>,
    pub auto_borrow: Option<bool>,
    pub auto_borrow_repay: Option<bool>,
    pub auto_lend: Option<bool>,
    pub auto_lend_redeem: Option<bool>,
    pub stop_loss_trigger_price: Option<Decimal>,
    pub stop_loss_limit_price: Option<Decimal>,
    pub take_profit_trigger_price: Option<Decimal>,
    pub take_profit_limit_price: Option<Decimal>,
    pub trigger_quantity: Option<Decimal>,
}

/// A strategy-level order request
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub options: OrderOptions,
}

impl OrderIntent {
    /// Limit order, `postOnly=false` unless changed
    pub fn limit(side: Side, symbol: impl Into<String>, price: Decimal, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::Limit {
                price,
                quantity,
                time_in_force: None,
                post_only: false,
            },
            options: OrderOptions::default(),
        }
    }

    /// Market order sized in base asset
    pub fn market(side: Side, symbol: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::Market {
                quantity: Some(quantity),
                quote_quantity: None,
            },
            options: OrderOptions::default(),
        }
    }

    /// Market order sized in quote asset
    pub fn market_quote(side: Side, symbol: impl Into<String>, quote_quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::Market {
                quantity: None,
                quote_quantity: Some(quote_quantity),
            },
            options: OrderOptions::default(),
        }
    }

    /// Only post liquidity. Has no effect on market orders.
    pub fn with_post_only(mut self, value: bool) -> Self {
        if let OrderKind::Limit { post_only, .. } = &mut self.kind {
            *post_only = value;
        }
        self
    }

    /// Has no effect on market orders.
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        if let OrderKind::Limit { time_in_force, .. } = &mut self.kind {
            *time_in_force = Some(tif);
        }
        self
    }

    pub fn with_client_id(mut self, client_id: u32) -> Self {
        self.options.client_id = Some(client_id);
        self
    }

    pub fn with_reduce_only(mut self, reduce_only: bool) -> Self {
        self.options.reduce_only = Some(reduce_only);
        self
    }

    pub fn with_self_trade_prevention(mut self, stp: SelfTradePrevention) -> Self {
        self.options.self_trade_prevention = Some(stp);
        self
    }

    pub fn with_stop_loss(mut self, trigger: Decimal, limit: Option<Decimal>) -> Self {
        self.options.stop_loss_trigger_price = Some(trigger);
        self.options.stop_loss_limit_price = limit;
        self
    }

    pub fn with_take_profit(mut self, trigger: Decimal, limit: Option<Decimal>) -> Self {
        self.options.take_profit_trigger_price = Some(trigger);
        self.options.take_profit_limit_price = limit;
        self
    }

    pub fn with_options(mut self, options: OrderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn order_type(&self) -> OrderType {
        self.kind.order_type()
    }

    /// Build the `orderExecute` parameter set
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("orderType".into(), self.order_type().as_str().into());
        params.insert("symbol".into(), self.symbol.clone().into());
        params.insert("side".into(), self.side.as_str().into());

        match &self.kind {
            OrderKind::Limit {
                price,
                quantity,
                time_in_force,
                post_only,
            } => {
                params.insert("price".into(), decimal(*price));
                params.insert("quantity".into(), decimal(*quantity));
                match time_in_force {
                    Some(tif) => {
                        params.insert("timeInForce".into(), tif.as_str().into());
                    }
                    None => {
                        params.insert("postOnly".into(), (*post_only).into());
                    }
                }
            }
            OrderKind::Market {
                quantity,
                quote_quantity,
            } => {
                if let Some(q) = quantity {
                    params.insert("quantity".into(), decimal(*q));
                }
                if let Some(q) = quote_quantity {
                    params.insert("quoteQuantity".into(), decimal(*q));
                }
            }
        }

        let o = &self.options;
        if let Some(id) = o.client_id {
            params.insert("clientId".into(), id.into());
        }
        if let Some(stp) = o.self_trade_prevention {
            params.insert("selfTradePrevention".into(), stp.as_str().into());
        }

        let flags = [
            ("reduceOnly", o.reduce_only),
            ("autoBorrow", o.auto_borrow),
            ("autoBorrowRepay", o.auto_borrow_repay),
            ("autoLend", o.auto_lend),
            ("autoLendRedeem", o.auto_lend_redeem),
        ];
        for (key, flag) in flags {
            if let Some(value) = flag {
                params.insert(key.into(), value.into());
            }
        }

        let prices = [
            ("triggerPrice", o.trigger_price),
            ("stopLossTriggerPrice", o.stop_loss_trigger_price),
            ("stopLossLimitPrice", o.stop_loss_limit_price),
            ("takeProfitTriggerPrice", o.take_profit_trigger_price),
            ("takeProfitLimitPrice", o.take_profit_limit_price),
            ("triggerQuantity", o.trigger_quantity),
        ];
        for (key, price) in prices {
            if let Some(value) = price {
                params.insert(key.into(), decimal(value));
            }
        }

        params
    }
}

fn decimal(value: Decimal) -> Value {
    Value::String(value.normalize().to_string())
}

/// An order the exchange accepted.
///
/// Any 2xx answer to `orderExecute` means the order exists on the exchange,
/// whether or not its body decodes. `AcceptedRaw` keeps bodies that did not.
#[derive(Debug, Clone)]
pub enum OrderOutcome {
    Accepted(OrderResponse),
    AcceptedRaw(ApiResponse),
}

impl OrderOutcome {
    pub fn from_response(response: ApiResponse) -> Self {
        match response {
            ApiResponse::Json(value) => match OrderResponse::deserialize(&value) {
                Ok(order) => OrderOutcome::Accepted(order),
                Err(e) => {
                    warn!("Order accepted, response did not decode ({}): {}", e, value);
                    OrderOutcome::AcceptedRaw(ApiResponse::Json(value))
                }
            },
            other => {
                warn!("Order accepted with non-JSON response: {:?}", other);
                OrderOutcome::AcceptedRaw(other)
            }
        }
    }

    pub fn order(&self) -> Option<&OrderResponse> {
        match self {
            OrderOutcome::Accepted(order) => Some(order),
            OrderOutcome::AcceptedRaw(_) => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.order().map(|o| o.id.as_str())
    }

    pub fn status(&self) -> Option<&str> {
        self.order().map(|o| o.status.as_str())
    }

    pub fn executed_quantity(&self) -> Option<Decimal> {
        self.order().and_then(|o| o.executed_quantity)
    }
}

impl fmt::Display for OrderOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderOutcome::Accepted(order) => write!(
                f,
                "Ordered: {} - Status: {} - Executed: {}",
                order.id,
                order.status,
                order.executed_quantity.unwrap_or(Decimal::ZERO)
            ),
            OrderOutcome::AcceptedRaw(ApiResponse::Json(value)) => write!(f, "Accepted: {}", value),
            OrderOutcome::AcceptedRaw(ApiResponse::Text(text)) => write!(f, "Accepted: {}", text),
            OrderOutcome::AcceptedRaw(ApiResponse::Empty) => write!(f, "Accepted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_outcome_decodes_order_response() {
        let outcome = OrderOutcome::from_response(ApiResponse::Json(json!({
            "id": "111",
            "status": "New",
            "executedQuantity": "0.5"
        })));

        assert_eq!(outcome.id(), Some("111"));
        assert_eq!(outcome.status(), Some("New"));
        assert_eq!(outcome.executed_quantity(), Some(dec!(0.5)));
        assert_eq!(outcome.to_string(), "Ordered: 111 - Status: New - Executed: 0.5");
    }

    #[test]
    fn test_outcome_keeps_undecodable_success() {
        let text = OrderOutcome::from_response(ApiResponse::Text("accepted".to_string()));
        assert!(matches!(&text, OrderOutcome::AcceptedRaw(ApiResponse::Text(t)) if t == "accepted"));
        assert_eq!(text.id(), None);
        assert_eq!(text.to_string(), "Accepted: accepted");

        // JSON without the order fields is still an acceptance
        let partial = OrderOutcome::from_response(ApiResponse::Json(json!({"ok": true})));
        assert!(matches!(partial, OrderOutcome::AcceptedRaw(ApiResponse::Json(_))));

        let empty = OrderOutcome::from_response(ApiResponse::Empty);
        assert!(matches!(empty, OrderOutcome::AcceptedRaw(ApiResponse::Empty)));
        assert_eq!(empty.status(), None);
    }

    #[test]
    fn test_limit_defaults_to_post_only_false() {
        let params = OrderIntent::limit(Side::Bid, "SOL_USDC", dec!(142.5), dec!(0.7)).to_params();

        assert_eq!(params["orderType"], json!("Limit"));
        assert_eq!(params["symbol"], json!("SOL_USDC"));
        assert_eq!(params["side"], json!("Bid"));
        assert_eq!(params["price"], json!("142.5"));
        assert_eq!(params["quantity"], json!("0.7"));
        assert_eq!(params["postOnly"], json!(false));
        assert_eq!(params.len(), 6);
    }

    #[test]
    fn test_time_in_force_omits_post_only() {
        let params = OrderIntent::limit(Side::Ask, "SOL_USDC", dec!(150), dec!(1))
            .with_post_only(true)
            .with_time_in_force(TimeInForce::Ioc)
            .to_params();

        assert_eq!(params["timeInForce"], json!("IOC"));
        assert!(!params.contains_key("postOnly"));
    }

    #[test]
    fn test_post_only_true_is_sent() {
        let params = OrderIntent::limit(Side::Bid, "SOL_USDC", dec!(100), dec!(1))
            .with_post_only(true)
            .to_params();

        assert_eq!(params["postOnly"], json!(true));
        assert!(!params.contains_key("timeInForce"));
    }

    #[test]
    fn test_market_quantity_only() {
        let params = OrderIntent::market(Side::Ask, "SOL_USDC_PERP", dec!(2.5)).to_params();

        assert_eq!(params["orderType"], json!("Market"));
        assert_eq!(params["quantity"], json!("2.5"));
        assert!(!params.contains_key("quoteQuantity"));
        assert!(!params.contains_key("postOnly"));
        assert!(!params.contains_key("price"));
    }

    #[test]
    fn test_market_quote_quantity_only() {
        let params = OrderIntent::market_quote(Side::Bid, "ES_USDC", dec!(5)).to_params();

        assert_eq!(params["quoteQuantity"], json!("5"));
        assert!(!params.contains_key("quantity"));
    }

    #[test]
    fn test_market_with_both_quantities_passes_both() {
        let intent = OrderIntent {
            symbol: "SOL_USDC".to_string(),
            side: Side::Bid,
            kind: OrderKind::Market {
                quantity: Some(dec!(1)),
                quote_quantity: Some(dec!(150)),
            },
            options: OrderOptions::default(),
        };
        let params = intent.to_params();

        assert_eq!(params["quantity"], json!("1"));
        assert_eq!(params["quoteQuantity"], json!("150"));
    }

    #[test]
    fn test_market_with_no_quantity_sends_neither() {
        let intent = OrderIntent {
            symbol: "SOL_USDC".to_string(),
            side: Side::Bid,
            kind: OrderKind::Market {
                quantity: None,
                quote_quantity: None,
            },
            options: OrderOptions::default(),
        };
        let params = intent.to_params();

        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_unset_options_are_omitted() {
        let params = OrderIntent::market(Side::Bid, "SOL_USDC", dec!(1)).to_params();

        for key in [
            "clientId",
            "selfTradePrevention",
            "triggerPrice",
            "reduceOnly",
            "autoBorrow",
            "autoBorrowRepay",
            "autoLend",
            "autoLendRedeem",
            "stopLossTriggerPrice",
            "stopLossLimitPrice",
            "takeProfitTriggerPrice",
            "takeProfitLimitPrice",
            "triggerQuantity",
        ] {
            assert!(!params.contains_key(key), "{} should be omitted", key);
        }
    }

    #[test]
    fn test_false_flags_are_sent() {
        let options = OrderOptions {
            reduce_only: Some(false),
            auto_lend: Some(false),
            ..Default::default()
        };
        let params = OrderIntent::market(Side::Bid, "SOL_USDC", dec!(1))
            .with_options(options)
            .to_params();

        assert_eq!(params["reduceOnly"], json!(false));
        assert_eq!(params["autoLend"], json!(false));
        assert!(!params.contains_key("autoBorrow"));
    }

    #[test]
    fn test_bracket_prices() {
        let params = OrderIntent::limit(Side::Bid, "SOL_USDC_PERP", dec!(142.5), dec!(0.7))
            .with_stop_loss(dec!(139.65), None)
            .with_take_profit(dec!(149.62), Some(dec!(149.5)))
            .with_client_id(7)
            .with_self_trade_prevention(SelfTradePrevention::RejectTaker)
            .to_params();

        assert_eq!(params["stopLossTriggerPrice"], json!("139.65"));
        assert!(!params.contains_key("stopLossLimitPrice"));
        assert_eq!(params["takeProfitTriggerPrice"], json!("149.62"));
        assert_eq!(params["takeProfitLimitPrice"], json!("149.5"));
        assert_eq!(params["clientId"], json!(7));
        assert_eq!(params["selfTradePrevention"], json!("RejectTaker"));
    }

    #[test]
    fn test_decimal_rendering_drops_trailing_zeros() {
        let params = OrderIntent::limit(Side::Bid, "SOL_USDC", dec!(142.500), dec!(1.0)).to_params();

        assert_eq!(params["price"], json!("142.5"));
        assert_eq!(params["quantity"], json!("1"));
    }

    #[test]
    fn test_post_only_ignored_for_market() {
        let intent = OrderIntent::market(Side::Bid, "SOL_USDC", dec!(1)).with_post_only(true);
        assert!(!intent.to_params().contains_key("postOnly"));
    }
}
