//! Backpack API request and response types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request parameters, keyed by the exchange's field names.
///
/// Optional fields that were not provided are never inserted, so the map
/// holds no nulls.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Buy
    Bid,
    /// Sell
    Ask,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "Bid",
            Side::Ask => "Ask",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "Market",
            OrderType::Limit => "Limit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled
    #[serde(rename = "GTC")]
    Gtc,
    /// Immediate or cancel
    #[serde(rename = "IOC")]
    Ioc,
    /// Fill or kill
    #[serde(rename = "FOK")]
    Fok,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

/// Action taken when an order would cross another order of the same account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfTradePrevention {
    RejectTaker,
    RejectMaker,
    RejectBoth,
    Allow,
}

impl SelfTradePrevention {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelfTradePrevention::RejectTaker => "RejectTaker",
            SelfTradePrevention::RejectMaker => "RejectMaker",
            SelfTradePrevention::RejectBoth => "RejectBoth",
            SelfTradePrevention::Allow => "Allow",
        }
    }
}

/// Error document returned with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Response to order execution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub order_type: Option<OrderType>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub executed_quantity: Option<Decimal>,
    #[serde(default)]
    pub executed_quote_quantity: Option<Decimal>,
    #[serde(default)]
    pub stop_loss_trigger_price: Option<Decimal>,
    #[serde(default)]
    pub stop_loss_limit_price: Option<Decimal>,
    #[serde(default)]
    pub take_profit_trigger_price: Option<Decimal>,
    #[serde(default)]
    pub take_profit_limit_price: Option<Decimal>,
    #[serde(default)]
    pub client_id: Option<u32>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Resting order as returned by the open orders query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrder {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub side: Option<Side>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub client_id: Option<u32>,
}

/// Balance of one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub available: Decimal,
    pub locked: Decimal,
    #[serde(default)]
    pub staked: Decimal,
}

/// Futures position summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub net_quantity: Decimal,
    #[serde(default)]
    pub entry_price: Option<Decimal>,
    #[serde(default)]
    pub mark_price: Option<Decimal>,
    #[serde(default)]
    pub pnl_unrealized: Option<Decimal>,
}

/// Mark price, index price and funding rate of a market
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPrice {
    pub symbol: String,
    pub index_price: Decimal,
    pub mark_price: Decimal,
    #[serde(default)]
    pub funding_rate: Option<Decimal>,
    #[serde(default)]
    pub next_funding_timestamp: Option<i64>,
}

/// Account settings update. Only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_borrow_settlements: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_lend: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_realize_pnl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_repay_borrows: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leverage_limit: Option<String>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        *self == AccountUpdate::default()
    }

    pub fn to_params(&self) -> Params {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => Params::new(),
        }
    }
}

/// Query for realized PnL history
#[derive(Debug, Clone, PartialEq)]
pub struct PnlHistoryQuery {
    pub subaccount_id: Option<u32>,
    pub symbol: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for PnlHistoryQuery {
    fn default() -> Self {
        Self {
            subaccount_id: None,
            symbol: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl PnlHistoryQuery {
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("limit".into(), self.limit.into());
        params.insert("offset".into(), self.offset.into());
        if let Some(id) = self.subaccount_id {
            params.insert("subaccountId".into(), id.into());
        }
        if let Some(symbol) = &self.symbol {
            params.insert("symbol".into(), symbol.clone().into());
        }
        params
    }
}

/// Query for the maximum order quantity the account can place
#[derive(Debug, Clone, PartialEq)]
pub struct MaxOrderQuantityQuery {
    pub symbol: String,
    pub side: Side,
    pub price: Option<Decimal>,
    pub reduce_only: Option<bool>,
    pub auto_borrow: Option<bool>,
    pub auto_borrow_repay: Option<bool>,
    pub auto_lend_redeem: Option<bool>,
}

impl MaxOrderQuantityQuery {
    pub fn new(symbol: impl Into<String>, side: Side) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            price: None,
            reduce_only: None,
            auto_borrow: None,
            auto_borrow_repay: None,
            auto_lend_redeem: None,
        }
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params.insert("symbol".into(), self.symbol.clone().into());
        params.insert("side".into(), self.side.as_str().into());
        if let Some(price) = self.price {
            params.insert("price".into(), price.to_string().into());
        }
        let flags = [
            ("reduceOnly", self.reduce_only),
            ("autoBorrow", self.auto_borrow),
            ("autoBorrowRepay", self.auto_borrow_repay),
            ("autoLendRedeem", self.auto_lend_redeem),
        ];
        for (key, flag) in flags {
            if let Some(value) = flag {
                params.insert(key.into(), value.into());
            }
        }
        params
    }
}
