//! Endpoint table for authenticated requests
//!
//! Every signed endpoint is identified by an instruction tag that goes into the
//! signing payload. The tag names the operation, not the URL: `api/v1/order`
//! is `orderExecute` for POST and `orderCancel` for DELETE.

use reqwest::Method;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    AccountQuery,
    AccountUpdate,
    BalanceQuery,
    OrderQueryAll,
    OrderCancel,
    OrderExecute,
    PositionQuery,
    PnlHistoryQueryAll,
    MaxOrderQuantity,
}

impl Instruction {
    /// Tag used in the `instruction=` segment of the signing payload
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AccountQuery => "accountQuery",
            Self::AccountUpdate => "accountUpdate",
            Self::BalanceQuery => "balanceQuery",
            Self::OrderQueryAll => "orderQueryAll",
            Self::OrderCancel => "orderCancel",
            Self::OrderExecute => "orderExecute",
            Self::PositionQuery => "positionQuery",
            Self::PnlHistoryQueryAll => "pnlHistoryQueryAll",
            Self::MaxOrderQuantity => "maxOrderQuantity",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Self::AccountUpdate => Method::PATCH,
            Self::OrderCancel => Method::DELETE,
            Self::OrderExecute => Method::POST,
            Self::AccountQuery
            | Self::BalanceQuery
            | Self::OrderQueryAll
            | Self::PositionQuery
            | Self::PnlHistoryQueryAll
            | Self::MaxOrderQuantity => Method::GET,
        }
    }

    /// Path relative to the API base URL
    pub fn path(&self) -> &'static str {
        match self {
            Self::AccountQuery | Self::AccountUpdate => "api/v1/account",
            Self::BalanceQuery => "api/v1/capital",
            Self::OrderQueryAll => "api/v1/orders",
            Self::OrderCancel | Self::OrderExecute => "api/v1/order",
            Self::PositionQuery => "api/v1/position",
            Self::PnlHistoryQueryAll => "wapi/v1/history/pnl",
            Self::MaxOrderQuantity => "api/v1/account/limits/order",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
