//! Public market data
//!
//! Unsigned GET requests. Responses go through the same classification as
//! authenticated ones, so error handling is identical.

use serde_json::Value;
use std::time::Duration;

use super::client::API_BASE_URL;
use super::error::{BackpackError, BackpackResult};
use super::transport::{ApiResponse, Transport};
use super::types::{MarkPrice, Params};

#[derive(Debug, Clone)]
pub struct PublicClient {
    transport: Transport,
}

impl PublicClient {
    pub fn new() -> BackpackResult<Self> {
        Self::with_base_url(API_BASE_URL, Duration::from_secs(30))
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> BackpackResult<Self> {
        Ok(Self {
            transport: Transport::new(base_url, timeout)?,
        })
    }

    async fn get(&self, path: &str, params: Option<Params>) -> BackpackResult<ApiResponse> {
        self.transport
            .send(reqwest::Method::GET, path, None, params.as_ref())
            .await
    }

    async fn get_json(&self, path: &str, params: Option<Params>) -> BackpackResult<Value> {
        Ok(self
            .get(path, params)
            .await?
            .into_optional_json()?
            .unwrap_or(Value::Null))
    }

    // ==================== ASSETS ====================

    pub async fn get_assets(&self) -> BackpackResult<Value> {
        self.get_json("api/v1/assets", None).await
    }

    /// Collateral parameters for assets
    pub async fn get_collateral(&self) -> BackpackResult<Value> {
        self.get_json("api/v1/collateral", None).await
    }

    // ==================== MARKETS ====================

    pub async fn get_markets(&self) -> BackpackResult<Value> {
        self.get_json("api/v1/markets", None).await
    }

    pub async fn get_market(&self, symbol: &str) -> BackpackResult<Value> {
        self.get_json("api/v1/market", Some(symbol_param(symbol)))
            .await
    }

    /// Order book depth for a market
    pub async fn get_depth(&self, symbol: &str) -> BackpackResult<Value> {
        self.get_json("api/v1/depth", Some(symbol_param(symbol)))
            .await
    }

    /// K-lines from `start_time` (seconds) to `end_time`, or to now
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        start_time: i64,
        end_time: Option<i64>,
    ) -> BackpackResult<Value> {
        let mut params = symbol_param(symbol);
        params.insert("interval".into(), interval.into());
        params.insert("startTime".into(), start_time.into());
        if let Some(end) = end_time {
            params.insert("endTime".into(), end.into());
        }
        self.get_json("api/v1/klines", Some(params)).await
    }

    /// Mark price, index price and funding rate
    pub async fn get_mark_price(&self, symbol: &str) -> BackpackResult<Vec<MarkPrice>> {
        self.get("api/v1/markPrices", Some(symbol_param(symbol)))
            .await?
            .into_json()
    }

    /// Index price of a market, taken from the first mark price entry
    pub async fn get_index_price(&self, symbol: &str) -> BackpackResult<rust_decimal::Decimal> {
        self.get_mark_price(symbol)
            .await?
            .into_iter()
            .next()
            .map(|m| m.index_price)
            .ok_or_else(|| BackpackError::Decode(format!("no mark price returned for {}", symbol)))
    }

    pub async fn get_open_interest(&self, symbol: &str) -> BackpackResult<Value> {
        self.get_json("api/v1/openInterest", Some(symbol_param(symbol)))
            .await
    }

    /// Funding interval rate history for futures
    pub async fn get_funding_interval_rates(
        &self,
        symbol: &str,
        limit: u32,
        offset: u32,
    ) -> BackpackResult<Value> {
        let mut params = symbol_param(symbol);
        params.insert("limit".into(), limit.into());
        params.insert("offset".into(), offset.into());
        self.get_json("api/v1/fundingRates", Some(params)).await
    }

    // ==================== SYSTEM ====================

    pub async fn get_status(&self) -> BackpackResult<Value> {
        self.get_json("api/v1/status", None).await
    }

    /// Responds with `pong`
    pub async fn send_ping(&self) -> BackpackResult<String> {
        Ok(match self.get("api/v1/ping", None).await? {
            ApiResponse::Text(text) => text,
            ApiResponse::Json(value) => render(value),
            ApiResponse::Empty => String::new(),
        })
    }

    /// Server time in milliseconds, as returned by the exchange
    pub async fn get_system_time(&self) -> BackpackResult<String> {
        Ok(match self.get("api/v1/time", None).await? {
            ApiResponse::Text(text) => text,
            ApiResponse::Json(value) => render(value),
            ApiResponse::Empty => String::new(),
        })
    }

    // ==================== TRADES ====================

    /// Most recent public trades (max 1000)
    pub async fn get_recent_trades(&self, symbol: &str, limit: u32) -> BackpackResult<Value> {
        let mut params = symbol_param(symbol);
        params.insert("limit".into(), limit.into());
        self.get_json("api/v1/trades", Some(params)).await
    }

    pub async fn get_historical_trades(
        &self,
        symbol: &str,
        limit: u32,
        offset: u32,
    ) -> BackpackResult<Value> {
        let mut params = symbol_param(symbol);
        params.insert("limit".into(), limit.into());
        params.insert("offset".into(), offset.into());
        self.get_json("api/v1/trades/history", Some(params)).await
    }

    // ==================== BORROW LEND ====================

    pub async fn get_borrow_lend_markets(&self) -> BackpackResult<Value> {
        self.get_json("api/v1/borrowLend/markets", None).await
    }

    /// `interval` is one of `1d`, `1w`, `1month`, `1year`
    pub async fn get_borrow_lend_market_history(
        &self,
        interval: &str,
        symbol: Option<&str>,
    ) -> BackpackResult<Value> {
        let mut params = Params::new();
        params.insert("interval".into(), interval.into());
        if let Some(symbol) = symbol {
            params.insert("symbol".into(), symbol.into());
        }
        self.get_json("api/v1/borrowLend/markets/history", Some(params))
            .await
    }
}

fn symbol_param(symbol: &str) -> Params {
    let mut params = Params::new();
    params.insert("symbol".into(), symbol.into());
    params
}

fn render(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_symbol_param() {
        let params = symbol_param("SOL_USDC");
        assert_eq!(params.len(), 1);
        assert_eq!(params["symbol"], json!("SOL_USDC"));
    }

    #[test]
    fn test_render() {
        assert_eq!(render(json!("pong")), "pong");
        assert_eq!(render(json!(1700000000000i64)), "1700000000000");
    }
}
