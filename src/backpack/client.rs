//! Authenticated Backpack API client
//!
//! The client owns the credentials and the HTTP connection pool for its whole
//! lifetime. Every call builds a fresh signature with the current timestamp;
//! nothing about a request is reused for the next one.
//!
//! # Example
//!
//! ```no_run
//! use backpack_trader::backpack::{BackpackClient, Credentials, OrderIntent, Side};
//! use rust_decimal_macros::dec;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = Credentials::new("api_key", "base64_private_key")?;
//!     let client = BackpackClient::new(credentials)?;
//!
//!     let order = OrderIntent::limit(Side::Bid, "SOL_USDC", dec!(120), dec!(0.5))
//!         .with_post_only(true);
//!     let response = client.execute_order_with_retry(&order).await?;
//!     println!("{}", response);
//!     Ok(())
//! }
//! ```

use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use super::auth::{Credentials, DEFAULT_WINDOW_MS};
use super::error::BackpackResult;
use super::instruction::Instruction;
use super::order::{OrderIntent, OrderOutcome};
use super::retry::{with_retry, RetryPolicy};
use super::transport::{ApiResponse, Transport};
use super::types::*;

/// Base URL for the Backpack REST API
pub const API_BASE_URL: &str = "https://api.backpack.exchange/";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Validity window sent with every signed request (ms)
    pub window_ms: u64,
    /// Request timeout duration
    pub timeout: Duration,
    /// Retry policy for order submission
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            window_ms: DEFAULT_WINDOW_MS,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_window(mut self, window_ms: u64) -> Self {
        self.window_ms = window_ms;
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Backpack Exchange API Client
#[derive(Debug, Clone)]
pub struct BackpackClient {
    credentials: Credentials,
    transport: Transport,
    window_ms: u64,
    retry: RetryPolicy,
}

impl BackpackClient {
    /// Create a new client with default configuration
    pub fn new(credentials: Credentials) -> BackpackResult<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> BackpackResult<Self> {
        Ok(Self {
            credentials,
            transport: Transport::new(config.base_url, config.timeout)?,
            window_ms: config.window_ms,
            retry: config.retry,
        })
    }

    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Sign and send one request for `instruction`
    pub async fn send(&self, instruction: Instruction, params: Params) -> BackpackResult<ApiResponse> {
        let timestamp = Utc::now().timestamp_millis();
        let headers = self
            .credentials
            .sign(instruction.tag(), &params, timestamp, self.window_ms);
        debug!("Signed {} at {}", instruction, timestamp);

        self.transport
            .send(
                instruction.method(),
                instruction.path(),
                Some(&headers),
                Some(&params),
            )
            .await
    }

    // ==================== ACCOUNT ====================

    /// Get account settings
    pub async fn get_account(&self) -> BackpackResult<Value> {
        self.send(Instruction::AccountQuery, Params::new())
            .await?
            .into_json()
    }

    /// Update account settings. Only the fields that are set are sent.
    pub async fn update_account(&self, update: &AccountUpdate) -> BackpackResult<()> {
        self.send(Instruction::AccountUpdate, update.to_params())
            .await?;
        info!("Account settings updated: {:?}", update);
        Ok(())
    }

    /// Get account balances keyed by asset symbol
    pub async fn get_balances(&self) -> BackpackResult<HashMap<String, Balance>> {
        Ok(self
            .send(Instruction::BalanceQuery, Params::new())
            .await?
            .into_optional_json()?
            .unwrap_or_default())
    }

    /// Get maximum order quantity for a symbol and side
    pub async fn get_max_order_quantity(&self, query: &MaxOrderQuantityQuery) -> BackpackResult<Value> {
        self.send(Instruction::MaxOrderQuantity, query.to_params())
            .await?
            .into_json()
    }

    // ==================== ORDERS ====================

    /// Get all open orders, optionally for one market
    pub async fn get_open_orders(&self, symbol: Option<&str>) -> BackpackResult<Vec<OpenOrder>> {
        let mut params = Params::new();
        if let Some(symbol) = symbol {
            params.insert("symbol".into(), symbol.into());
        }

        Ok(self
            .send(Instruction::OrderQueryAll, params)
            .await?
            .into_optional_json()?
            .unwrap_or_default())
    }

    /// Cancel an open order by order id or client id.
    ///
    /// The exchange rejects the request if both or neither are given.
    pub async fn cancel_open_order(
        &self,
        symbol: &str,
        order_id: Option<&str>,
        client_id: Option<u32>,
    ) -> BackpackResult<ApiResponse> {
        let mut params = Params::new();
        params.insert("symbol".into(), symbol.into());
        if let Some(id) = client_id {
            params.insert("clientId".into(), id.into());
        }
        if let Some(id) = order_id {
            params.insert("orderId".into(), id.into());
        }

        self.send(Instruction::OrderCancel, params).await
    }

    /// Submit an order once. Any 2xx is an accepted order, even when the body
    /// does not decode.
    pub async fn execute_order(&self, order: &OrderIntent) -> BackpackResult<OrderOutcome> {
        info!(
            "Submitting {} {} order on {}",
            order.side,
            order.order_type().as_str(),
            order.symbol
        );

        let response = self.send(Instruction::OrderExecute, order.to_params()).await?;
        Ok(OrderOutcome::from_response(response))
    }

    /// Submit an order, retrying "would immediately match" rejections per the
    /// client's retry policy
    pub async fn execute_order_with_retry(&self, order: &OrderIntent) -> BackpackResult<OrderOutcome> {
        with_retry(&self.retry, || self.execute_order(order)).await
    }

    // ==================== POSITIONS ====================

    /// Get open futures positions
    pub async fn get_open_positions(&self) -> BackpackResult<Vec<Position>> {
        Ok(self
            .send(Instruction::PositionQuery, Params::new())
            .await?
            .into_optional_json()?
            .unwrap_or_default())
    }

    /// Get realized PnL history
    pub async fn get_pnl_history(&self, query: &PnlHistoryQuery) -> BackpackResult<Value> {
        self.send(Instruction::PnlHistoryQueryAll, query.to_params())
            .await?
            .into_json()
    }
}
