//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable support for API credentials. The trader receives a `Config` value
//! at startup; the exchange client never reads configuration on its own.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::backpack::{
    AccountUpdate, ClientConfig, Credentials, RetryPolicy, Side, API_BASE_URL,
    DEFAULT_WINDOW_MS, IMMEDIATE_MATCH_CODE,
};

pub const API_KEY_ENV: &str = "BACKPACK_API_KEY";
pub const API_SECRET_ENV: &str = "BACKPACK_API_SECRET";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub trading: TradingConfig,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file {}", path.as_ref().display())
        })?;
        let mut config = Self::from_json(&contents)?;

        // Load API credentials from environment if not set
        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            config.exchange.api_key = Some(api_key);
        }
        if let Ok(api_secret) = std::env::var(API_SECRET_ENV) {
            config.exchange.api_secret = Some(api_secret);
        }

        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse config JSON")
    }
}

/// Exchange configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    pub base_url: String,
    /// Signature validity window (ms)
    pub window_ms: u64,
    pub timeout_secs: u64,
    /// Order submission attempts, the first one included
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    /// API error code retried on order submission
    pub recoverable_code: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        ExchangeConfig {
            api_key: None,
            api_secret: None,
            base_url: API_BASE_URL.to_string(),
            window_ms: DEFAULT_WINDOW_MS,
            timeout_secs: 30,
            max_attempts: 5,
            retry_delay_ms: 1000,
            recoverable_code: IMMEDIATE_MATCH_CODE.to_string(),
        }
    }
}

impl ExchangeConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_delay(Duration::from_millis(self.retry_delay_ms))
            .with_recoverable_code(self.recoverable_code.clone())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_window(self.window_ms)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(self.retry_policy())
    }

    /// Build credentials; fails when either value is missing or the key is
    /// malformed
    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Credentials::new(key.clone(), secret).context("Failed to load API secret")
            }
            _ => anyhow::bail!("{} or {} is not set", API_KEY_ENV, API_SECRET_ENV),
        }
    }
}

/// Trading loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    pub symbol: String,
    pub side: Side,
    /// Order size in quote currency
    pub amount: Decimal,
    /// Limit price as a percentage of the index price
    pub limit_price_pct: Decimal,
    /// Stop loss distance below (Bid) or above (Ask) the limit price, in percent
    pub stop_loss_pct: Decimal,
    /// Take profit distance above (Bid) or below (Ask) the limit price, in percent
    pub take_profit_pct: Decimal,
    pub post_only: bool,
    /// Decimal places the order quantity is truncated to
    pub quantity_decimals: u32,
    /// Seconds to wait between cycles
    pub interval_secs: u64,
    /// Number of cycles to run; unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<u32>,
    pub cancel_open_orders_on_start: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverage_limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_repay_borrows: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_borrow_settlements: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_lend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_realize_pnl: Option<bool>,
}

impl Default for TradingConfig {
    fn default() -> Self {
        TradingConfig {
            symbol: "SOL_USDC_PERP".to_string(),
            side: Side::Bid,
            amount: dec!(100),
            limit_price_pct: dec!(95),
            stop_loss_pct: dec!(2),
            take_profit_pct: dec!(5),
            post_only: true,
            quantity_decimals: 2,
            interval_secs: 60,
            cycles: None,
            cancel_open_orders_on_start: true,
            leverage_limit: Some("25".to_string()),
            auto_repay_borrows: Some(true),
            auto_borrow_settlements: None,
            auto_lend: None,
            auto_realize_pnl: None,
        }
    }
}

impl TradingConfig {
    /// Account settings applied before trading starts
    pub fn account_update(&self) -> AccountUpdate {
        AccountUpdate {
            leverage_limit: self.leverage_limit.clone(),
            auto_repay_borrows: self.auto_repay_borrows,
            auto_borrow_settlements: self.auto_borrow_settlements,
            auto_lend: self.auto_lend,
            auto_realize_pnl: self.auto_realize_pnl,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
