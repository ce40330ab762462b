//! Backpack Trader
//!
//! A client for the Backpack exchange REST API: ED25519-signed account,
//! balance, order and position requests, public market data, and a repeated
//! limit-order loop that places orders with attached stop loss and take
//! profit.
//!
//! ## Example
//! ```no_run
//! use backpack_trader::backpack::{BackpackClient, Credentials, PublicClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let public = PublicClient::new()?;
//!     let price = public.get_index_price("SOL_USDC_PERP").await?;
//!     println!("Index price: {}", price);
//!
//!     let client = BackpackClient::new(Credentials::new("api_key", "base64_private_key")?)?;
//!     for (asset, balance) in client.get_balances().await? {
//!         println!("{}: {}", asset, balance.available);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backpack;
pub mod config;
pub mod strategy;
pub mod trader;

pub use config::Config;
pub use trader::Trader;
