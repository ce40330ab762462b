//! Backpack Exchange API Library
//!
//! # Features
//!
//! - **Request signing**: ED25519 signatures over a canonical, key-sorted payload
//! - **Typed order intents**: limit and market orders with bracket prices,
//!   built into the minimal field set the exchange accepts
//! - **Order retry**: fixed-delay retry on "would immediately match" rejections
//! - **Public market data**: unsigned GET wrapper
//!
//! # Modules
//!
//! - [`auth`]: Credentials, signing payload and signature headers
//! - [`instruction`]: Endpoint to instruction-tag table
//! - [`transport`]: HTTP dispatch and response classification
//! - [`order`]: Order intents and the payload builder
//! - [`retry`]: Retry policy for order submission
//! - [`client`]: Authenticated API client
//! - [`public`]: Public market data client
//! - [`types`]: Request and response type definitions
//! - [`error`]: Error taxonomy

pub mod auth;
pub mod client;
pub mod error;
pub mod instruction;
pub mod order;
pub mod public;
pub mod retry;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use auth::{Credentials, SignatureHeaders, DEFAULT_WINDOW_MS};
pub use client::{BackpackClient, ClientConfig, API_BASE_URL};
pub use error::{BackpackError, BackpackResult};
pub use instruction::Instruction;
pub use order::{OrderIntent, OrderKind, OrderOptions, OrderOutcome};
pub use public::PublicClient;
pub use retry::{with_retry, RetryPolicy, IMMEDIATE_MATCH_CODE};
pub use transport::{ApiResponse, Transport};

pub use types::{
    AccountUpdate, Balance, MarkPrice, MaxOrderQuantityQuery, OpenOrder, OrderResponse,
    OrderType, Params, PnlHistoryQuery, Position, SelfTradePrevention, Side, TimeInForce,
};
