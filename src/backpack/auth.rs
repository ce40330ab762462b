//! Authentication utilities for the Backpack API
//!
//! Requests are signed with the account's ED25519 key. The signed message is
//! the instruction tag, the request parameters sorted by key, then the
//! timestamp and validity window:
//!
//! ```text
//! instruction=orderExecute&side=Bid&symbol=SOL_USDC&timestamp=1700000000000&window=5000
//! ```
//!
//! ED25519 signatures are deterministic, so the same message always produces
//! the same signature. Replay protection comes from the server checking the
//! timestamp against the window.

use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde_json::Value;
use std::fmt;

use super::error::{BackpackError, BackpackResult};
use super::types::Params;

/// Default validity window in milliseconds
pub const DEFAULT_WINDOW_MS: u64 = 5000;

pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Render a parameter value the way the exchange expects it in the signing
/// payload and in query strings. Booleans become `true`/`false`.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Build the canonical string that gets signed
pub fn signing_payload(instruction: &str, params: &Params, timestamp: i64, window: u64) -> String {
    let mut sorted: Vec<(&String, &Value)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut payload = format!("instruction={}", instruction);
    for (key, value) in sorted {
        payload.push('&');
        payload.push_str(key);
        payload.push('=');
        payload.push_str(&render_value(value));
    }
    payload.push_str(&format!("&timestamp={}&window={}", timestamp, window));
    payload
}

/// Sign a payload and base64-encode the 64-byte signature
pub fn sign_payload(payload: &str, key: &SigningKey) -> String {
    STANDARD.encode(key.sign(payload.as_bytes()).to_bytes())
}

/// Headers attached to exactly one authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    pub api_key: String,
    pub signature: String,
    pub timestamp: i64,
    pub window: u64,
}

impl SignatureHeaders {
    /// Header name/value pairs, content type included
    pub fn to_pairs(&self) -> [(&'static str, String); 5] {
        [
            ("X-API-Key", self.api_key.clone()),
            ("X-Signature", self.signature.clone()),
            ("X-Timestamp", self.timestamp.to_string()),
            ("X-Window", self.window.to_string()),
            ("Content-Type", CONTENT_TYPE.to_string()),
        ]
    }
}

/// API credentials container
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    signing_key: SigningKey,
}

impl Credentials {
    /// Create credentials from the API key and the base64-encoded 32-byte
    /// private key seed
    pub fn new(api_key: impl Into<String>, private_key: &str) -> BackpackResult<Self> {
        let bytes = STANDARD
            .decode(private_key.trim())
            .map_err(|e| BackpackError::InvalidKey(format!("private key is not base64: {}", e)))?;
        let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            BackpackError::InvalidKey(format!("expected 32 key bytes, got {}", bytes.len()))
        })?;

        Ok(Self::from_signing_key(api_key, SigningKey::from_bytes(&seed)))
    }

    pub fn from_signing_key(api_key: impl Into<String>, signing_key: SigningKey) -> Self {
        Self {
            api_key: api_key.into(),
            signing_key,
        }
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign a request and produce its header envelope
    pub fn sign(
        &self,
        instruction: &str,
        params: &Params,
        timestamp: i64,
        window: u64,
    ) -> SignatureHeaders {
        let payload = signing_payload(instruction, params, timestamp, window);
        SignatureHeaders {
            api_key: self.api_key.clone(),
            signature: sign_payload(&payload, &self.signing_key),
            timestamp,
            window,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}
