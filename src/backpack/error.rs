//! Backpack-specific error types

use thiserror::Error;

/// Errors surfaced by the signer, transport and order submission layers.
#[derive(Debug, Error)]
pub enum BackpackError {
    /// Connection refused, timeout, DNS failure: no response was received.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response carrying a decodable `{code, message}` body.
    #[error("API error ({status}): {code} - {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Non-2xx response whose body is not an API error document.
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        last: Box<BackpackError>,
    },
}

impl BackpackError {
    /// Exchange error code, if this is an API-level rejection.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BackpackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type BackpackResult<T> = Result<T, BackpackError>;
