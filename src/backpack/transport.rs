//! HTTP dispatch and response classification
//!
//! One call to [`Transport::send`] is exactly one network round trip. Nothing
//! here retries; callers that need retries wrap the call (see `retry`).

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::auth::{render_value, SignatureHeaders};
use super::error::{BackpackError, BackpackResult};
use super::types::{ApiErrorBody, Params};

/// Successful response payload
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// 204, or a 2xx with an empty body
    Empty,
    Json(Value),
    /// 2xx body that is not valid JSON
    Text(String),
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        matches!(self, ApiResponse::Empty)
    }

    /// Decode the payload into a typed response
    pub fn into_json<T: DeserializeOwned>(self) -> BackpackResult<T> {
        match self {
            ApiResponse::Json(value) => Ok(serde_json::from_value(value)?),
            ApiResponse::Text(text) => Err(BackpackError::Decode(format!(
                "expected JSON, got text: {}",
                text
            ))),
            ApiResponse::Empty => Err(BackpackError::Decode(
                "expected JSON, got an empty response".to_string(),
            )),
        }
    }

    /// Like [`ApiResponse::into_json`], but an empty response decodes to `None`
    pub fn into_optional_json<T: DeserializeOwned>(self) -> BackpackResult<Option<T>> {
        match self {
            ApiResponse::Empty => Ok(None),
            other => other.into_json().map(Some),
        }
    }
}

/// Classify a response by status and body
pub fn classify(status: StatusCode, body: &str) -> BackpackResult<ApiResponse> {
    if status == StatusCode::NO_CONTENT {
        return Ok(ApiResponse::Empty);
    }

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(ApiResponse::Empty);
        }
        return Ok(match serde_json::from_str::<Value>(body) {
            Ok(value) => ApiResponse::Json(value),
            Err(_) => ApiResponse::Text(body.to_string()),
        });
    }

    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(error) => Err(BackpackError::Api {
            status: status.as_u16(),
            code: error.code,
            message: error.message,
        }),
        Err(_) => Err(BackpackError::Http {
            status: status.as_u16(),
            body: body.to_string(),
        }),
    }
}

/// Query string pairs, rendered the same way as in the signing payload
pub fn query_pairs(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| (k.clone(), render_value(v)))
        .collect()
}

/// HTTP transport bound to one base URL
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: Client,
    base_url: String,
}

impl Transport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> BackpackResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join the base URL and an endpoint path with exactly one slash
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send one request and classify the response.
    ///
    /// GET requests carry `params` in the query string; every other verb
    /// sends them as a JSON body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        headers: Option<&SignatureHeaders>,
        params: Option<&Params>,
    ) -> BackpackResult<ApiResponse> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self.http_client.request(method.clone(), &url);

        if let Some(headers) = headers {
            for (name, value) in headers.to_pairs() {
                request = request.header(name, value);
            }
        }

        if let Some(params) = params {
            if method == Method::GET {
                if !params.is_empty() {
                    request = request.query(&query_pairs(params));
                }
            } else {
                request = request.body(serde_json::to_string(params)?);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("{} {} -> {}", method, path, status);

        if status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse::Empty);
        }

        let body = response.text().await?;
        classify(status, &body)
    }
}
