//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! One `reqwest::Client` is built from [`HttpClientConfig`] and injected into
//! every adapter, so connection pooling and the timeout are shared.

use async_trait::async_trait;
use modlogs_core::error::FetchError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{http_error, TransportError};
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::retry::{RetryConfig, RetryPolicy};
use crate::transport::RpcTransport;

/// Configuration shared by all HTTP adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub retry: RetryConfig,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout_secs: 10,
            user_agent: concat!("modlogs/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl HttpClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Build the single HTTP client shared by every adapter.
pub fn build_http_client(config: &HttpClientConfig) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(&config.user_agent)
        .build()
        .map_err(http_error)
}

/// Parse and validate an endpoint URL.
pub fn parse_endpoint(raw: &str) -> Result<url::Url, FetchError> {
    let url = url::Url::parse(raw).map_err(|e| FetchError::Http(format!("invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::Http(format!(
            "unsupported URL scheme '{other}' in '{raw}'"
        ))),
    }
}

/// HTTP JSON-RPC client with retry on transient errors.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpRpcClient {
    pub fn new(url: impl Into<String>, http: reqwest::Client, retry: RetryConfig) -> Self {
        Self {
            url: url.into(),
            http,
            retry: RetryPolicy::new(retry),
        }
    }

    async fn send_once(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .json(req)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TransportError::RateLimited {
                provider: self.url.clone(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!(
                "HTTP {}: {body}",
                status.as_u16()
            )));
        }

        resp.json::<JsonRpcResponse>()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        self.retry.run(&req.method, || self.send_once(&req)).await
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_is_ten_seconds() {
        assert_eq!(
            HttpClientConfig::default().request_timeout(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn config_fills_defaults() {
        let config: HttpClientConfig =
            serde_json::from_str(r#"{"request_timeout_secs": 3}"#).unwrap();
        assert_eq!(config.request_timeout_secs, 3);
        assert_eq!(config.retry, RetryConfig::default());
    }

    #[test]
    fn endpoint_validation() {
        assert!(parse_endpoint("https://api.etherscan.io/api").is_ok());
        assert!(parse_endpoint("ftp://example.com").is_err());
        assert!(parse_endpoint("not a url").is_err());
    }
}
