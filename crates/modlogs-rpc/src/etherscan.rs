//! Log source backed by an Etherscan-compatible `getLogs` endpoint.

use async_trait::async_trait;
use modlogs_core::{
    error::FetchError,
    event::RawLog,
    source::{LogQuery, LogSource},
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::http_error;
use crate::retry::{RetryConfig, RetryPolicy};

pub const ETHERSCAN_MAINNET: &str = "https://api.etherscan.io/api";

/// Envelope of every Etherscan API answer.
#[derive(Debug, Deserialize)]
pub struct EtherscanResponse {
    pub status: String,
    pub message: String,
    /// Log array on success, an error string otherwise
    pub result: Value,
}

/// Fetches logs emitted by a contract and filtered on `topic1 = wallet`.
pub struct EtherscanLogSource {
    http: reqwest::Client,
    base_url: url::Url,
    api_key: String,
    retry: RetryPolicy,
}

impl EtherscanLogSource {
    pub fn new(http: reqwest::Client, base_url: url::Url, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url,
            api_key: api_key.into(),
            retry: RetryPolicy::new(RetryConfig::default()),
        }
    }

    /// Backoff applied to 429s, rate-limit envelopes and transport failures.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = RetryPolicy::new(retry);
        self
    }

    async fn fetch_once(&self, query: &LogQuery) -> Result<Vec<RawLog>, FetchError> {
        let resp = self
            .http
            .get(self.base_url.clone())
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(http_error)?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                source_name: "etherscan".into(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Http(format!("HTTP {}", status.as_u16())));
        }

        let body: EtherscanResponse = resp.json().await.map_err(http_error)?;
        parse_logs_response(body)
    }

    /// Query string for a `getLogs` call.
    pub fn query_params(&self, query: &LogQuery) -> Vec<(&'static str, String)> {
        vec![
            ("module", "logs".into()),
            ("action", "getLogs".into()),
            ("apikey", self.api_key.clone()),
            ("fromBlock", query.from_block.to_string()),
            ("toBlock", query.to_block.to_string()),
            ("address", query.address.clone()),
            ("topic1", query.wallet_topic()),
        ]
    }
}

#[async_trait]
impl LogSource for EtherscanLogSource {
    async fn logs(&self, query: &LogQuery) -> Result<Vec<RawLog>, FetchError> {
        tracing::info!(
            address = %query.address,
            wallet = %query.wallet,
            from_block = query.from_block,
            to_block = query.to_block,
            "fetching logs"
        );

        let logs = self.retry.run("getLogs", || self.fetch_once(query)).await?;
        tracing::info!(count = logs.len(), "fetched logs");
        Ok(logs)
    }
}

/// Interpret an Etherscan envelope as a list of raw logs.
///
/// `status == "0"` with "No records found" is an empty result, not an error.
pub fn parse_logs_response(resp: EtherscanResponse) -> Result<Vec<RawLog>, FetchError> {
    if resp.status == "1" {
        return Ok(serde_json::from_value(resp.result)?);
    }

    if resp.message.starts_with("No records found") {
        return Ok(Vec::new());
    }

    let detail = match &resp.result {
        Value::String(s) => s.clone(),
        _ => String::new(),
    };
    if detail.contains("rate limit") {
        return Err(FetchError::RateLimited {
            source_name: "etherscan".into(),
        });
    }
    Err(FetchError::Api {
        message: if detail.is_empty() {
            resp.message
        } else {
            format!("{}: {detail}", resp.message)
        },
    })
}
