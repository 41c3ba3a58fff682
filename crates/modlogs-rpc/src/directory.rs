//! Module name/version → deployed address resolution.
//!
//! The directory endpoint serves one JSON document listing every release:
//!
//! ```json
//! { "versions": [ { "version": "1.6.0", "modules": [ { "name": "TransferManager", "address": "0x..." } ] } ] }
//! ```

use async_trait::async_trait;
use modlogs_core::{error::FetchError, source::ModuleDirectory};
use serde::{Deserialize, Serialize};

use crate::error::http_error;
use crate::retry::{RetryConfig, RetryPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleListing {
    pub versions: Vec<VersionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub name: String,
    pub address: String,
}

/// Find the address of `module` at `version` in a listing.
pub fn find_module_address(
    listing: &ModuleListing,
    module: &str,
    version: &str,
) -> Result<String, FetchError> {
    listing
        .versions
        .iter()
        .filter(|v| v.version == version)
        .flat_map(|v| v.modules.iter())
        .find(|m| m.name == module)
        .map(|m| m.address.clone())
        .ok_or_else(|| FetchError::ModuleNotFound {
            module: module.to_string(),
            version: version.to_string(),
        })
}

/// Module directory fetched over HTTP on every lookup.
pub struct HttpModuleDirectory {
    http: reqwest::Client,
    endpoint: url::Url,
    retry: RetryPolicy,
}

impl HttpModuleDirectory {
    pub fn new(http: reqwest::Client, endpoint: url::Url) -> Self {
        Self {
            http,
            endpoint,
            retry: RetryPolicy::new(RetryConfig::default()),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = RetryPolicy::new(retry);
        self
    }

    pub async fn listing(&self) -> Result<ModuleListing, FetchError> {
        self.retry.run("module listing", || self.listing_once()).await
    }

    async fn listing_once(&self) -> Result<ModuleListing, FetchError> {
        let resp = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(http_error)?;
        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                source_name: "module directory".into(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Http(format!(
                "HTTP {} from module directory",
                status.as_u16()
            )));
        }
        resp.json().await.map_err(http_error)
    }
}

#[async_trait]
impl ModuleDirectory for HttpModuleDirectory {
    async fn resolve(&self, module: &str, version: &str) -> Result<String, FetchError> {
        let address = find_module_address(&self.listing().await?, module, version)?;
        tracing::info!(module, version, %address, "resolved module address");
        Ok(address)
    }
}
