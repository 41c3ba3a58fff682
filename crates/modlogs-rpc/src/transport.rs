//! The `RpcTransport` trait.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// A JSON-RPC endpoint.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks and are
/// stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// The transport's identifier (URL or name).
    fn url(&self) -> &str;
}

impl dyn RpcTransport {
    /// Call a method and deserialize the result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        id: u64,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        let resp = self.send(JsonRpcRequest::new(id, method, params)).await?;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        Ok(serde_json::from_value(result)?)
    }
}
