//! JSON-RPC 2.0 envelope, trimmed to what the transaction fetcher sends and reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing call. Ids are always numeric.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Vec<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// Error object a node returns in place of a result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Incoming answer. The echoed id is kept only for logging.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// `eth_getTransactionByHash` answers `null` for unknown hashes, so a
    /// missing result is `Value::Null` rather than an error.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transaction_lookup_body() {
        let hash = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";
        let body = serde_json::to_value(JsonRpcRequest::new(
            3,
            "eth_getTransactionByHash",
            vec![json!(hash)],
        ))
        .unwrap();
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], 3);
        assert_eq!(body["method"], "eth_getTransactionByHash");
        assert_eq!(body["params"], json!([hash]));
    }

    #[test]
    fn unknown_transaction_reads_as_null() {
        let resp: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":3,"result":null}"#).unwrap();
        assert_eq!(resp.id, Some(json!(3)));
        assert!(resp.into_result().unwrap().is_null());
    }

    #[test]
    fn node_error_is_surfaced() {
        let resp: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32000,"message":"header not found"}}"#,
        )
        .unwrap();
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "header not found");
        assert!(err.data.is_none());
    }
}
