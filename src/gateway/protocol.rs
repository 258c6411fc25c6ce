// Keyrack — JSON-RPC 2.0 Protocol Types
//
// Minimal JSON-RPC 2.0 envelope for the UDS gateway, plus the mapping from
// store errors onto application error codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::StoreError;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

/// A JSON-RPC 2.0 success/error response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC 2.0 error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Application error codes
pub const UNKNOWN_PLATFORM: i32 = -32010;
pub const INCOMPLETE_CREDENTIALS: i32 = -32011;
pub const NOT_CONFIGURED: i32 = -32012;

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    /// Create a parse error response (id is null because we couldn't parse it).
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::error(Value::Null, PARSE_ERROR, message)
    }

    /// Translate a store error into its application error response.
    pub fn from_store_error(id: Value, err: &StoreError) -> Self {
        let mut response = match err {
            StoreError::UnknownPlatform(_) => Self::error(id, UNKNOWN_PLATFORM, err.to_string()),
            StoreError::IncompleteCredentials(_) => {
                Self::error(id, INCOMPLETE_CREDENTIALS, err.to_string())
            }
            StoreError::NotConfigured(_) => Self::error(id, NOT_CONFIGURED, err.to_string()),
            StoreError::InvalidSchema(_) => Self::error(id, INTERNAL_ERROR, err.to_string()),
        };

        if let (StoreError::IncompleteCredentials(missing), Some(error)) =
            (err, response.error.as_mut())
        {
            error.data = Some(serde_json::json!({ "missing_fields": missing }));
        }
        response
    }

    /// Replace the id field (used when we parsed the request but had a param error).
    pub(super) fn with_id(mut self, id: Value) -> Self {
        self.id = id;
        self
    }
}

impl JsonRpcRequest {
    /// Validate that this is a proper JSON-RPC 2.0 request.
    pub fn validate(&self) -> Result<(), String> {
        if self.jsonrpc != "2.0" {
            return Err("jsonrpc must be \"2.0\"".to_string());
        }
        if self.method.is_empty() {
            return Err("method must not be empty".to_string());
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
